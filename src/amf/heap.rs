//! Arena of composite values
//!
//! Decoded graphs may alias or contain cycles, so composites are stored here
//! and addressed by [`Handle`]. One heap belongs to one session; handles from
//! another heap are meaningless.

use std::fmt;

use super::array::Array;
use super::dictionary::Dictionary;
use super::object::Object;
use super::vector::Vector;

/// Index of a composite in a [`Heap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A composite stored in the heap
#[derive(Debug, Clone, PartialEq)]
pub enum Composite {
    Array(Array),
    Object(Object),
    Vector(Vector),
    Dictionary(Dictionary),
}

/// Arena of composites for one session
#[derive(Debug, Clone, Default)]
pub struct Heap {
    slots: Vec<Composite>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a composite and return its handle
    pub fn insert(&mut self, composite: Composite) -> Handle {
        self.slots.push(composite);
        Handle(self.slots.len() - 1)
    }

    pub fn insert_array(&mut self, array: Array) -> Handle {
        self.insert(Composite::Array(array))
    }

    pub fn insert_object(&mut self, object: Object) -> Handle {
        self.insert(Composite::Object(object))
    }

    pub fn insert_vector(&mut self, vector: Vector) -> Handle {
        self.insert(Composite::Vector(vector))
    }

    pub fn insert_dictionary(&mut self, dictionary: Dictionary) -> Handle {
        self.insert(Composite::Dictionary(dictionary))
    }

    pub fn get(&self, handle: Handle) -> Option<&Composite> {
        self.slots.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Composite> {
        self.slots.get_mut(handle.0)
    }

    pub fn array(&self, handle: Handle) -> Option<&Array> {
        match self.get(handle)? {
            Composite::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn array_mut(&mut self, handle: Handle) -> Option<&mut Array> {
        match self.get_mut(handle)? {
            Composite::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn object(&self, handle: Handle) -> Option<&Object> {
        match self.get(handle)? {
            Composite::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn object_mut(&mut self, handle: Handle) -> Option<&mut Object> {
        match self.get_mut(handle)? {
            Composite::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn vector(&self, handle: Handle) -> Option<&Vector> {
        match self.get(handle)? {
            Composite::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn dictionary(&self, handle: Handle) -> Option<&Dictionary> {
        match self.get(handle)? {
            Composite::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Overwrite a slot reserved earlier in the session
    pub(crate) fn replace(&mut self, handle: Handle, composite: Composite) {
        if let Some(slot) = self.slots.get_mut(handle.0) {
            *slot = composite;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amf::Value;

    #[test]
    fn test_typed_access() {
        let mut heap = Heap::new();
        let a = heap.insert_array(Array::from_dense(vec![Value::Integer(1)]));
        let d = heap.insert_dictionary(Dictionary::default());

        assert_eq!(heap.len(), 2);
        assert_eq!(heap.array(a).unwrap().dense(), &[Value::Integer(1)]);
        assert!(heap.array(d).is_none());
        assert!(heap.dictionary(d).is_some());
        assert!(heap.object(a).is_none());
    }

    #[test]
    fn test_replace_keeps_handle() {
        let mut heap = Heap::new();
        let a = heap.insert_array(Array::default());
        heap.replace(a, Composite::Array(Array::from_dense(vec![Value::Null])));
        assert_eq!(heap.array(a).unwrap().len(), 1);
        assert_eq!(a.to_string(), "#0");
    }
}
