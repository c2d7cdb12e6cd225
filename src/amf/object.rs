//! AMF3 Object (0x0A) and traits
//!
//! ```text
//! U29O-ref       = U29 ; xxxxxxx0  object reference
//! U29O-traits-ref = U29 ; xxxxxx01 trait reference, index = U29 >> 2
//! U29O-traits-ext = U29 ; xxxxx111 externalizable, class name follows
//! U29O-traits    = U29 ; xxxxd011 inline traits, sealed count = U29 >> 4,
//!                        d = dynamic
//! ```
//!
//! Inline traits carry the class name and sealed member names, then the sealed
//! values, then (for dynamic objects) name/value pairs ended by the empty
//! string. Traits go into their own table the moment they are read.

use bytes::BufMut;
use indexmap::IndexMap;

use super::decoder::{Decoder, ObjectHeader};
use super::encoder::Writer;
use super::heap::{Composite, Handle, Heap};
use super::marker;
use super::string::{read_string, write_string};
use super::value::Value;
use super::varint::write_u29;
use crate::error::{AmfError, Result};

/// Inline trait header flags (low bits of the U29)
const TRAITS_INLINE: u32 = 0b011;
const TRAITS_REFERENCE: u32 = 0b01;
const TRAITS_DYNAMIC: u32 = 0b1000;

/// Largest sealed member count that fits next to the four flag bits
const MAX_SEALED_MEMBERS: usize = (marker::U29_MAX >> 4) as usize;

/// Class shape shared by objects of the same type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Trait {
    /// Class alias; empty for anonymous objects
    pub class_name: String,
    /// Sealed member names in wire order
    pub sealed: Vec<String>,
    /// Whether dynamic members follow the sealed ones
    pub dynamic: bool,
    pub externalizable: bool,
}

impl Trait {
    /// Sealed trait for a named class
    pub fn new(class_name: impl Into<String>, sealed: Vec<String>) -> Self {
        Self {
            class_name: class_name.into(),
            sealed,
            dynamic: false,
            externalizable: false,
        }
    }

    /// Anonymous dynamic trait, the shape of a plain ActionScript `Object`
    pub fn anonymous() -> Self {
        Self {
            dynamic: true,
            ..Self::default()
        }
    }

    /// Mark the trait dynamic
    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.class_name.is_empty()
    }
}

/// Object instance: a trait plus member values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    traits: Trait,
    sealed_values: Vec<Value>,
    dynamic_members: IndexMap<String, Value>,
}

impl Object {
    /// Object with every sealed member set to undefined
    pub fn new(traits: Trait) -> Self {
        let sealed_values = vec![Value::Undefined; traits.sealed.len()];
        Self {
            traits,
            sealed_values,
            dynamic_members: IndexMap::new(),
        }
    }

    /// Empty anonymous dynamic object
    pub fn anonymous() -> Self {
        Self::new(Trait::anonymous())
    }

    /// Object with sealed values given in trait order
    pub fn with_values(traits: Trait, sealed_values: Vec<Value>) -> Result<Self> {
        if sealed_values.len() != traits.sealed.len() {
            return Err(AmfError::TraitMismatch {
                expected: traits.sealed.len(),
                actual: sealed_values.len(),
            });
        }
        Ok(Self {
            traits,
            sealed_values,
            dynamic_members: IndexMap::new(),
        })
    }

    pub fn traits(&self) -> &Trait {
        &self.traits
    }

    /// Sealed values in trait order
    pub fn sealed_values(&self) -> &[Value] {
        &self.sealed_values
    }

    /// Dynamic members in insertion order
    pub fn dynamic_members(&self) -> &IndexMap<String, Value> {
        &self.dynamic_members
    }

    /// Look up a member by name, sealed members first
    pub fn get(&self, name: &str) -> Option<&Value> {
        if let Some(i) = self.traits.sealed.iter().position(|n| n == name) {
            return self.sealed_values.get(i);
        }
        self.dynamic_members.get(name)
    }

    /// Set a member, returning the value it replaced
    ///
    /// Names outside the sealed set become dynamic members, which only a
    /// dynamic trait allows; empty names are never valid dynamic members.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Result<Option<Value>> {
        let name = name.into();
        if let Some(i) = self.traits.sealed.iter().position(|n| *n == name) {
            return Ok(Some(std::mem::replace(&mut self.sealed_values[i], value)));
        }
        if !self.traits.dynamic {
            return Err(AmfError::UnknownMember(name));
        }
        if name.is_empty() {
            return Err(AmfError::EmptyKey);
        }
        Ok(self.dynamic_members.insert(name, value))
    }
}

impl Decoder {
    pub(super) fn read_object(&mut self) -> Result<Value> {
        let header = match self.read_object_header()? {
            ObjectHeader::Reference(value) => return Ok(value),
            ObjectHeader::Inline(header) => header,
        };
        let traits = self.read_traits(header)?;

        let handle = self.heap.insert_object(Object::default());
        let value = Value::Object(handle);
        self.objects.insert(value.clone());

        let mut sealed_values = Vec::with_capacity(traits.sealed.len());
        for _ in 0..traits.sealed.len() {
            sealed_values.push(self.read_value()?);
        }

        let mut object = Object {
            traits,
            sealed_values,
            dynamic_members: IndexMap::new(),
        };
        if object.traits.dynamic {
            loop {
                let name = read_string(&mut self.buf, &mut self.strings)?;
                if name.is_empty() {
                    break;
                }
                let member = self.read_value()?;
                object.dynamic_members.insert(name, member);
            }
        }

        self.heap.replace(handle, Composite::Object(object));
        Ok(value)
    }

    /// Resolve the trait part of an object header (the U29 already shifted
    /// right by one)
    fn read_traits(&mut self, header: u32) -> Result<Trait> {
        if header & 1 == 0 {
            let index = (header >> 1) as usize;
            tracing::trace!(index = index, "AMF3 trait reference");
            let traits = self.traits.get(index)?;
            if traits.externalizable {
                return Err(AmfError::Externalizable(traits.class_name.clone()));
            }
            return Ok(traits.clone());
        }

        let class_name = read_string(&mut self.buf, &mut self.strings)?;
        if header & 0b10 != 0 {
            self.traits.insert(Trait {
                class_name: class_name.clone(),
                externalizable: true,
                ..Trait::default()
            });
            return Err(AmfError::Externalizable(class_name));
        }

        let count = (header >> 3) as usize;
        let mut sealed = Vec::with_capacity(self.capacity_hint(count));
        for _ in 0..count {
            sealed.push(read_string(&mut self.buf, &mut self.strings)?);
        }

        let traits = Trait {
            class_name,
            sealed,
            dynamic: header & 0b100 != 0,
            externalizable: false,
        };
        self.traits.insert(traits.clone());
        Ok(traits)
    }
}

impl Writer {
    pub(super) fn write_object(&mut self, heap: &Heap, handle: Handle) -> Result<()> {
        let object = heap
            .object(handle)
            .ok_or(AmfError::InvalidHandle(handle.index()))?;
        let traits = &object.traits;
        if traits.externalizable {
            return Err(AmfError::Externalizable(traits.class_name.clone()));
        }
        if object.sealed_values.len() != traits.sealed.len() {
            return Err(AmfError::TraitMismatch {
                expected: traits.sealed.len(),
                actual: object.sealed_values.len(),
            });
        }
        if traits.sealed.len() > MAX_SEALED_MEMBERS {
            return Err(AmfError::LengthOverflow(traits.sealed.len()));
        }

        self.buf.put_u8(marker::OBJECT);
        if self.write_object_reference(handle)? {
            return Ok(());
        }

        match self.traits.position(traits) {
            Some(index) => {
                let header = u32::try_from(index)
                    .ok()
                    .filter(|i| *i <= marker::U29_MAX >> 2)
                    .ok_or(AmfError::LengthOverflow(index))?;
                write_u29(&mut self.buf, (header << 2) | TRAITS_REFERENCE)?;
            }
            None => {
                self.traits.insert(traits.clone());
                let mut header = ((traits.sealed.len() as u32) << 4) | TRAITS_INLINE;
                if traits.dynamic {
                    header |= TRAITS_DYNAMIC;
                }
                write_u29(&mut self.buf, header)?;
                write_string(&mut self.buf, &traits.class_name, &mut self.strings)?;
                for name in &traits.sealed {
                    write_string(&mut self.buf, name, &mut self.strings)?;
                }
            }
        }

        for member in &object.sealed_values {
            self.write_value(heap, member)?;
        }

        if traits.dynamic {
            for (name, member) in &object.dynamic_members {
                if name.is_empty() {
                    return Err(AmfError::EmptyKey);
                }
                write_string(&mut self.buf, name, &mut self.strings)?;
                self.write_value(heap, member)?;
            }
            self.buf.put_u8(marker::EMPTY_STRING);
        }
        Ok(())
    }
}
