//! Decoder and encoder configuration

/// Maximum nesting depth for composites (prevent stack overflow)
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Cap on up-front allocation driven by counts read off the wire
pub const DEFAULT_MAX_PREALLOCATION: usize = 1024;

/// Initial encoder buffer size
pub const DEFAULT_ENCODER_CAPACITY: usize = 256;

/// Decoder configuration options
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Maximum composite nesting depth
    pub max_depth: usize,

    /// Largest element count reserved before the elements are actually read
    pub max_preallocation: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_preallocation: DEFAULT_MAX_PREALLOCATION,
        }
    }
}

impl DecoderConfig {
    /// Set maximum nesting depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set preallocation cap
    pub fn max_preallocation(mut self, count: usize) -> Self {
        self.max_preallocation = count;
        self
    }
}

/// What the encoder does with an integer outside the U29 range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegerOverflow {
    /// Fail with `ValueOutOfRange`
    #[default]
    Error,
    /// Write the value as a Double instead
    Double,
}

/// Encoder configuration options
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Initial output buffer capacity
    pub initial_capacity: usize,

    /// Maximum composite nesting depth
    pub max_depth: usize,

    /// Handling of integers that do not fit in 29 bits
    pub integer_overflow: IntegerOverflow,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_ENCODER_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
            integer_overflow: IntegerOverflow::Error,
        }
    }
}

impl EncoderConfig {
    /// Set initial buffer capacity
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set maximum nesting depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set integer overflow handling
    pub fn integer_overflow(mut self, policy: IntegerOverflow) -> Self {
        self.integer_overflow = policy;
        self
    }
}
