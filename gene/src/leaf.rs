//! Leaf genes: single typed values with no child genes.

use germ_core::Randomness;

/// Default integer domain when a column declares no bounds.
pub const DEFAULT_INT_MIN: i64 = 0;
pub const DEFAULT_INT_MAX: i64 = i32::MAX as i64;

/// Default float domain when a column declares no bounds.
pub const DEFAULT_FLOAT_MIN: f64 = 0.0;
pub const DEFAULT_FLOAT_MAX: f64 = 100.0;

/// Default string length bounds when a column declares none.
pub const DEFAULT_STRING_MIN_LEN: usize = 0;
pub const DEFAULT_STRING_MAX_LEN: usize = 16;

/// A boolean value.
#[derive(Debug, Clone)]
pub struct BooleanGene {
    pub name: String,
    pub value: bool,
}

impl BooleanGene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: false,
        }
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        if force_new {
            self.value = !self.value;
        } else {
            self.value = rng.next_bool(0.5);
        }
    }
}

/// A 64-bit signed integer within an optional inclusive range.
#[derive(Debug, Clone)]
pub struct IntegerGene {
    pub name: String,
    pub value: i64,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl IntegerGene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: 0,
            min: None,
            max: None,
        }
    }

    pub fn with_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min = min;
        self.max = max;
        self.value = self.min.unwrap_or(DEFAULT_INT_MIN);
        self
    }

    pub fn with_value(mut self, value: i64) -> Self {
        self.value = value;
        self
    }

    fn bounds(&self) -> (i64, i64) {
        (
            self.min.unwrap_or(DEFAULT_INT_MIN),
            self.max.unwrap_or(DEFAULT_INT_MAX),
        )
    }

    /// The domain holds more than one value, so mutation can make progress.
    pub fn is_mutable(&self) -> bool {
        let (min, max) = self.bounds();
        min < max
    }

    pub fn is_locally_valid(&self) -> bool {
        let (min, max) = self.bounds();
        (min..=max).contains(&self.value)
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        let (min, max) = self.bounds();
        self.value = if force_new && min < max {
            rng.next_int_excluding(min, max, self.value)
        } else {
            rng.next_int(min, max)
        };
    }
}

/// A 64-bit float within an optional inclusive range.
#[derive(Debug, Clone)]
pub struct FloatGene {
    pub name: String,
    pub value: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FloatGene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: 0.0,
            min: None,
            max: None,
        }
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self.value = self.min.unwrap_or(DEFAULT_FLOAT_MIN);
        self
    }

    fn bounds(&self) -> (f64, f64) {
        (
            self.min.unwrap_or(DEFAULT_FLOAT_MIN),
            self.max.unwrap_or(DEFAULT_FLOAT_MAX),
        )
    }

    pub fn is_locally_valid(&self) -> bool {
        let (min, max) = self.bounds();
        self.value >= min && self.value <= max
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        let (min, max) = self.bounds();
        let next = rng.next_float(min, max);
        // A repeated draw over a continuous domain is as good as excluded.
        if force_new && next == self.value && min < max {
            self.value = rng.next_float(min, max);
        } else {
            self.value = next;
        }
    }
}

/// A UTF-8 string with length bounds and an optional match pattern.
#[derive(Debug, Clone)]
pub struct StringGene {
    pub name: String,
    pub value: String,
    pub min_length: usize,
    pub max_length: usize,
    /// Regex the value must match to be locally valid. Randomization does not
    /// synthesize from the pattern; it only constrains validity.
    pub match_pattern: Option<String>,
}

impl StringGene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            min_length: DEFAULT_STRING_MIN_LEN,
            max_length: DEFAULT_STRING_MAX_LEN,
            match_pattern: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_length(mut self, min: usize, max: usize) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_match_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.match_pattern = Some(pattern.into());
        self
    }

    pub fn is_locally_valid(&self) -> bool {
        let len = self.value.chars().count();
        if len < self.min_length || len > self.max_length {
            return false;
        }
        match &self.match_pattern {
            None => true,
            Some(pattern) => match regex_lite::Regex::new(pattern) {
                Ok(re) => re.is_match(&self.value),
                // An uncompilable pattern cannot invalidate the value.
                Err(_) => true,
            },
        }
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        let min = self.min_length;
        let max = self.max_length.max(min);
        let mut next = rng.next_string(min, max);
        if force_new {
            let mut guard = 0;
            while next == self.value && guard < 3 && max > 0 {
                next = rng.next_string(min, max);
                guard += 1;
            }
        }
        self.value = next;
    }
}

/// Placeholder for a column whose value is assigned by the database
/// (auto-increment). Not printable, not mutable.
#[derive(Debug, Clone)]
pub struct AutoIncrementGene {
    pub name: String,
}

impl AutoIncrementGene {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
