//! Enum genes: an index into an interned, sorted, deduplicated value list.

use std::fmt;
use std::sync::Arc;

use germ_core::{unique_warn, Randomness};

use crate::{GeneError, GeneResult};

/// A constant that can appear in an enumeration domain.
///
/// Values must be sortable so equal sets produce identical lists regardless
/// of input order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumLiteral {
    /// 64-bit signed integer constant.
    Int(i64),
    /// String constant.
    Str(String),
}

impl fmt::Display for EnumLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumLiteral::Int(i) => write!(f, "{}", i),
            EnumLiteral::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for EnumLiteral {
    fn from(i: i64) -> Self {
        EnumLiteral::Int(i)
    }
}

impl From<&str> for EnumLiteral {
    fn from(s: &str) -> Self {
        EnumLiteral::Str(s.to_string())
    }
}

impl From<String> for EnumLiteral {
    fn from(s: String) -> Self {
        EnumLiteral::Str(s)
    }
}

/// Interning cache for enum value lists.
///
/// Owned by the schema-translation session and passed by reference into gene
/// construction. Two enum genes built from content-equal sets (in any input
/// order) share one list allocation, so equality and copy only ever touch the
/// gene's index.
#[derive(Debug, Default)]
pub struct EnumValueCache {
    lists: Vec<Arc<Vec<EnumLiteral>>>,
}

impl EnumValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort, deduplicate, and intern a value list. Returns the shared list,
    /// reusing an existing allocation when the content matches.
    pub fn intern(&mut self, data: Vec<EnumLiteral>) -> Arc<Vec<EnumLiteral>> {
        let mut list = data;
        list.sort();
        list.dedup();

        if let Some(existing) = self.lists.iter().find(|l| ***l == list) {
            return Arc::clone(existing);
        }
        let shared = Arc::new(list);
        self.lists.push(Arc::clone(&shared));
        shared
    }

    /// Number of distinct interned lists.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

/// Gene in which 1 out of N constant values is chosen.
///
/// The value list is shared between all genes built from the same content;
/// copying or comparing genes only involves the index. This is a deliberate
/// memory-sharing optimization, not an ownership bug.
#[derive(Debug, Clone)]
pub struct EnumGene {
    pub name: String,
    values: Arc<Vec<EnumLiteral>>,
    pub index: usize,
}

impl EnumGene {
    /// Build an enum gene over `data`, interning the value list through
    /// `cache`. An empty domain is tolerated with a warning: some schemas
    /// ship enum columns with no declared values.
    pub fn new(
        name: impl Into<String>,
        data: Vec<EnumLiteral>,
        cache: &mut EnumValueCache,
    ) -> Self {
        let name = name.into();
        if data.is_empty() {
            unique_warn(&format!("Enum gene '{}' has an empty list of values", name));
        }
        let values = cache.intern(data);
        Self {
            name,
            values,
            index: 0,
        }
    }

    /// Select a starting index, failing on out-of-bounds input.
    pub fn with_index(mut self, index: usize) -> GeneResult<Self> {
        if !self.values.is_empty() && index >= self.values.len() {
            return Err(GeneError::InvalidIndex {
                index,
                size: self.values.len(),
            });
        }
        self.index = index;
        Ok(self)
    }

    /// The shared, interned value list.
    pub fn values(&self) -> &Arc<Vec<EnumLiteral>> {
        &self.values
    }

    /// Whether two genes share the same interned list allocation.
    pub fn shares_values_with(&self, other: &EnumGene) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }

    pub fn is_mutable(&self) -> bool {
        self.values.len() > 1
    }

    pub fn is_locally_valid(&self) -> bool {
        self.index < self.values.len() || self.values.is_empty()
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        if self.values.is_empty() {
            return;
        }
        self.index = if force_new && self.values.len() > 1 {
            rng.choose_index_excluding(self.values.len(), self.index)
        } else {
            rng.choose_index(self.values.len())
        };
    }

    /// The currently selected value, if the domain is non-empty.
    pub fn current(&self) -> Option<&EnumLiteral> {
        self.values.get(self.index)
    }

    pub fn value_as_raw_string(&self) -> String {
        self.current().map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn value_as_printable_string(&self) -> String {
        match self.current() {
            Some(EnumLiteral::Str(s)) => format!("\"{}\"", s),
            Some(EnumLiteral::Int(i)) => i.to_string(),
            None => String::new(),
        }
    }
}
