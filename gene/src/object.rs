//! Object composites and the cycle sentinel.

use germ_core::Randomness;

use crate::Gene;

/// A fixed composite of named fields, printed JSON-style.
#[derive(Debug, Clone)]
pub struct ObjectGene {
    pub name: String,
    pub fields: Vec<Gene>,
}

impl ObjectGene {
    pub fn new(name: impl Into<String>, fields: Vec<Gene>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Gene> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn is_mutable(&self) -> bool {
        self.fields.iter().any(|f| f.is_mutable())
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        for field in &mut self.fields {
            if field.is_mutable() {
                field.randomize(rng, force_new);
            }
        }
    }

    pub fn value_as_raw_string(&self) -> String {
        let inner: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("\"{}\":{}", f.name(), f.value_as_raw_string()))
            .collect();
        format!("{{{}}}", inner.join(", "))
    }

    pub fn value_as_printable_string(&self, previous: &[&Gene]) -> String {
        let inner: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("\"{}\":{}", f.name(), f.value_as_printable_string(previous)))
            .collect();
        format!("{{{}}}", inner.join(", "))
    }
}

/// Sentinel substituted when a self-referencing object type reappears within
/// the translation depth bound. Carries no value, never mutates; trees stay
/// acyclic by construction.
#[derive(Debug, Clone)]
pub struct CycleGene {
    pub name: String,
}

impl CycleGene {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
