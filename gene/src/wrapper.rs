//! Wrapper genes: decorators around one inner gene.

use germ_core::Randomness;

use crate::{EnumGene, Gene};

/// Presence wrapper. When inactive the gene projects as SQL `NULL`.
#[derive(Debug, Clone)]
pub struct OptionalGene {
    pub name: String,
    pub gene: Box<Gene>,
    pub is_active: bool,
}

impl OptionalGene {
    pub fn new(name: impl Into<String>, gene: Gene) -> Self {
        Self {
            name: name.into(),
            gene: Box::new(gene),
            is_active: true,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        if force_new {
            // Flipping presence is itself a value change; give it even odds
            // against mutating the payload.
            if rng.next_bool(0.5) {
                self.is_active = !self.is_active;
                return;
            }
            if !self.is_active {
                self.is_active = true;
            }
            if self.gene.is_mutable() {
                self.gene.randomize(rng, true);
            }
        } else {
            self.is_active = rng.next_bool(0.5);
            if self.gene.is_mutable() {
                self.gene.randomize(rng, false);
            }
        }
    }

    pub fn value_as_raw_string(&self) -> String {
        if self.is_active {
            self.gene.value_as_raw_string()
        } else {
            "NULL".to_string()
        }
    }

    pub fn value_as_printable_string(&self, previous: &[&Gene]) -> String {
        if self.is_active {
            self.gene.value_as_printable_string(previous)
        } else {
            "NULL".to_string()
        }
    }
}

/// Chooses between a freely mutating gene and one of a set of seeded
/// constants harvested from existing data or documentation examples.
#[derive(Debug, Clone)]
pub struct SeededGene {
    pub name: String,
    pub gene: Box<Gene>,
    pub seeded: EnumGene,
    pub employ_seeded: bool,
}

impl SeededGene {
    pub fn new(name: impl Into<String>, gene: Gene, seeded: EnumGene) -> Self {
        Self {
            name: name.into(),
            gene: Box::new(gene),
            seeded,
            employ_seeded: false,
        }
    }

    /// Switch between the free gene and the seeded constants.
    pub fn toggle_seeded(&mut self) {
        self.employ_seeded = !self.employ_seeded;
    }

    pub fn is_mutable(&self) -> bool {
        if self.employ_seeded {
            self.seeded.is_mutable()
        } else {
            self.gene.is_mutable()
        }
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        if self.employ_seeded {
            self.seeded.randomize(rng, force_new);
        } else if self.gene.is_mutable() {
            self.gene.randomize(rng, force_new);
        }
    }

    pub fn value_as_raw_string(&self) -> String {
        if self.employ_seeded {
            self.seeded.value_as_raw_string()
        } else {
            self.gene.value_as_raw_string()
        }
    }

    pub fn value_as_printable_string(&self, previous: &[&Gene]) -> String {
        if self.employ_seeded {
            self.seeded.value_as_printable_string()
        } else {
            self.gene.value_as_printable_string(previous)
        }
    }
}
