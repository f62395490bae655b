//! Relational genes: primary-key identity and foreign-key references.
//!
//! Linkage between insertions is always by `UniqueId` value, never by
//! aliasing gene objects across actions.

use germ_core::{Randomness, UniqueId};

use crate::Gene;

/// Wraps the value gene of a primary-key column and owns a process-unique id
/// other insertions can reference.
#[derive(Debug, Clone)]
pub struct PrimaryKeyGene {
    pub name: String,
    pub table_name: String,
    pub unique_id: UniqueId,
    pub gene: Box<Gene>,
}

impl PrimaryKeyGene {
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        unique_id: UniqueId,
        gene: Gene,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            unique_id,
            gene: Box::new(gene),
        }
    }

    pub fn is_mutable(&self) -> bool {
        self.gene.is_mutable()
    }

    pub fn is_printable(&self) -> bool {
        self.gene.is_printable()
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        if self.gene.is_mutable() {
            self.gene.randomize(rng, force_new);
        }
    }

    pub fn value_as_raw_string(&self) -> String {
        self.gene.value_as_raw_string()
    }

    pub fn value_as_printable_string(&self, previous: &[&Gene]) -> String {
        self.gene.value_as_printable_string(previous)
    }
}

/// References the primary key of an earlier insertion on `target_table`.
///
/// The reference is a typed `Option` rather than a sentinel id: `None` means
/// unbound (pending repair, or SQL `NULL` when the column is nullable).
#[derive(Debug, Clone)]
pub struct ForeignKeyGene {
    pub name: String,
    pub target_table: String,
    pub nullable: bool,
    reference: Option<UniqueId>,
}

impl ForeignKeyGene {
    pub fn new(name: impl Into<String>, target_table: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            target_table: target_table.into(),
            nullable,
            reference: None,
        }
    }

    /// The referenced primary-key id, when bound.
    pub fn reference(&self) -> Option<UniqueId> {
        self.reference
    }

    pub fn is_bound(&self) -> bool {
        self.reference.is_some()
    }

    pub fn bind(&mut self, id: UniqueId) {
        self.reference = Some(id);
    }

    pub fn unbind(&mut self) {
        self.reference = None;
    }

    /// Rebind uniformly among candidate primary-key ids (those of earlier
    /// insertions on the target table). With no candidates a nullable
    /// reference falls back to `NULL`; a non-nullable one is left for the
    /// caller to repair or truncate.
    pub fn randomize_with_candidates(
        &mut self,
        rng: &mut Randomness,
        force_new: bool,
        candidates: &[UniqueId],
    ) {
        if candidates.is_empty() {
            if self.nullable {
                self.reference = None;
            }
            return;
        }

        let pool: Vec<UniqueId> = if force_new && candidates.len() > 1 {
            match self.reference {
                Some(current) => candidates.iter().copied().filter(|c| *c != current).collect(),
                None => candidates.to_vec(),
            }
        } else {
            candidates.to_vec()
        };

        if let Some(chosen) = rng.choose(&pool) {
            self.reference = Some(*chosen);
        }
    }

    pub fn value_as_raw_string(&self) -> String {
        match self.reference {
            Some(id) => id.to_string(),
            None => "NULL".to_string(),
        }
    }

    /// Print the referenced primary key's value by resolving the id against
    /// previously seen genes. Unbound references project as `NULL`.
    pub fn value_as_printable_string(&self, previous: &[&Gene]) -> String {
        let id = match self.reference {
            Some(id) => id,
            None => return "NULL".to_string(),
        };
        for gene in previous {
            for g in gene.flat_view() {
                if let Gene::PrimaryKey(pk) = g {
                    if pk.unique_id == id {
                        return pk.value_as_printable_string(previous);
                    }
                }
            }
        }
        "NULL".to_string()
    }
}
