//! Consistency checking of insert-action sequences.
//!
//! All functions here are pure: they scan, they never mutate. The offending
//! gene is reported as a structural address (action index, top-gene index,
//! child path) so the repair engine can resolve it mutably afterwards.

use std::collections::{HashMap, HashSet};

use germ_action::InsertAction;
use germ_core::Randomness;
use germ_gene::{ForeignKeyGene, Gene, GenePath};
use germ_schema::ColumnValues;

/// Address of a gene that violates a constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offender {
    /// Index of the action within the sequence.
    pub action_index: usize,
    /// Index of the top-level gene within the action.
    pub top_gene_index: usize,
    /// Child path below the top-level gene; empty for the gene itself.
    pub path: GenePath,
}

impl Offender {
    /// Resolve the addressed gene.
    pub fn resolve<'a>(&self, actions: &'a [InsertAction]) -> Option<&'a Gene> {
        actions
            .get(self.action_index)?
            .top_genes()
            .get(self.top_gene_index)?
            .descend(&self.path)
    }

    /// Resolve the addressed gene, mutably.
    pub fn resolve_mut<'a>(&self, actions: &'a mut [InsertAction]) -> Option<&'a mut Gene> {
        actions
            .get_mut(self.action_index)?
            .top_genes_mut()
            .get_mut(self.top_gene_index)?
            .descend_mut(&self.path)
    }
}

/// Verify that every foreign key in the sequence resolves.
///
/// For the action at position i, every non-nullable foreign key must be
/// bound, and every bound reference must equal the unique id of a primary
/// key appearing at a position strictly before i. Position 0 is root-only:
/// an action with any foreign-key gene cannot be first. A row referencing a
/// primary key inside its own action never verifies; same-action
/// self-reference is deliberately not supported.
pub fn verify_foreign_keys(actions: &[InsertAction]) -> bool {
    for (i, action) in actions.iter().enumerate() {
        let fks: Vec<&ForeignKeyGene> = foreign_key_genes(action);

        if fks.iter().any(|fk| !fk.nullable && !fk.is_bound()) {
            return false;
        }

        if i == 0 {
            if fks.is_empty() {
                continue;
            } else {
                return false;
            }
        }

        let previous = &actions[..i];
        for id in fks.iter().filter_map(|fk| fk.reference()) {
            let matched = previous
                .iter()
                .flat_map(|a| a.top_genes())
                .any(|g| matches!(g, Gene::PrimaryKey(pk) if pk.unique_id == id));
            if !matched {
                return false;
            }
        }
    }

    true
}

/// Verify uniqueness constraints (unique columns, primary-key tuples, table
/// constraints) by scanning for an offending gene.
pub fn verify_unique_columns(actions: &[InsertAction]) -> bool {
    find_first_offending_gene(actions, None).is_none()
}

/// Returns true iff the whole sequence is valid wrt the schema.
pub fn verify_actions(actions: &[InsertAction]) -> bool {
    verify_unique_columns(actions) && verify_foreign_keys(actions)
}

fn foreign_key_genes(action: &InsertAction) -> Vec<&ForeignKeyGene> {
    action
        .top_genes()
        .iter()
        .flat_map(|g| g.flat_view())
        .filter_map(|g| match g {
            Gene::ForeignKey(fk) => Some(fk),
            _ => None,
        })
        .collect()
}

/// Scan the sequence in position order for the first constraint violation.
///
/// Within one action the checks run in fixed priority order: unbound
/// non-nullable foreign keys, then unique-column collisions, then
/// primary-key tuple collisions, then table-level constraints. The order is
/// kept for behavioral compatibility with the offending-gene selection the
/// repair loop expects.
///
/// With a randomness source, the gene blamed for a table-constraint
/// violation is chosen uniformly among the constraint's relevant columns;
/// without one, the first is taken.
pub fn find_first_offending_gene(
    actions: &[InsertAction],
    mut rng: Option<&mut Randomness>,
) -> Option<Offender> {
    // (table, column) -> raw values already seen in unique columns
    let mut unique_values: HashMap<(String, String), HashSet<String>> = HashMap::new();
    // table -> concatenated primary-key tuples already seen
    let mut pk_values: HashMap<String, HashSet<String>> = HashMap::new();

    let all_genes: Vec<&Gene> = actions.iter().flat_map(|a| a.top_genes()).collect();

    for (action_index, action) in actions.iter().enumerate() {
        if let Some(offender) = check_foreign_keys(action, action_index) {
            return Some(offender);
        }
        if let Some(offender) =
            check_unique_columns(action, action_index, &mut unique_values, &all_genes)
        {
            return Some(offender);
        }
        if let Some(offender) = check_primary_keys(action, action_index, &mut pk_values, &all_genes)
        {
            return Some(offender);
        }
        if let Some(offender) =
            check_table_constraints(action, action_index, actions, rng.as_deref_mut())
        {
            return Some(offender);
        }
    }

    None
}

/// First unbound non-nullable foreign key in the action's gene trees.
fn check_foreign_keys(action: &InsertAction, action_index: usize) -> Option<Offender> {
    for (top_gene_index, gene) in action.top_genes().iter().enumerate() {
        for (path, sub) in gene.flat_paths() {
            if let Gene::ForeignKey(fk) = sub {
                if !fk.nullable && !fk.is_bound() {
                    return Some(Offender {
                        action_index,
                        top_gene_index,
                        path,
                    });
                }
            }
        }
    }
    None
}

/// Collision on a unique (non-auto-increment) column against every value
/// already seen for that (table, column) pair.
fn check_unique_columns(
    action: &InsertAction,
    action_index: usize,
    unique_values: &mut HashMap<(String, String), HashSet<String>>,
    all_genes: &[&Gene],
) -> Option<Offender> {
    let table_name = &action.table().name;

    for (top_gene_index, gene) in action.top_genes().iter().enumerate() {
        let column_name = gene.name();

        let is_unique = action
            .table()
            .columns
            .iter()
            .any(|c| c.name == column_name && !c.auto_increment && c.unique);
        if !is_unique {
            continue;
        }

        let key = (table_name.clone(), column_name.to_string());
        let value = string_value(gene, all_genes);
        let existing = unique_values.entry(key).or_default();
        if !existing.insert(value) {
            return Some(Offender {
                action_index,
                top_gene_index,
                path: Vec::new(),
            });
        }
    }

    None
}

/// Collision of the whole primary-key tuple for the table. Auto-increment
/// primary keys cannot collide by construction and are exempt.
fn check_primary_keys(
    action: &InsertAction,
    action_index: usize,
    pk_values: &mut HashMap<String, HashSet<String>>,
    all_genes: &[&Gene],
) -> Option<Offender> {
    let table = action.table();
    if table.primary_key_columns().is_empty() {
        // it can happen that a table has no primary key
        return None;
    }
    if table.has_auto_increment_primary_key() {
        return None;
    }

    let pk_genes: Vec<(usize, &Gene)> = action
        .top_genes()
        .iter()
        .enumerate()
        .filter(|(_, g)| matches!(g, Gene::PrimaryKey(_)))
        .collect();
    if pk_genes.is_empty() {
        return None;
    }

    // A primary key may span several columns; concatenate them
    // (column-name-sorted) into a single tuple string for the collision
    // check.
    let mut parts: Vec<(&str, String)> = pk_genes
        .iter()
        .map(|&(_, g)| (g.name(), string_value(g, all_genes)))
        .collect();
    parts.sort_by(|a, b| a.0.cmp(b.0));
    let tuple = parts
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("__");

    let existing = pk_values.entry(table.name.clone()).or_default();
    if existing.insert(tuple) {
        None
    } else {
        let (top_gene_index, _) = pk_genes[0];
        Some(Offender {
            action_index,
            top_gene_index,
            path: Vec::new(),
        })
    }
}

/// First violated table constraint, blaming one of its relevant columns.
fn check_table_constraints(
    action: &InsertAction,
    action_index: usize,
    actions: &[InsertAction],
    rng: Option<&mut Randomness>,
) -> Option<Offender> {
    let table = action.table();
    if table.constraints.is_empty() {
        return None;
    }

    let previous_rows: Vec<&dyn ColumnValues> = actions[..action_index]
        .iter()
        .filter(|a| a.table().name.eq_ignore_ascii_case(&table.name))
        .map(|a| a as &dyn ColumnValues)
        .collect();

    let mut rng = rng;
    for constraint in &table.constraints {
        if constraint.evaluate(action, &previous_rows) {
            continue;
        }

        let candidates: Vec<usize> = action
            .top_genes()
            .iter()
            .enumerate()
            .filter(|(_, g)| constraint.relevant_columns().iter().any(|c| c == g.name()))
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            // The violating columns were not selected for this action;
            // nothing here can be repaired.
            continue;
        }

        let chosen = match rng.as_deref_mut() {
            Some(r) => candidates[r.choose_index(candidates.len())],
            None => candidates[0],
        };
        return Some(Offender {
            action_index,
            top_gene_index: chosen,
            path: Vec::new(),
        });
    }

    None
}

/// The comparison value of a gene for uniqueness checks.
///
/// Value comparison cannot go through gene equality: the same logical value
/// can be represented by different gene structures (a plain value gene, or
/// an immutable placeholder for existing rows). Comparison is by printed
/// representation, except that references to non-printable data compare by a
/// synthetic token built from the referenced unique id.
pub fn string_value(gene: &Gene, all_genes: &[&Gene]) -> String {
    match gene {
        Gene::ForeignKey(fk) => match fk.reference() {
            Some(id) if is_reference_to_non_printable(fk, all_genes) => {
                format!("FK_REFERENCE_ {}", id)
            }
            _ => gene.value_as_printable_string(all_genes),
        },
        Gene::PrimaryKey(pk) => match pk.gene.as_ref() {
            Gene::ForeignKey(fk) => match fk.reference() {
                Some(id) if is_reference_to_non_printable(fk, all_genes) => {
                    format!("FK_REFERENCE_ {}", id)
                }
                _ => gene.value_as_printable_string(all_genes),
            },
            _ => gene.value_as_printable_string(all_genes),
        },
        _ => gene.value_as_printable_string(all_genes),
    }
}

/// Whether the primary key this foreign key references cannot be printed
/// (database-assigned data), following chains of keys that are themselves
/// references.
fn is_reference_to_non_printable(fk: &ForeignKeyGene, all_genes: &[&Gene]) -> bool {
    let id = match fk.reference() {
        Some(id) => id,
        None => return false,
    };
    for gene in all_genes {
        for sub in gene.flat_view() {
            if let Gene::PrimaryKey(pk) = sub {
                if pk.unique_id == id {
                    return match pk.gene.as_ref() {
                        Gene::ForeignKey(inner) => is_reference_to_non_printable(inner, all_genes),
                        inner => !inner.is_printable(),
                    };
                }
            }
        }
    }
    false
}

/// Same-table actions, filtered case-insensitively.
pub fn find_actions_by_table<'a>(
    actions: &'a [InsertAction],
    table_name: &str,
) -> Vec<&'a InsertAction> {
    actions
        .iter()
        .filter(|a| a.table().name.eq_ignore_ascii_case(table_name))
        .collect()
}
