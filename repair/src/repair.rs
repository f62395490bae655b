//! Bounded-attempt repair of broken insert-action sequences.

use germ_action::{InsertAction, InsertionBuilder};
use germ_core::{Randomness, UniqueId};
use germ_gene::{Gene, GenePath};
use tracing::trace;

use crate::{
    find_first_offending_gene, verify_foreign_keys, Offender, RepairError, RepairResult,
};

/// Default bound on repair attempts per action index.
pub const DEFAULT_MAX_REPAIR_ATTEMPTS: usize = 5;

/// Try to fix each broken action in place.
///
/// The loop finds the first offending gene, re-randomizes it with
/// force-new-value semantics (foreign keys rebind against the primary keys
/// of the action prefix), and re-scans. The attempt counter is scoped to one
/// action index: it resets whenever the offending index advances and
/// increments when it repeats. When an action exhausts its attempts (it is
/// not satisfiable given its prefix), that action and everything after it
/// are removed.
///
/// Returns true if the sequence was fixed without removing any action,
/// false if actions had to be removed; either way the remaining sequence
/// verifies.
///
/// Panics if the offending index ever regresses: the scan order makes that
/// impossible, so a regression is an engine bug, not a data problem.
pub fn repair_broken_actions(
    actions: &mut Vec<InsertAction>,
    rng: &mut Randomness,
    max_attempts: usize,
) -> bool {
    trace!(
        "before repair, the actions are {}",
        describe_actions(actions)
    );

    let mut attempt_counter = 0usize;
    let mut previous_index: Option<usize> = None;

    let mut offender = find_first_offending_gene(actions, Some(rng));

    loop {
        let current = match &offender {
            Some(o) if attempt_counter < max_attempts => o.clone(),
            _ => break,
        };

        randomize_offending_gene(actions, &current, rng);

        match previous_index {
            Some(prev) if current.action_index == prev => attempt_counter += 1,
            Some(prev) if current.action_index < prev => panic!(
                "BUG in germ: last action repaired at position {}, but new action \
                 to repair at position {}",
                prev, current.action_index
            ),
            _ => {
                attempt_counter = 0;
                previous_index = Some(current.action_index);
            }
        }

        offender = find_first_offending_gene(actions, Some(rng));
    }

    match offender {
        None => {
            trace!(
                "nothing removed; after repair, the actions are {}",
                describe_actions(actions)
            );
            true
        }
        Some(stuck) => {
            debug_assert!(stuck.action_index < actions.len());
            // Truncate the list of actions to make the remainder valid.
            actions.truncate(stuck.action_index);
            trace!(
                "sequence truncated; after repair, the actions are {}",
                describe_actions(actions)
            );
            false
        }
    }
}

fn randomize_offending_gene(
    actions: &mut [InsertAction],
    offender: &Offender,
    rng: &mut Randomness,
) {
    let candidates = primary_key_ids_in_prefix(actions, offender.action_index);
    let gene = match offender.resolve_mut(actions) {
        Some(gene) => gene,
        None => return,
    };
    match gene {
        Gene::ForeignKey(fk) => {
            let pool = candidates_for_table(&candidates, &fk.target_table);
            fk.randomize_with_candidates(rng, true, &pool);
        }
        gene if gene.is_mutable() => gene.randomize(rng, true),
        _ => {}
    }
}

/// (table, id) of every primary key appearing strictly before `index`.
fn primary_key_ids_in_prefix(
    actions: &[InsertAction],
    index: usize,
) -> Vec<(String, UniqueId)> {
    actions[..index.min(actions.len())]
        .iter()
        .flat_map(|a| a.top_genes())
        .filter_map(|g| match g {
            Gene::PrimaryKey(pk) => Some((pk.table_name.clone(), pk.unique_id)),
            _ => None,
        })
        .collect()
}

fn candidates_for_table(candidates: &[(String, UniqueId)], table: &str) -> Vec<UniqueId> {
    candidates
        .iter()
        .filter(|(t, _)| t.eq_ignore_ascii_case(table))
        .map(|(_, id)| *id)
        .collect()
}

/// Randomize every gene of a fresh sequence, position by position. Foreign
/// keys rebind among the primary keys of earlier actions on their target
/// table (going `NULL` when nullable with no candidate).
pub fn randomize_actions(actions: &mut [InsertAction], rng: &mut Randomness) {
    for i in 0..actions.len() {
        let candidates = primary_key_ids_in_prefix(actions, i);
        for gene in actions[i].top_genes_mut() {
            randomize_gene(gene, rng, &candidates);
        }
    }
    debug_assert!(verify_foreign_keys(actions));
}

fn randomize_gene(gene: &mut Gene, rng: &mut Randomness, candidates: &[(String, UniqueId)]) {
    match gene {
        Gene::ForeignKey(fk) => {
            let pool = candidates_for_table(candidates, &fk.target_table);
            fk.randomize_with_candidates(rng, false, &pool);
        }
        Gene::PrimaryKey(pk) => {
            if let Gene::ForeignKey(fk) = pk.gene.as_mut() {
                let pool = candidates_for_table(candidates, &fk.target_table);
                fk.randomize_with_candidates(rng, false, &pool);
            } else if pk.is_mutable() {
                pk.randomize(rng, false);
            }
        }
        gene if gene.is_mutable() => gene.randomize(rng, false),
        _ => {}
    }
}

/// Rebind the foreign keys of one action against the primary keys of the
/// actions before it, without synthesizing anything.
///
/// Every dangling or unbound reference is pointed at some primary key of its
/// target table found in `previous`. Returns false when a target table has
/// no row to bind to.
pub fn repair_foreign_keys(action: &mut InsertAction, previous: &[InsertAction]) -> bool {
    let pks = primary_key_ids_in_prefix(previous, previous.len());
    let locations = foreign_key_locations(action);

    for (top_gene_index, path) in locations {
        let (target_table, reference) = match resolve_fk(action, top_gene_index, &path) {
            Some(fk) => fk,
            None => continue,
        };

        let resolves = reference
            .map(|id| {
                pks.iter()
                    .any(|(t, pid)| *pid == id && t.eq_ignore_ascii_case(&target_table))
            })
            .unwrap_or(false);
        if resolves {
            continue;
        }

        match pks.iter().find(|(t, _)| t.eq_ignore_ascii_case(&target_table)) {
            Some((_, id)) => bind_fk(action, top_gene_index, &path, *id),
            None => return false,
        }
    }

    true
}

/// Rebind the foreign keys of one action, synthesizing rows for missing
/// target tables through the insertion builder.
///
/// Synthesized actions are appended to `previous` (so later references can
/// reuse them) and recorded in `created`. Their own foreign keys are
/// recursively repaired before use. Returns the primary-key ids the action
/// was bound to.
///
/// Needing a row for a table with no builder available is a configuration
/// error, not recoverable data.
pub fn repair_foreign_keys_with_builder(
    action: &mut InsertAction,
    previous: &mut Vec<InsertAction>,
    created: &mut Vec<InsertAction>,
    mut builder: Option<&mut InsertionBuilder>,
    rng: &mut Randomness,
) -> RepairResult<Vec<UniqueId>> {
    let mut repaired = Vec::new();
    if action.table().foreign_keys.is_empty() {
        return Ok(repaired);
    }

    let locations = foreign_key_locations(action);
    for (top_gene_index, path) in locations {
        let (target_table, reference) = match resolve_fk(action, top_gene_index, &path) {
            Some(fk) => fk,
            None => continue,
        };

        let pks = primary_key_ids_in_prefix(previous, previous.len());
        if reference
            .map(|id| pks.iter().any(|(_, pid)| *pid == id))
            .unwrap_or(false)
        {
            continue;
        }

        let found = pks
            .iter()
            .find(|(t, pid)| t.eq_ignore_ascii_case(&target_table) && Some(*pid) != reference)
            .map(|(_, id)| *id);

        let id = match found {
            Some(id) => id,
            None => {
                let builder =
                    builder
                        .as_deref_mut()
                        .ok_or_else(|| RepairError::NoInsertionBuilder {
                            table: target_table.clone(),
                        })?;
                let mut new_actions = builder.insertions_for(&target_table, &[])?;
                trace!(
                    "insertion created during foreign-key repair: {}",
                    describe_actions(&new_actions)
                );
                randomize_actions(&mut new_actions, rng);
                repair_fk_for_insertions(&mut new_actions)?;

                let new_id = primary_key_ids_in_prefix(&new_actions, new_actions.len())
                    .iter()
                    .find(|(t, pid)| {
                        t.eq_ignore_ascii_case(&target_table) && Some(*pid) != reference
                    })
                    .map(|(_, id)| *id)
                    .ok_or_else(|| RepairError::ForeignKeyTargetMissing {
                        table: target_table.clone(),
                    })?;

                repaired.extend(
                    primary_key_ids_in_prefix(&new_actions, new_actions.len())
                        .iter()
                        .map(|(_, id)| *id),
                );
                created.extend(new_actions.iter().cloned());
                previous.extend(new_actions);
                new_id
            }
        };

        bind_fk(action, top_gene_index, &path, id);
        repaired.push(id);
    }

    Ok(repaired)
}

/// Rebinding sweep over a freshly synthesized sequence: every foreign key is
/// pointed at a primary key of its target table earlier in the sequence.
///
/// A first action carrying a non-nullable unbound foreign key, a target
/// table with no earlier row, or a sweep that still fails verification are
/// hard errors: the schema cannot be seeded in this order.
pub fn repair_fk_for_insertions(actions: &mut [InsertAction]) -> RepairResult<()> {
    for index in 0..actions.len() {
        let locations = foreign_key_locations(&actions[index]);

        if index == 0 {
            let has_unbound_required = locations.iter().any(|(ti, path)| {
                match resolve_fk_full(&actions[0], *ti, path) {
                    Some((_, reference, nullable)) => !nullable && reference.is_none(),
                    None => false,
                }
            });
            if has_unbound_required {
                return Err(RepairError::InvalidInsertion { index: 0 });
            }
        }

        let pks = primary_key_ids_in_prefix(actions, index);
        for (top_gene_index, path) in locations {
            let (target_table, reference, nullable) =
                match resolve_fk_full(&actions[index], top_gene_index, &path) {
                    Some(fk) => fk,
                    None => continue,
                };

            let dangling = (!nullable && reference.is_none())
                || !reference
                    .map(|id| pks.iter().any(|(_, pid)| *pid == id))
                    .unwrap_or(false);
            if !dangling {
                continue;
            }

            let id = pks
                .iter()
                .find(|(t, _)| t.eq_ignore_ascii_case(&target_table))
                .map(|(_, id)| *id)
                .ok_or_else(|| RepairError::ForeignKeyTargetMissing {
                    table: target_table.clone(),
                })?;
            bind_fk(&mut actions[index], top_gene_index, &path, id);
        }
    }

    if !verify_foreign_keys(actions) {
        return Err(RepairError::ForeignKeyRepairFailed);
    }
    Ok(())
}

fn foreign_key_locations(action: &InsertAction) -> Vec<(usize, GenePath)> {
    let mut out = Vec::new();
    for (top_gene_index, gene) in action.top_genes().iter().enumerate() {
        for (path, sub) in gene.flat_paths() {
            if matches!(sub, Gene::ForeignKey(_)) {
                out.push((top_gene_index, path));
            }
        }
    }
    out
}

fn resolve_fk(
    action: &InsertAction,
    top_gene_index: usize,
    path: &[usize],
) -> Option<(String, Option<UniqueId>)> {
    resolve_fk_full(action, top_gene_index, path).map(|(t, r, _)| (t, r))
}

fn resolve_fk_full(
    action: &InsertAction,
    top_gene_index: usize,
    path: &[usize],
) -> Option<(String, Option<UniqueId>, bool)> {
    match action.top_genes().get(top_gene_index)?.descend(path)? {
        Gene::ForeignKey(fk) => Some((fk.target_table.clone(), fk.reference(), fk.nullable)),
        _ => None,
    }
}

fn bind_fk(action: &mut InsertAction, top_gene_index: usize, path: &[usize], id: UniqueId) {
    if let Some(Gene::ForeignKey(fk)) = action
        .top_genes_mut()
        .get_mut(top_gene_index)
        .and_then(|g| g.descend_mut(path))
    {
        fk.bind(id);
    }
}

fn describe_actions(actions: &[InsertAction]) -> String {
    actions
        .iter()
        .map(|a| a.resolved_name())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use germ_gene::{ForeignKeyGene, IntegerGene, PrimaryKeyGene, StringGene};
    use germ_schema::{Column, ColumnType, ForeignKeyDef, Table};

    fn groups_table() -> Arc<Table> {
        Arc::new(Table {
            name: "Groups".to_string(),
            columns: vec![Column::new("id", ColumnType::Integer).primary_key()],
            foreign_keys: vec![],
            constraints: vec![],
        })
    }

    fn users_table() -> Arc<Table> {
        Arc::new(Table {
            name: "Users".to_string(),
            columns: vec![
                Column::new("id", ColumnType::Integer).primary_key(),
                Column::new("group_id", ColumnType::Integer),
            ],
            foreign_keys: vec![ForeignKeyDef {
                name: "fk_users_group".to_string(),
                source_columns: vec!["group_id".to_string()],
                target_table: "Groups".to_string(),
            }],
            constraints: vec![],
        })
    }

    fn group_action(pk_id: u64, value: i64) -> InsertAction {
        InsertAction::new(
            groups_table(),
            vec![Gene::PrimaryKey(PrimaryKeyGene::new(
                "id",
                "Groups",
                germ_core::UniqueId::new(pk_id),
                Gene::Integer(IntegerGene::new("id").with_value(value)),
            ))],
        )
    }

    fn user_action(pk_id: u64, fk: ForeignKeyGene) -> InsertAction {
        InsertAction::new(
            users_table(),
            vec![
                Gene::PrimaryKey(PrimaryKeyGene::new(
                    "id",
                    "Users",
                    germ_core::UniqueId::new(pk_id),
                    Gene::Integer(IntegerGene::new("id").with_value(pk_id as i64)),
                )),
                Gene::ForeignKey(fk),
            ],
        )
    }

    #[test]
    fn test_repair_binds_dangling_fk_to_existing_row() {
        // GIVEN - a user whose group reference dangles
        let mut fk = ForeignKeyGene::new("group_id", "Groups", false);
        fk.bind(germ_core::UniqueId::new(999));
        let previous = vec![group_action(1, 10)];
        let mut action = user_action(2, fk);

        // WHEN
        let fixed = repair_foreign_keys(&mut action, &previous);

        // THEN
        assert!(fixed);
        match action.gene_for_column("group_id").unwrap() {
            Gene::ForeignKey(fk) => assert_eq!(fk.reference(), Some(germ_core::UniqueId::new(1))),
            other => panic!("expected foreign key gene, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_repair_without_target_row_fails() {
        let fk = ForeignKeyGene::new("group_id", "Groups", false);
        let mut action = user_action(2, fk);

        assert!(!repair_foreign_keys(&mut action, &[]));
    }

    #[test]
    fn test_repair_fk_for_insertions_rebinding() {
        // GIVEN - group first, then a user with a dangling reference
        let mut fk = ForeignKeyGene::new("group_id", "Groups", false);
        fk.bind(germ_core::UniqueId::new(999));
        let mut actions = vec![group_action(1, 10), user_action(2, fk)];

        // WHEN
        repair_fk_for_insertions(&mut actions).unwrap();

        // THEN
        assert!(verify_foreign_keys(&actions));
    }

    #[test]
    fn test_repair_fk_for_insertions_rejects_unresolved_root() {
        let fk = ForeignKeyGene::new("group_id", "Groups", false);
        let mut actions = vec![user_action(1, fk)];

        let result = repair_fk_for_insertions(&mut actions);

        assert!(matches!(
            result,
            Err(RepairError::InvalidInsertion { index: 0 })
        ));
    }

    #[test]
    fn test_string_gene_repair_on_unique_collision() {
        // GIVEN - two rows colliding on a unique text column
        let table = Arc::new(Table {
            name: "Tags".to_string(),
            columns: vec![Column::new("label", ColumnType::Text).unique()],
            foreign_keys: vec![],
            constraints: vec![],
        });
        let action = |value: &str| {
            InsertAction::new(
                table.clone(),
                vec![Gene::Str(
                    StringGene::new("label").with_value(value).with_length(3, 12),
                )],
            )
        };
        let mut actions = vec![action("dup"), action("dup")];
        let mut rng = Randomness::new(17);

        // WHEN
        let fully_repaired =
            repair_broken_actions(&mut actions, &mut rng, DEFAULT_MAX_REPAIR_ATTEMPTS);

        // THEN
        assert!(fully_repaired);
        assert_eq!(actions.len(), 2);
        assert!(crate::verify_actions(&actions));
    }
}
