//! InsertionBuilder: synthesize fresh, default-populated insert actions.

use std::collections::HashSet;
use std::sync::Arc;

use germ_core::{IdGenerator, UniqueId};
use germ_gene::{EnumValueCache, Gene};
use germ_schema::{Schema, Table};

use crate::{gene_for_column, BuildError, BuildResult, InsertAction};

/// Builds insert-action sequences from schema metadata.
///
/// Owns the id generator (primary-key identity) and the enum interning cache
/// for one schema-load session. The repair engine calls
/// [`InsertionBuilder::insertions_for`] when it must synthesize a missing
/// foreign-key target row.
#[derive(Debug)]
pub struct InsertionBuilder {
    schema: Schema,
    ids: IdGenerator,
    enums: EnumValueCache,
}

impl InsertionBuilder {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            ids: IdGenerator::new(),
            enums: EnumValueCache::new(),
        }
    }

    /// The schema this builder works from.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Create insert actions for `table_name`, selecting the requested
    /// columns plus every column that cannot be omitted (primary keys and
    /// non-nullable columns).
    ///
    /// Rows for foreign-key target tables are synthesized first, ancestors
    /// before descendants, and the new foreign keys are bound to their
    /// primary keys; the requested table's action is last. A target already
    /// present in the sequence is reused rather than duplicated. A cycle of
    /// non-nullable foreign keys is a [`BuildError::CyclicForeignKey`]; a
    /// nullable cycle leaves the reference unbound (`NULL`).
    pub fn insertions_for(
        &mut self,
        table_name: &str,
        columns: &[&str],
    ) -> BuildResult<Vec<InsertAction>> {
        let mut out = Vec::new();
        let mut history = Vec::new();
        self.build_into(table_name, columns, &mut history, &mut out)?;
        Ok(out)
    }

    fn build_into(
        &mut self,
        table_name: &str,
        columns: &[&str],
        history: &mut Vec<String>,
        out: &mut Vec<InsertAction>,
    ) -> BuildResult<()> {
        let table: Arc<Table> = self
            .schema
            .table(table_name)
            .cloned()
            .ok_or_else(|| BuildError::unknown_table(table_name))?;

        history.push(table.name.to_lowercase());

        let requested: HashSet<&str> = columns.iter().copied().collect();
        let mut genes = Vec::new();

        for column in &table.columns {
            let selected =
                requested.contains(column.name.as_str()) || column.primary_key || !column.nullable;
            if !selected {
                continue;
            }

            let mut gene = gene_for_column(column, &table, &self.ids, &mut self.enums);

            if let Some(fk) = table.foreign_key_for_column(&column.name) {
                let target = fk.target_table.clone();
                if history.contains(&target.to_lowercase()) {
                    if column.nullable {
                        // Cycle on a nullable reference: leave it NULL.
                    } else {
                        history.pop();
                        return Err(BuildError::CyclicForeignKey {
                            table: table.name.clone(),
                            target,
                        });
                    }
                } else {
                    let id = self.target_primary_key(&target, history, out)?;
                    bind_foreign_key(&mut gene, id);
                }
            }

            genes.push(gene);
        }

        history.pop();
        out.push(InsertAction::new(table, genes));
        Ok(())
    }

    /// Primary-key id of an action on `target`, building one (with default
    /// columns) when the sequence has none yet.
    fn target_primary_key(
        &mut self,
        target: &str,
        history: &mut Vec<String>,
        out: &mut Vec<InsertAction>,
    ) -> BuildResult<Option<UniqueId>> {
        if let Some(id) = find_primary_key_id(out, target) {
            return Ok(Some(id));
        }
        self.build_into(target, &[], history, out)?;
        Ok(find_primary_key_id(out, target))
    }
}

fn find_primary_key_id(actions: &[InsertAction], table_name: &str) -> Option<UniqueId> {
    actions
        .iter()
        .filter(|a| a.table().name.eq_ignore_ascii_case(table_name))
        .flat_map(|a| a.top_genes())
        .find_map(|g| match g {
            Gene::PrimaryKey(pk) => Some(pk.unique_id),
            _ => None,
        })
}

fn bind_foreign_key(gene: &mut Gene, id: Option<UniqueId>) {
    let id = match id {
        Some(id) => id,
        None => return,
    };
    match gene {
        Gene::ForeignKey(fk) => fk.bind(id),
        Gene::PrimaryKey(pk) => {
            if let Gene::ForeignKey(fk) = pk.gene.as_mut() {
                fk.bind(id);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use germ_schema::{Column, ColumnType, SchemaBuilder};
    use pretty_assertions::assert_eq;

    fn schema() -> Schema {
        let mut builder = SchemaBuilder::new();
        builder
            .add_table("Groups")
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(Column::new("name", ColumnType::Text))
            .done()
            .unwrap();
        builder
            .add_table("Users")
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(Column::new("email", ColumnType::Text).unique())
            .column(Column::new("group_id", ColumnType::Integer))
            .foreign_key("fk_users_group", ["group_id"], "Groups")
            .done()
            .unwrap();
        builder
            .add_table("Posts")
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(Column::new("author_id", ColumnType::Integer))
            .column(Column::new("editor_id", ColumnType::Integer))
            .foreign_key("fk_posts_author", ["author_id"], "Users")
            .foreign_key("fk_posts_editor", ["editor_id"], "Users")
            .done()
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_builds_ancestors_first() {
        // GIVEN
        let mut builder = InsertionBuilder::new(schema());

        // WHEN
        let actions = builder.insertions_for("Users", &[]).unwrap();

        // THEN - the Groups row comes before the Users row referencing it
        let tables: Vec<&str> = actions.iter().map(|a| a.table().name.as_str()).collect();
        assert_eq!(tables, vec!["Groups", "Users"]);

        let fk = match actions[1].gene_for_column("group_id").unwrap() {
            Gene::ForeignKey(fk) => fk,
            other => panic!("expected foreign key gene, got {}", other.kind_name()),
        };
        let group_pk = find_primary_key_id(&actions, "Groups").unwrap();
        assert_eq!(fk.reference(), Some(group_pk));
    }

    #[test]
    fn test_shared_target_is_reused() {
        let mut builder = InsertionBuilder::new(schema());

        let actions = builder.insertions_for("Posts", &[]).unwrap();

        // Groups, Users, Posts - the two Users references share one row.
        let tables: Vec<&str> = actions.iter().map(|a| a.table().name.as_str()).collect();
        assert_eq!(tables, vec!["Groups", "Users", "Posts"]);
    }

    #[test]
    fn test_requested_columns_are_added_to_mandatory_ones() {
        let mut builder = SchemaBuilder::new();
        builder
            .add_table("Items")
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(Column::new("label", ColumnType::Text).nullable())
            .column(Column::new("stock", ColumnType::Integer))
            .done()
            .unwrap();
        let mut builder = InsertionBuilder::new(builder.build().unwrap());

        let default_actions = builder.insertions_for("Items", &[]).unwrap();
        let with_label = builder.insertions_for("Items", &["label"]).unwrap();

        assert!(default_actions[0].gene_for_column("label").is_none());
        assert!(default_actions[0].gene_for_column("stock").is_some());
        assert!(with_label[0].gene_for_column("label").is_some());
    }

    #[test]
    fn test_unknown_table_is_an_error() {
        let mut builder = InsertionBuilder::new(schema());
        assert!(matches!(
            builder.insertions_for("Nope", &[]),
            Err(BuildError::UnknownTable { .. })
        ));
    }

    #[test]
    fn test_nullable_self_reference_stays_null() {
        let mut schema_builder = SchemaBuilder::new();
        schema_builder
            .add_table("Employees")
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(Column::new("manager_id", ColumnType::Integer).nullable())
            .foreign_key("fk_employees_manager", ["manager_id"], "Employees")
            .done()
            .unwrap();
        let mut builder = InsertionBuilder::new(schema_builder.build().unwrap());

        let actions = builder.insertions_for("Employees", &["manager_id"]).unwrap();

        assert_eq!(actions.len(), 1);
        match actions[0].gene_for_column("manager_id").unwrap() {
            Gene::ForeignKey(fk) => assert!(!fk.is_bound()),
            other => panic!("expected foreign key gene, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_non_nullable_cycle_is_rejected() {
        let mut schema_builder = SchemaBuilder::new();
        schema_builder
            .add_table("Chickens")
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(Column::new("egg_id", ColumnType::Integer))
            .foreign_key("fk_chickens_egg", ["egg_id"], "Eggs")
            .done()
            .unwrap();
        schema_builder
            .add_table("Eggs")
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(Column::new("chicken_id", ColumnType::Integer))
            .foreign_key("fk_eggs_chicken", ["chicken_id"], "Chickens")
            .done()
            .unwrap();
        let mut builder = InsertionBuilder::new(schema_builder.build().unwrap());

        assert!(matches!(
            builder.insertions_for("Chickens", &[]),
            Err(BuildError::CyclicForeignKey { .. })
        ));
    }
}
