//! End-to-end consistency and repair scenarios across the builder, checker,
//! and repair engine.

use std::sync::Arc;

use germ_action::{sort_tables_by_foreign_keys, InsertAction, InsertionBuilder};
use germ_core::{Randomness, UniqueId};
use germ_gene::{
    EnumGene, EnumValueCache, ForeignKeyGene, Gene, IntegerGene, PrimaryKeyGene, StringGene,
};
use germ_repair::{
    find_first_offending_gene, randomize_actions, repair_broken_actions,
    repair_foreign_keys_with_builder, verify_actions, verify_foreign_keys,
    DEFAULT_MAX_REPAIR_ATTEMPTS,
};
use germ_schema::{Column, ColumnType, Schema, SchemaBuilder, Table, TableConstraint};
use pretty_assertions::assert_eq;

fn blog_schema() -> Schema {
    let mut builder = SchemaBuilder::new();
    builder
        .add_table("Authors")
        .column(Column::new("id", ColumnType::Integer).primary_key())
        .column(Column::new("handle", ColumnType::Text).unique())
        .done()
        .unwrap();
    builder
        .add_table("Posts")
        .column(Column::new("id", ColumnType::Integer).primary_key())
        .column(Column::new("author_id", ColumnType::Integer))
        .column(Column::new("title", ColumnType::Text))
        .foreign_key("fk_posts_author", ["author_id"], "Authors")
        .done()
        .unwrap();
    builder.build().unwrap()
}

#[test]
fn pk_fk_round_trip_through_sort_and_builder() {
    // GIVEN - tables ordered topologically (Posts references Authors)
    let schema = blog_schema();
    let sorted = sort_tables_by_foreign_keys(schema.tables(), false);
    let names: Vec<&str> = sorted.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Authors", "Posts"]);

    // WHEN - building insertions for the dependent table
    let mut builder = InsertionBuilder::new(schema);
    let mut actions = builder.insertions_for("Posts", &[]).unwrap();

    // THEN - the generated sequence resolves
    assert!(verify_foreign_keys(&actions));
    assert!(verify_actions(&actions));

    // and randomization keeps it resolvable
    let mut rng = Randomness::new(101);
    randomize_actions(&mut actions, &mut rng);
    assert!(verify_foreign_keys(&actions));

    // while reversing the order (Posts before Authors) breaks it
    actions.reverse();
    assert!(!verify_foreign_keys(&actions));
}

#[test]
fn dependent_action_alone_fails_verification() {
    // A Posts row with its author row missing entirely.
    let schema = blog_schema();
    let mut builder = InsertionBuilder::new(schema);
    let actions = builder.insertions_for("Posts", &[]).unwrap();

    let posts_only: Vec<InsertAction> = actions
        .iter()
        .filter(|a| a.table().name == "Posts")
        .cloned()
        .collect();

    assert!(!verify_foreign_keys(&posts_only));
}

#[test]
fn verification_is_idempotent_without_mutation() {
    let schema = blog_schema();
    let mut builder = InsertionBuilder::new(schema);
    let actions = builder.insertions_for("Posts", &[]).unwrap();

    for _ in 0..3 {
        assert_eq!(verify_actions(&actions), verify_actions(&actions));
    }
}

fn users_table() -> Arc<Table> {
    Arc::new(Table {
        name: "Users".to_string(),
        columns: vec![
            Column::new("id", ColumnType::Integer).primary_key(),
            Column::new("email", ColumnType::Text).unique(),
        ],
        foreign_keys: vec![],
        constraints: vec![],
    })
}

fn user_action(pk_id: u64, id_value: i64, email: &str) -> InsertAction {
    InsertAction::new(
        users_table(),
        vec![
            Gene::PrimaryKey(PrimaryKeyGene::new(
                "id",
                "Users",
                UniqueId::new(pk_id),
                Gene::Integer(IntegerGene::new("id").with_value(id_value)),
            )),
            Gene::Str(
                StringGene::new("email")
                    .with_value(email)
                    .with_length(5, 20),
            ),
        ],
    )
}

#[test]
fn repair_fixes_unique_collision_without_truncation() {
    // GIVEN - two rows colliding on a unique email
    let mut actions = vec![
        user_action(1, 1, "a@example.com"),
        user_action(2, 2, "a@example.com"),
    ];
    let mut rng = Randomness::new(7);
    assert!(!verify_actions(&actions));

    // WHEN
    let fully_repaired =
        repair_broken_actions(&mut actions, &mut rng, DEFAULT_MAX_REPAIR_ATTEMPTS);

    // THEN - repaired in place, nothing removed
    assert!(fully_repaired);
    assert_eq!(actions.len(), 2);
    assert!(verify_actions(&actions));
}

#[test]
fn repair_truncates_unsatisfiable_action() {
    // GIVEN - a unique enum column whose domain has exactly one value: the
    // second row can never be made distinct.
    let table = Arc::new(Table {
        name: "Flags".to_string(),
        columns: vec![Column::new("kind", ColumnType::Text).unique()],
        foreign_keys: vec![],
        constraints: vec![],
    });
    let mut cache = EnumValueCache::new();
    let action = |cache: &mut EnumValueCache| {
        InsertAction::new(
            table.clone(),
            vec![Gene::Enum(EnumGene::new(
                "kind",
                vec!["ONLY".into()],
                cache,
            ))],
        )
    };
    let mut actions = vec![action(&mut cache), action(&mut cache), action(&mut cache)];
    let mut rng = Randomness::new(13);

    // WHEN
    let fully_repaired =
        repair_broken_actions(&mut actions, &mut rng, DEFAULT_MAX_REPAIR_ATTEMPTS);

    // THEN - the sequence is strictly shorter and the remainder verifies
    assert!(!fully_repaired);
    assert_eq!(actions.len(), 1);
    assert!(verify_actions(&actions));
}

#[test]
fn repair_with_zero_attempts_truncates_at_first_offense() {
    let mut actions = vec![
        user_action(1, 1, "a@example.com"),
        user_action(2, 2, "a@example.com"),
    ];
    let mut rng = Randomness::new(3);

    let fully_repaired = repair_broken_actions(&mut actions, &mut rng, 0);

    assert!(!fully_repaired);
    assert_eq!(actions.len(), 1);
    assert!(verify_actions(&actions));
}

#[test]
fn repair_converges_over_many_seeds() {
    // Repair must either fully fix the sequence or truncate it; in both
    // cases the remainder verifies. Exercising many seeds also checks that
    // the offending index never regresses (a regression panics).
    for seed in 0..50 {
        let mut actions = vec![
            user_action(1, 1, "dup@example.com"),
            user_action(2, 1, "dup@example.com"),
            user_action(3, 1, "dup@example.com"),
        ];
        let mut rng = Randomness::new(seed);

        let fully_repaired =
            repair_broken_actions(&mut actions, &mut rng, DEFAULT_MAX_REPAIR_ATTEMPTS);

        assert!(verify_actions(&actions), "seed {} left a broken sequence", seed);
        if !fully_repaired {
            assert!(actions.len() < 3, "seed {} truncated nothing", seed);
        }
    }
}

#[test]
fn repair_rebinds_foreign_key_against_prefix() {
    // GIVEN - a valid builder-made sequence whose FK is then broken
    let schema = blog_schema();
    let mut builder = InsertionBuilder::new(schema);
    let mut actions = builder.insertions_for("Posts", &[]).unwrap();
    let posts_index = actions
        .iter()
        .position(|a| a.table().name == "Posts")
        .unwrap();
    if let Some(Gene::ForeignKey(fk)) = actions[posts_index]
        .top_genes_mut()
        .iter_mut()
        .find(|g| matches!(g, Gene::ForeignKey(_)))
    {
        fk.unbind();
    }
    assert!(!verify_foreign_keys(&actions));

    // WHEN
    let mut rng = Randomness::new(23);
    let fully_repaired =
        repair_broken_actions(&mut actions, &mut rng, DEFAULT_MAX_REPAIR_ATTEMPTS);

    // THEN - the FK rebinds to the author row already in the prefix
    assert!(fully_repaired);
    assert!(verify_actions(&actions));
}

#[test]
fn builder_synthesizes_missing_fk_target() {
    // GIVEN - a Posts action with no Authors row anywhere
    let schema = blog_schema();
    let mut builder = InsertionBuilder::new(schema);
    let all = builder.insertions_for("Posts", &[]).unwrap();
    let mut post = all
        .iter()
        .find(|a| a.table().name == "Posts")
        .cloned()
        .unwrap();
    let mut previous: Vec<InsertAction> = Vec::new();
    let mut created: Vec<InsertAction> = Vec::new();
    let mut rng = Randomness::new(41);

    // WHEN
    let repaired = repair_foreign_keys_with_builder(
        &mut post,
        &mut previous,
        &mut created,
        Some(&mut builder),
        &mut rng,
    )
    .unwrap();

    // THEN - an Authors row was synthesized and the post bound to it
    assert!(!repaired.is_empty());
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].table().name, "Authors");

    let mut sequence = previous.clone();
    sequence.push(post);
    assert!(verify_foreign_keys(&sequence));
}

#[test]
fn missing_builder_is_a_configuration_error() {
    let schema = blog_schema();
    let mut builder = InsertionBuilder::new(schema);
    let all = builder.insertions_for("Posts", &[]).unwrap();
    let mut post = all
        .iter()
        .find(|a| a.table().name == "Posts")
        .cloned()
        .unwrap();
    if let Some(Gene::ForeignKey(fk)) = post
        .top_genes_mut()
        .iter_mut()
        .find(|g| matches!(g, Gene::ForeignKey(_)))
    {
        fk.unbind();
    }
    let mut previous: Vec<InsertAction> = Vec::new();
    let mut created: Vec<InsertAction> = Vec::new();
    let mut rng = Randomness::new(41);

    let result = repair_foreign_keys_with_builder(
        &mut post,
        &mut previous,
        &mut created,
        None,
        &mut rng,
    );

    assert!(matches!(
        result,
        Err(germ_repair::RepairError::NoInsertionBuilder { .. })
    ));
}

#[test]
fn table_constraint_violation_is_detected_and_repaired() {
    // GIVEN - a range-constrained column violated by the second row
    let mut schema_builder = SchemaBuilder::new();
    schema_builder
        .add_table("Scores")
        .column(Column::new("points", ColumnType::Integer).with_range(Some(0), Some(1000)))
        .constraint(TableConstraint::Range {
            column: "points".to_string(),
            min: 0,
            max: 100,
        })
        .done()
        .unwrap();
    let schema = schema_builder.build().unwrap();
    let table = schema.table("Scores").unwrap().clone();

    let action = |value: i64| {
        InsertAction::new(
            table.clone(),
            vec![Gene::Integer(
                IntegerGene::new("points")
                    .with_range(Some(0), Some(100))
                    .with_value(value),
            )],
        )
    };
    let mut actions = vec![action(50), action(7777)];
    assert!(find_first_offending_gene(&actions, None).is_some());

    // WHEN
    let mut rng = Randomness::new(5);
    let fully_repaired =
        repair_broken_actions(&mut actions, &mut rng, DEFAULT_MAX_REPAIR_ATTEMPTS);

    // THEN
    assert!(fully_repaired);
    assert!(verify_actions(&actions));
}

#[test]
fn unbound_fk_on_root_action_truncates_to_empty() {
    // A lone action with a non-nullable unbound FK can never verify: there
    // is no prefix to bind against, so repair gives up and truncates.
    let table = Arc::new(Table {
        name: "Posts".to_string(),
        columns: vec![Column::new("author_id", ColumnType::Integer)],
        foreign_keys: vec![germ_schema::ForeignKeyDef {
            name: "fk_posts_author".to_string(),
            source_columns: vec!["author_id".to_string()],
            target_table: "Authors".to_string(),
        }],
        constraints: vec![],
    });
    let mut actions = vec![InsertAction::new(
        table,
        vec![Gene::ForeignKey(ForeignKeyGene::new(
            "author_id",
            "Authors",
            false,
        ))],
    )];
    let mut rng = Randomness::new(11);

    let fully_repaired =
        repair_broken_actions(&mut actions, &mut rng, DEFAULT_MAX_REPAIR_ATTEMPTS);

    assert!(!fully_repaired);
    assert!(actions.is_empty());
    assert!(verify_actions(&actions));
}
