//! Schema→gene translation: one gene per column.

use germ_core::IdGenerator;
use germ_gene::{
    AutoIncrementGene, BooleanGene, DateGene, DateTimeFormat, DateTimeGene, EnumGene,
    EnumValueCache, FloatGene, ForeignKeyGene, Gene, IntegerGene, OptionalGene, PrimaryKeyGene,
    StringGene, TimeGene,
};
use germ_schema::{Column, ColumnType, Table};

/// Build the gene for one column of `table`.
///
/// Foreign-key source columns become (unbound) foreign-key genes; primary-key
/// columns wrap their value gene in a primary-key gene carrying a fresh
/// unique id (auto-increment keys wrap a database-assigned placeholder);
/// nullable non-key columns wrap in an optional gene. Enumeration domains are
/// interned through `enums` so equal value sets share one list.
pub fn gene_for_column(
    column: &Column,
    table: &Table,
    ids: &IdGenerator,
    enums: &mut EnumValueCache,
) -> Gene {
    let base = if let Some(fk) = table.foreign_key_for_column(&column.name) {
        Gene::ForeignKey(ForeignKeyGene::new(
            &column.name,
            &fk.target_table,
            column.nullable,
        ))
    } else if column.auto_increment {
        Gene::AutoIncrement(AutoIncrementGene::new(&column.name))
    } else {
        value_gene(column, enums)
    };

    if column.primary_key {
        return Gene::PrimaryKey(PrimaryKeyGene::new(
            &column.name,
            &table.name,
            ids.fresh(),
            base,
        ));
    }

    // Foreign keys model nullability themselves; wrapping them again would
    // hide the reference from the repair engine.
    if column.nullable && !matches!(base, Gene::ForeignKey(_)) {
        return Gene::Optional(OptionalGene::new(&column.name, base));
    }

    base
}

fn value_gene(column: &Column, enums: &mut EnumValueCache) -> Gene {
    match &column.column_type {
        ColumnType::Boolean => Gene::Boolean(BooleanGene::new(&column.name)),
        ColumnType::Integer => {
            Gene::Integer(IntegerGene::new(&column.name).with_range(column.min, column.max))
        }
        ColumnType::Float => Gene::Float(
            FloatGene::new(&column.name)
                .with_range(column.min.map(|v| v as f64), column.max.map(|v| v as f64)),
        ),
        ColumnType::Text => {
            let gene = StringGene::new(&column.name);
            let gene = match (column.length_min, column.length_max) {
                (Some(min), Some(max)) => gene.with_length(min, max),
                (Some(min), None) => gene.with_length(min, min.max(16)),
                (None, Some(max)) => gene.with_length(0, max),
                (None, None) => gene,
            };
            Gene::Str(gene)
        }
        ColumnType::Date => Gene::Date(DateGene::new(&column.name)),
        ColumnType::Time => Gene::Time(TimeGene::new(&column.name)),
        ColumnType::Timestamp => Gene::DateTime(
            DateTimeGene::new(&column.name).with_format(DateTimeFormat::DefaultDateTime),
        ),
        ColumnType::Enumeration(values) => {
            let literals = values.iter().map(|v| v.as_str().into()).collect();
            Gene::Enum(EnumGene::new(&column.name, literals, enums))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use germ_schema::ForeignKeyDef;

    fn table_with(columns: Vec<Column>, foreign_keys: Vec<ForeignKeyDef>) -> Table {
        Table {
            name: "Orders".to_string(),
            columns,
            foreign_keys,
            constraints: vec![],
        }
    }

    #[test]
    fn test_primary_key_column_wraps_value_gene() {
        let ids = IdGenerator::new();
        let mut enums = EnumValueCache::new();
        let table = table_with(
            vec![Column::new("id", ColumnType::Integer).primary_key()],
            vec![],
        );

        let gene = gene_for_column(&table.columns[0], &table, &ids, &mut enums);

        match gene {
            Gene::PrimaryKey(pk) => {
                assert_eq!(pk.table_name, "Orders");
                assert!(matches!(*pk.gene, Gene::Integer(_)));
            }
            other => panic!("expected primary key gene, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_auto_increment_primary_key_is_non_printable() {
        let ids = IdGenerator::new();
        let mut enums = EnumValueCache::new();
        let table = table_with(
            vec![Column::new("id", ColumnType::Integer)
                .primary_key()
                .auto_increment()],
            vec![],
        );

        let gene = gene_for_column(&table.columns[0], &table, &ids, &mut enums);

        assert!(!gene.is_printable());
        match gene {
            Gene::PrimaryKey(pk) => assert!(matches!(*pk.gene, Gene::AutoIncrement(_))),
            other => panic!("expected primary key gene, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_fk_column_becomes_unbound_foreign_key() {
        let ids = IdGenerator::new();
        let mut enums = EnumValueCache::new();
        let table = table_with(
            vec![Column::new("user_id", ColumnType::Integer).nullable()],
            vec![ForeignKeyDef {
                name: "fk_orders_user".to_string(),
                source_columns: vec!["user_id".to_string()],
                target_table: "Users".to_string(),
            }],
        );

        let gene = gene_for_column(&table.columns[0], &table, &ids, &mut enums);

        match gene {
            Gene::ForeignKey(fk) => {
                assert_eq!(fk.target_table, "Users");
                assert!(fk.nullable);
                assert!(!fk.is_bound());
            }
            other => panic!("expected foreign key gene, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_nullable_column_wraps_in_optional() {
        let ids = IdGenerator::new();
        let mut enums = EnumValueCache::new();
        let table = table_with(
            vec![Column::new("note", ColumnType::Text).nullable()],
            vec![],
        );

        let gene = gene_for_column(&table.columns[0], &table, &ids, &mut enums);

        assert!(matches!(gene, Gene::Optional(_)));
    }

    #[test]
    fn test_enumeration_columns_share_interned_values() {
        let ids = IdGenerator::new();
        let mut enums = EnumValueCache::new();
        let column_a = Column::new(
            "state",
            ColumnType::Enumeration(vec!["OPEN".to_string(), "CLOSED".to_string()]),
        );
        let column_b = Column::new(
            "previous_state",
            ColumnType::Enumeration(vec!["CLOSED".to_string(), "OPEN".to_string()]),
        );
        let table = table_with(vec![column_a.clone(), column_b.clone()], vec![]);

        let a = gene_for_column(&column_a, &table, &ids, &mut enums);
        let b = gene_for_column(&column_b, &table, &ids, &mut enums);

        match (a, b) {
            (Gene::Enum(a), Gene::Enum(b)) => assert!(a.shares_values_with(&b)),
            _ => panic!("expected enum genes"),
        }
    }
}
