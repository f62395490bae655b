//! The insert action: one pending row insertion.

use std::sync::Arc;

use germ_gene::Gene;
use germ_schema::{ColumnValues, Table};

/// One row insertion: immutable table metadata plus the top-level genes bound
/// to its columns, in column order.
///
/// An action exclusively owns its genes. Cloning an action deep-clones the
/// genes (values, not identity: primary-key unique ids are preserved so
/// foreign-key bindings in a cloned sequence stay intact) while the table
/// metadata stays shared.
#[derive(Debug, Clone)]
pub struct InsertAction {
    table: Arc<Table>,
    genes: Vec<Gene>,
}

impl InsertAction {
    pub fn new(table: Arc<Table>, genes: Vec<Gene>) -> Self {
        Self { table, genes }
    }

    /// The table this action inserts into.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Top-level genes, one per selected column.
    pub fn top_genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Top-level genes, mutably.
    pub fn top_genes_mut(&mut self) -> &mut [Gene] {
        &mut self.genes
    }

    /// The gene bound to `column`, when the column was selected.
    pub fn gene_for_column(&self, column: &str) -> Option<&Gene> {
        self.genes.iter().find(|g| g.name() == column)
    }

    /// All genes in this action's trees, pre-order.
    pub fn flat_genes(&self) -> Vec<&Gene> {
        self.genes.iter().flat_map(|g| g.flat_view()).collect()
    }

    /// Short identifier used in trace logs.
    pub fn resolved_name(&self) -> String {
        let columns: Vec<&str> = self.genes.iter().map(|g| g.name()).collect();
        format!("Insert_{}_{}", self.table.name, columns.join("_"))
    }
}

impl ColumnValues for InsertAction {
    fn value_of(&self, column: &str) -> Option<String> {
        self.gene_for_column(column).map(|g| g.value_as_raw_string())
    }
}
