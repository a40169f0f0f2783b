//! Abstract schema-change operations.
//!
//! Produced by the diff engine (or directly by the create/delete handlers),
//! consumed by the DDL translator. Ephemeral within a single reconciliation
//! call. Note there is no column-removal variant: removals are rejected at
//! diff time and never reach the translator.

use crate::spec::TableDeclaration;

/// One schema-change operation against the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaOperation {
    /// Create the table described by the declaration.
    CreateTable(TableDeclaration),
    /// Drop the named table.
    DropTable(String),
    /// Rename a table. Always ordered before any other change to the same
    /// table so later operations see the new name.
    RenameTable { from: String, to: String },
    /// Drop the existing primary-key constraint and install a new one.
    ReplacePrimaryKey { table: String, keys: Vec<String> },
    /// Add a single column.
    AddColumn {
        table: String,
        column: String,
        type_name: String,
    },
}

impl SchemaOperation {
    /// Short human-readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::CreateTable(decl) => format!("create table {}", decl.table_name),
            Self::DropTable(name) => format!("drop table {name}"),
            Self::RenameTable { from, to } => format!("rename table {from} -> {to}"),
            Self::ReplacePrimaryKey { table, keys } => {
                format!("replace primary key on {table} ({})", keys.join(", "))
            }
            Self::AddColumn { table, column, .. } => {
                format!("add column {column} to {table}")
            }
        }
    }
}
