//! Desired-state declarations and the spec validator.
//!
//! A [`TableSpec`] is the raw wire payload attached to the custom resource:
//! `tableName`, `columns` as a list of single-key `{name: type}` mappings,
//! and `primaryKey` as a whitespace-delimited string of column names.
//! [`validate`] normalizes it into an immutable [`TableDeclaration`] or fails
//! with a Permanent error. Nothing here touches the database.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, ReconcileResult};

/// Raw desired-state declaration, as supplied by the event dispatcher.
///
/// Fields are optional so that an absent field surfaces as a validation
/// error rather than a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSpec {
    pub table_name: Option<String>,
    /// Each entry is a single-key mapping of column name to column type.
    pub columns: Option<Vec<BTreeMap<String, String>>>,
    /// Whitespace-delimited column names.
    pub primary_key: Option<String>,
}

/// A single validated column: name plus verbatim SQL type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub type_name: String,
}

/// A fully validated, immutable table declaration.
///
/// Invariants held by construction: column names are unique, the primary
/// key is a non-empty ordered set, and every key names a declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDeclaration {
    pub table_name: String,
    pub columns: Vec<ColumnDef>,
    pub primary_key: Vec<String>,
}

impl TableDeclaration {
    /// Look up a declared column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Validate a raw spec into a [`TableDeclaration`].
///
/// Total over its input: returns either a fully populated declaration or a
/// Permanent [`ReconcileError`], never a partial value.
pub fn validate(spec: &TableSpec) -> ReconcileResult<TableDeclaration> {
    let table_name = validate_name(spec)?;

    let raw_columns = spec
        .columns
        .as_ref()
        .filter(|cols| !cols.is_empty())
        .ok_or(ReconcileError::MissingField("columns"))?;

    let mut columns: Vec<ColumnDef> = Vec::with_capacity(raw_columns.len());
    for entry in raw_columns {
        let mut pairs = entry.iter();
        let (name, type_name) = match (pairs.next(), pairs.next()) {
            (Some(pair), None) => pair,
            (None, _) => return Err(ReconcileError::invalid_column("empty column mapping")),
            (Some(_), Some(_)) => {
                return Err(ReconcileError::invalid_column(
                    "column mapping must contain exactly one name/type pair",
                ));
            }
        };
        if name.trim().is_empty() {
            return Err(ReconcileError::invalid_column("column name is empty"));
        }
        if type_name.trim().is_empty() {
            return Err(ReconcileError::invalid_column(format!(
                "column '{name}' has an empty type"
            )));
        }
        if !is_safe_type(type_name) {
            return Err(ReconcileError::UnsafeType {
                column: name.clone(),
                type_name: type_name.clone(),
            });
        }
        if columns.iter().any(|c| c.name == *name) {
            return Err(ReconcileError::invalid_column(format!(
                "duplicate column '{name}'"
            )));
        }
        columns.push(ColumnDef {
            name: name.clone(),
            type_name: type_name.clone(),
        });
    }

    let raw_keys = spec
        .primary_key
        .as_deref()
        .ok_or(ReconcileError::MissingField("primaryKey"))?;

    // Ordered set: first occurrence wins.
    let mut primary_key: Vec<String> = Vec::new();
    for key in raw_keys.split_whitespace() {
        if !columns.iter().any(|c| c.name == key) {
            return Err(ReconcileError::UnknownKeyColumn(key.to_string()));
        }
        if !primary_key.iter().any(|k| k == key) {
            primary_key.push(key.to_string());
        }
    }
    if primary_key.is_empty() {
        return Err(ReconcileError::MissingField("primaryKey"));
    }

    Ok(TableDeclaration {
        table_name,
        columns,
        primary_key,
    })
}

/// Validate only the table name. The delete path needs nothing else.
pub fn validate_name(spec: &TableSpec) -> ReconcileResult<String> {
    spec.table_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or(ReconcileError::MissingField("tableName"))
}

/// Column types are emitted into DDL verbatim, so they are restricted to
/// the characters SQL type expressions actually use.
fn is_safe_type(type_name: &str) -> bool {
    type_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '(' | ')' | ','))
}
