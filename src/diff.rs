//! Diff engine: compares a previously-applied declaration against a new one
//! and emits the ordered operation sequence that converges the table.
//!
//! Order is load-bearing: rename first, then primary-key replacement, then
//! column additions. Later operations reference the table by its new name,
//! so reordering would target a stale name.

use std::collections::BTreeSet;

use crate::error::{ReconcileError, ReconcileResult};
use crate::ops::SchemaOperation;
use crate::spec::TableDeclaration;

/// Compute the operations needed to converge `old` into `new`.
///
/// The result is atomic-or-nothing: if any part of the change is
/// unsupported (a column removal, which includes the removal half of an
/// in-place type change), the whole diff fails and no operation from it
/// may be executed. Identical declarations yield an empty sequence.
pub fn diff(
    old: &TableDeclaration,
    new: &TableDeclaration,
) -> ReconcileResult<Vec<SchemaOperation>> {
    let mut ops = Vec::new();

    if old.table_name != new.table_name {
        ops.push(SchemaOperation::RenameTable {
            from: old.table_name.clone(),
            to: new.table_name.clone(),
        });
    }

    // Key comparison is by set, not position: reordering keys is not a change.
    let old_keys: BTreeSet<&str> = old.primary_key.iter().map(String::as_str).collect();
    let new_keys: BTreeSet<&str> = new.primary_key.iter().map(String::as_str).collect();
    if old_keys != new_keys {
        ops.push(SchemaOperation::ReplacePrimaryKey {
            table: new.table_name.clone(),
            keys: new.primary_key.clone(),
        });
    }

    // Columns match only on exact (name, type) pairs. A type change shows up
    // as one addition plus one removal and is rejected through the removal
    // path rather than reinterpreted as an in-place alter.
    for column in &new.columns {
        if old.column(&column.name).map(|c| &c.type_name) != Some(&column.type_name) {
            ops.push(SchemaOperation::AddColumn {
                table: new.table_name.clone(),
                column: column.name.clone(),
                type_name: column.type_name.clone(),
            });
        }
    }

    // Removals block the entire sequence, additions included.
    for column in &old.columns {
        if new.column(&column.name).map(|c| &c.type_name) != Some(&column.type_name) {
            return Err(ReconcileError::UnsupportedRemoval(column.name.clone()));
        }
    }

    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ColumnDef;

    fn decl(name: &str, columns: &[(&str, &str)], keys: &[&str]) -> TableDeclaration {
        TableDeclaration {
            table_name: name.to_string(),
            columns: columns
                .iter()
                .map(|(n, t)| ColumnDef {
                    name: n.to_string(),
                    type_name: t.to_string(),
                })
                .collect(),
            primary_key: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn test_identical_declarations_are_a_noop() {
        let d = decl("users", &[("id", "int"), ("name", "text")], &["id"]);
        assert!(diff(&d, &d).unwrap().is_empty());
    }

    #[test]
    fn test_single_column_addition() {
        let old = decl("users", &[("id", "int")], &["id"]);
        let new = decl("users", &[("id", "int"), ("email", "text")], &["id"]);
        let ops = diff(&old, &new).unwrap();
        assert_eq!(
            ops,
            vec![SchemaOperation::AddColumn {
                table: "users".into(),
                column: "email".into(),
                type_name: "text".into(),
            }]
        );
    }

    #[test]
    fn test_additions_preserve_declared_order() {
        let old = decl("users", &[("id", "int")], &["id"]);
        let new = decl(
            "users",
            &[("id", "int"), ("b", "text"), ("a", "text")],
            &["id"],
        );
        let ops = diff(&old, &new).unwrap();
        let added: Vec<&str> = ops
            .iter()
            .map(|op| match op {
                SchemaOperation::AddColumn { column, .. } => column.as_str(),
                other => panic!("unexpected op {other:?}"),
            })
            .collect();
        assert_eq!(added, vec!["b", "a"]);
    }

    #[test]
    fn test_rename_then_keys_then_additions() {
        let old = decl("users", &[("id", "int")], &["id"]);
        let new = decl(
            "accounts",
            &[("id", "int"), ("email", "text")],
            &["id", "email"],
        );
        let ops = diff(&old, &new).unwrap();
        assert_eq!(ops.len(), 3);
        assert!(matches!(&ops[0], SchemaOperation::RenameTable { from, to }
            if from == "users" && to == "accounts"));
        assert!(matches!(&ops[1], SchemaOperation::ReplacePrimaryKey { table, keys }
            if table == "accounts" && keys == &vec!["id".to_string(), "email".to_string()]));
        assert!(matches!(&ops[2], SchemaOperation::AddColumn { table, column, .. }
            if table == "accounts" && column == "email"));
    }

    #[test]
    fn test_key_reorder_is_not_a_change() {
        let old = decl("t", &[("a", "int"), ("b", "int")], &["a", "b"]);
        let new = decl("t", &[("a", "int"), ("b", "int")], &["b", "a"]);
        assert!(diff(&old, &new).unwrap().is_empty());
    }

    #[test]
    fn test_removal_is_rejected() {
        let old = decl("users", &[("id", "int"), ("email", "text")], &["id"]);
        let new = decl("users", &[("id", "int")], &["id"]);
        let err = diff(&old, &new).unwrap_err();
        assert!(matches!(err, ReconcileError::UnsupportedRemoval(c) if c == "email"));
    }

    #[test]
    fn test_removal_blocks_simultaneous_additions() {
        let old = decl("users", &[("id", "int"), ("email", "text")], &["id"]);
        let new = decl("users", &[("id", "int"), ("phone", "text")], &["id"]);
        assert!(matches!(
            diff(&old, &new),
            Err(ReconcileError::UnsupportedRemoval(c)) if c == "email"
        ));
    }

    #[test]
    fn test_type_change_is_rejected_as_removal() {
        let old = decl("users", &[("id", "int")], &["id"]);
        let new = decl("users", &[("id", "bigint")], &["id"]);
        let err = diff(&old, &new).unwrap_err();
        assert!(matches!(err, ReconcileError::UnsupportedRemoval(c) if c == "id"));
    }
}
