//! DDL translator: turns [`SchemaOperation`]s into PostgreSQL statements.
//!
//! Pure text construction, no database access. Identifiers go through
//! [`quote_ident`]; column types were vetted by the validator and are
//! emitted verbatim.

use crate::ops::SchemaOperation;

/// Trait for converting schema operations to SQL.
pub trait ToSql {
    /// Convert this node to a SQL statement string.
    fn to_sql(&self) -> String;
}

impl ToSql for SchemaOperation {
    fn to_sql(&self) -> String {
        match self {
            Self::CreateTable(decl) => {
                let mut sql = format!("CREATE TABLE {} (", quote_ident(&decl.table_name));
                for column in &decl.columns {
                    sql.push_str(&quote_ident(&column.name));
                    sql.push(' ');
                    sql.push_str(&column.type_name);
                    sql.push_str(", ");
                }
                sql.push_str(&format!(
                    "PRIMARY KEY ({}));",
                    quote_idents(&decl.primary_key)
                ));
                sql
            }
            Self::DropTable(name) => format!("DROP TABLE {};", quote_ident(name)),
            Self::RenameTable { from, to } => format!(
                "ALTER TABLE {} RENAME TO {};",
                quote_ident(from),
                quote_ident(to)
            ),
            // Assumes the constraint carries PostgreSQL's default <table>_pkey
            // name. Tables created under another naming scheme need a catalog
            // lookup, which belongs to the connection collaborator.
            Self::ReplacePrimaryKey { table, keys } => format!(
                "ALTER TABLE {} DROP CONSTRAINT {}, ADD PRIMARY KEY ({});",
                quote_ident(table),
                quote_ident(&format!("{table}_pkey")),
                quote_idents(keys)
            ),
            // IF NOT EXISTS keeps a retried update from failing on the
            // additions a previous partial run already committed.
            Self::AddColumn {
                table,
                column,
                type_name,
            } => format!(
                "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {} {};",
                quote_ident(table),
                quote_ident(column),
                type_name
            ),
        }
    }
}

/// Quote an identifier for PostgreSQL.
///
/// Identifiers that are already safe lower-case names pass through bare;
/// anything else is double-quoted with embedded quotes doubled. Mirrors the
/// server's own `quote_ident`.
pub fn quote_ident(ident: &str) -> String {
    let safe = !ident.is_empty()
        && ident
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && ident
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if safe {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

fn quote_idents(idents: &[String]) -> String {
    idents
        .iter()
        .map(|i| quote_ident(i))
        .collect::<Vec<_>>()
        .join(", ")
}
