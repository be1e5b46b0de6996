//! Index and constraint statements (phases 2 and 8)

use crate::model::{ConstraintSpec, IndexSpec, TableSnapshot};
use crate::sql::{qualified, quote_ident, quote_literal};

use super::writer::ScriptWriter;

pub(crate) fn write_constraint_drops(
    out: &mut ScriptWriter,
    snapshot: &TableSnapshot,
    constraints: &[ConstraintSpec],
) {
    let table = snapshot.qualified_name();
    for constraint in constraints {
        out.statement(format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            table,
            quote_ident(&constraint.name)
        ));
    }
}

pub(crate) fn write_index_drops(out: &mut ScriptWriter, snapshot: &TableSnapshot) {
    for index in &snapshot.indexes {
        out.statement(format!(
            "DROP INDEX {}",
            qualified(&snapshot.schema, &index.name)
        ));
    }
}

/// `ADD CONSTRAINT` with the catalog definition, inside a
/// `default_tablespace` override when the backing index had one.
pub(crate) fn write_constraint_creates(
    out: &mut ScriptWriter,
    snapshot: &TableSnapshot,
    constraints: &[ConstraintSpec],
) {
    let table = snapshot.qualified_name();
    for constraint in constraints {
        let tablespace = constraint
            .tablespace
            .as_deref()
            .filter(|_| constraint.kind.has_index());
        with_tablespace(out, tablespace, |out| {
            out.statement(format!(
                "ALTER TABLE {} ADD CONSTRAINT {} {}",
                table,
                quote_ident(&constraint.name),
                constraint.definition
            ));
        });
        if let Some(comment) = &constraint.comment {
            out.statement(format!(
                "COMMENT ON CONSTRAINT {} ON {} IS {}",
                quote_ident(&constraint.name),
                table,
                quote_literal(comment)
            ));
        }
    }
}

pub(crate) fn write_index_creates(out: &mut ScriptWriter, snapshot: &TableSnapshot) {
    for index in &snapshot.indexes {
        write_index_create(out, &snapshot.schema, index);
    }
}

/// `CREATE INDEX` from the catalog definition; `schema` qualifies the comment
pub(crate) fn write_index_create(out: &mut ScriptWriter, schema: &str, index: &IndexSpec) {
    with_tablespace(out, index.tablespace.as_deref(), |out| {
        out.statement(index.definition.trim().trim_end_matches(';'));
    });
    if let Some(comment) = &index.comment {
        out.statement(format!(
            "COMMENT ON INDEX {} IS {}",
            qualified(schema, &index.name),
            quote_literal(comment)
        ));
    }
}

fn with_tablespace<F>(out: &mut ScriptWriter, tablespace: Option<&str>, write: F)
where
    F: FnOnce(&mut ScriptWriter),
{
    match tablespace {
        Some(tablespace) => {
            out.statement(format!(
                "SET default_tablespace = {}",
                quote_ident(tablespace)
            ));
            write(out);
            out.statement("SET default_tablespace = ''");
        }
        None => write(out),
    }
}
