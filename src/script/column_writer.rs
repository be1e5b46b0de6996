//! Column rebuild statements (phases 3 to 7)
//!
//! The live table is stripped of every column and the columns are added
//! back in plan order. Values travel through the backup table, matched on a
//! temporary identity column. Column properties that would slow the copy or
//! reject intermediate states (NOT NULL, identity, grants, storage settings)
//! are applied only after the data is back.

use crate::acl::{parse_acl_list, write_grants, GrantObject, GrantTarget};
use crate::model::{ColumnSpec, SecurityLabel};
use crate::planner::{ColumnSlot, ReshapePlan};
use crate::sql::{qualified, quote_ident, quote_literal};

use super::writer::ScriptWriter;

/// Phase 3: add the correlation column and copy the table
pub(crate) fn write_backup(out: &mut ScriptWriter, plan: &ReshapePlan<'_>) {
    let table = plan.snapshot.qualified_name();
    out.statement(format!(
        "ALTER TABLE {} ADD COLUMN {} bigint GENERATED ALWAYS AS IDENTITY",
        table,
        quote_ident(&plan.rowid_column)
    ));
    out.statement(format!(
        "CREATE TABLE {} AS TABLE {}",
        qualified(&plan.snapshot.schema, &plan.backup_table),
        table
    ));
}

/// Phase 4: drop every column of the snapshot.
///
/// Generated columns go first; dropping one of their base columns would
/// otherwise take them along silently.
pub(crate) fn write_column_drops(out: &mut ScriptWriter, plan: &ReshapePlan<'_>) {
    let table = plan.snapshot.qualified_name();
    let (generated, plain): (Vec<&ColumnSpec>, Vec<&ColumnSpec>) =
        plan.snapshot.columns.iter().partition(|c| c.generated);
    for column in generated.into_iter().chain(plain) {
        out.statement(format!(
            "ALTER TABLE {} DROP COLUMN {}",
            table,
            quote_ident(&column.name)
        ));
    }
}

/// Phase 5: add the columns back in plan order, the new one included
pub(crate) fn write_column_adds(out: &mut ScriptWriter, plan: &ReshapePlan<'_>) {
    let table = plan.snapshot.qualified_name();
    for slot in &plan.order {
        match slot {
            ColumnSlot::Existing(column) => {
                out.statement(format!(
                    "ALTER TABLE {} ADD COLUMN {}",
                    table,
                    column_definition(column)
                ));
                if let (Some(default), false) = (&column.default_expr, column.generated) {
                    out.statement(format!(
                        "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {}",
                        table,
                        quote_ident(&column.name),
                        default
                    ));
                }
            }
            ColumnSlot::NewColumn => {
                out.statement(format!(
                    "ALTER TABLE {} ADD COLUMN {} {}",
                    table,
                    quote_ident(&plan.request.new_column),
                    plan.request.new_column_type.trim()
                ));
            }
        }
    }
}

/// Name, type, collation and generation clause for `ADD COLUMN`
fn column_definition(column: &ColumnSpec) -> String {
    let mut definition = format!("{} {}", quote_ident(&column.name), column.type_expr);
    if let Some(collation) = &column.collation {
        definition.push_str(" COLLATE ");
        definition.push_str(collation);
    }
    if column.generated {
        if let Some(expr) = &column.default_expr {
            definition.push_str(&format!(" GENERATED ALWAYS AS ({}) STORED", expr));
        }
    }
    definition
}

/// Phase 6: copy values back from the backup, then drop the correlation column
pub(crate) fn write_restore(out: &mut ScriptWriter, plan: &ReshapePlan<'_>) {
    let table = plan.snapshot.qualified_name();
    let rowid = quote_ident(&plan.rowid_column);

    let assignments: Vec<String> = plan
        .snapshot
        .columns
        .iter()
        .filter(|c| c.is_restorable())
        .map(|c| {
            let name = quote_ident(&c.name);
            format!("{} = b.{}", name, name)
        })
        .collect();

    if !assignments.is_empty() {
        out.statement(format!(
            "UPDATE {} AS t\n   SET {}\n  FROM {} AS b\n WHERE t.{} = b.{}",
            table,
            assignments.join(",\n       "),
            qualified(&plan.snapshot.schema, &plan.backup_table),
            rowid,
            rowid
        ));
    }
    out.statement(format!("ALTER TABLE {} DROP COLUMN {}", table, rowid));
}

/// Phase 7: per-column properties, table labels and sequence ownership
pub(crate) fn write_column_properties(
    out: &mut ScriptWriter,
    plan: &ReshapePlan<'_>,
) -> anyhow::Result<()> {
    let snapshot = plan.snapshot;
    let table = snapshot.qualified_name();

    for column in plan.order.iter().filter_map(|slot| match slot {
        ColumnSlot::Existing(column) => Some(*column),
        ColumnSlot::NewColumn => None,
    }) {
        let name = quote_ident(&column.name);
        let alter = format!("ALTER TABLE {} ALTER COLUMN {}", table, name);

        if !column.nullable {
            out.statement(format!("{} SET NOT NULL", alter));
        }

        if let Some(identity) = column.identity {
            out.statement(format!(
                "{} ADD GENERATED {} AS IDENTITY",
                alter,
                identity.keyword()
            ));
            // Continue numbering after the restored values
            out.statement(format!(
                "SELECT setval(pg_get_serial_sequence({}, {}), max({})) FROM {} HAVING max({}) IS NOT NULL",
                quote_literal(&table),
                quote_literal(&column.name),
                name,
                table,
                name
            ));
        }

        if let Some(acl) = &column.acl {
            let columns = [column.name.as_str()];
            write_grants(
                out,
                &GrantTarget {
                    object: GrantObject::Table,
                    schema: &snapshot.schema,
                    name: &snapshot.name,
                    columns: Some(&columns),
                },
                &parse_acl_list(acl),
            )?;
        }

        if !column.storage_is_default {
            out.statement(format!("{} SET STORAGE {}", alter, column.storage.keyword()));
        }
        if let Some(target) = column.stats_target {
            out.statement(format!("{} SET STATISTICS {}", alter, target));
        }
        if let Some(options) = &column.options {
            out.statement(format!("{} SET ({})", alter, options));
        }
        if let Some(comment) = &column.comment {
            out.statement(format!(
                "COMMENT ON COLUMN {}.{} IS {}",
                table,
                name,
                quote_literal(comment)
            ));
        }
        write_labels(
            out,
            &format!("COLUMN {}.{}", table, name),
            &column.security_labels,
        );
    }

    write_labels(out, &format!("TABLE {}", table), &snapshot.security_labels);

    for sequence in &snapshot.sequences {
        out.statement(format!(
            "ALTER SEQUENCE {} OWNED BY {}.{}",
            qualified(&sequence.schema, &sequence.name),
            table,
            quote_ident(&sequence.owner_column)
        ));
    }
    Ok(())
}

/// `SECURITY LABEL` statements for one object, e.g. `object` = `TABLE s.t`
pub(crate) fn write_labels(out: &mut ScriptWriter, object: &str, labels: &[SecurityLabel]) {
    for label in labels {
        out.statement(format!(
            "SECURITY LABEL FOR {} ON {} IS {}",
            quote_ident(&label.provider),
            object,
            quote_literal(&label.label)
        ));
    }
}
