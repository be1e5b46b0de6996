//! Script header comment block

use chrono::{DateTime, Utc};

use crate::model::OwnedSequence;
use crate::planner::{ColumnSlot, ReshapePlan};
use crate::sql::{qualified, quote_ident};

use super::writer::ScriptWriter;

/// Write the leading comment block: tool, target table, the requested change
/// and a summary of owned sequences so their settings are on record.
pub(crate) fn write_header(
    out: &mut ScriptWriter,
    plan: &ReshapePlan<'_>,
    generated_at: DateTime<Utc>,
) {
    let snapshot = plan.snapshot;
    let request = plan.request;

    out.comment("");
    out.comment(format!(
        "{} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ));
    out.comment("");
    out.comment(format!("Table:      {}", snapshot.qualified_name()));
    out.comment(format!(
        "New column: {} {}",
        quote_ident(&request.new_column),
        request.new_column_type
    ));
    out.comment(format!("After:      {}", quote_ident(&request.insert_after)));
    out.comment(format!(
        "Backup:     {}",
        qualified(&snapshot.schema, &plan.backup_table)
    ));
    out.comment(format!(
        "Generated:  {}",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.comment("");

    let order: Vec<String> = plan
        .order
        .iter()
        .map(|slot| match slot {
            ColumnSlot::Existing(column) => quote_ident(&column.name).into_owned(),
            ColumnSlot::NewColumn => quote_ident(&request.new_column).into_owned(),
        })
        .collect();
    out.comment(format!("Column order: {}", order.join(", ")));

    if !snapshot.sequences.is_empty() {
        out.comment("");
        out.comment("Owned sequences (detached in phase 2, re-attached in phase 7):");
        for sequence in &snapshot.sequences {
            out.comment(format!("  {}", describe_sequence(sequence)));
            if let Some(acl) = &sequence.acl {
                out.comment(format!("    acl: {}", acl));
            }
        }
    }

    out.comment("");
    out.comment("The transaction is left open. Review the result, then COMMIT or ROLLBACK.");
    out.comment("");
}

fn describe_sequence(sequence: &OwnedSequence) -> String {
    format!(
        "{} AS {} START {} INCREMENT {} MINVALUE {} MAXVALUE {} {} OWNED BY {}",
        qualified(&sequence.schema, &sequence.name),
        sequence.data_type,
        sequence.start,
        sequence.increment,
        sequence.min,
        sequence.max,
        if sequence.cycle { "CYCLE" } else { "NO CYCLE" },
        quote_ident(&sequence.owner_column)
    )
}
