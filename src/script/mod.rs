//! Reshape script generation
//!
//! Turns a [`ReshapePlan`] into the SQL text that performs the reshape. The
//! script runs inside one transaction and is organised in ten phases:
//!
//! 1. disable triggers
//! 2. drop dependent objects and detach owned sequences
//! 3. back up the table with a row correlation column
//! 4. drop every column
//! 5. add the columns back in the new order
//! 6. copy the data back
//! 7. restore column properties and sequence ownership
//! 8. recreate dependent objects
//! 9. enable triggers, then put back triggers that were not plainly enabled
//! 10. leave the transaction open for review
//!
//! Rendering is pure: the catalog is not consulted and nothing is written
//! to disk here.

mod column_writer;
mod header;
mod object_writer;
mod view_writer;
mod writer;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::model::TriggerState;
use crate::planner::ReshapePlan;
use crate::sql::{qualified, quote_ident};

use column_writer::{
    write_backup, write_column_adds, write_column_drops, write_column_properties, write_restore,
};
use header::write_header;
use object_writer::{
    write_constraint_creates, write_constraint_drops, write_index_creates, write_index_drops,
};
use view_writer::{write_view_creates, write_view_drops};

pub use writer::ScriptWriter;

/// Render the full script, stamped with the current time
pub fn render_script(plan: &ReshapePlan<'_>) -> anyhow::Result<String> {
    render_script_at(plan, Utc::now())
}

/// Render the full script with an explicit generation timestamp
pub fn render_script_at(
    plan: &ReshapePlan<'_>,
    generated_at: DateTime<Utc>,
) -> anyhow::Result<String> {
    let snapshot = plan.snapshot;
    let table = snapshot.qualified_name();
    let mut out = ScriptWriter::new();

    write_header(&mut out, plan, generated_at);
    out.blank();
    out.statement("BEGIN");

    out.phase(1, "disable triggers");
    out.statement(format!("ALTER TABLE {} DISABLE TRIGGER ALL", table));

    out.phase(2, "drop dependent objects");
    write_constraint_drops(&mut out, snapshot, &snapshot.unique_constraints);
    write_index_drops(&mut out, snapshot);
    write_constraint_drops(&mut out, snapshot, &snapshot.foreign_keys);
    write_constraint_drops(&mut out, snapshot, &snapshot.exclusion_constraints);
    write_constraint_drops(&mut out, snapshot, &snapshot.check_constraints);
    write_view_drops(&mut out, &snapshot.views);
    for sequence in &snapshot.sequences {
        out.statement(format!(
            "ALTER SEQUENCE {} OWNED BY NONE",
            qualified(&sequence.schema, &sequence.name)
        ));
    }

    out.phase(3, "back up table");
    write_backup(&mut out, plan);

    out.phase(4, "drop columns");
    write_column_drops(&mut out, plan);

    out.phase(5, "recreate columns");
    write_column_adds(&mut out, plan);

    out.phase(6, "restore data");
    write_restore(&mut out, plan);

    out.phase(7, "restore column properties");
    write_column_properties(&mut out, plan)?;

    out.phase(8, "recreate dependent objects");
    write_constraint_creates(&mut out, snapshot, &snapshot.foreign_keys);
    write_constraint_creates(&mut out, snapshot, &snapshot.exclusion_constraints);
    write_constraint_creates(&mut out, snapshot, &snapshot.check_constraints);
    write_index_creates(&mut out, snapshot);
    write_constraint_creates(&mut out, snapshot, &snapshot.unique_constraints);
    write_view_creates(&mut out, &snapshot.views)?;

    out.phase(9, "enable triggers");
    out.statement(format!("ALTER TABLE {} ENABLE TRIGGER ALL", table));
    for trigger in &snapshot.triggers {
        if trigger.state != TriggerState::Origin {
            out.statement(format!(
                "ALTER TABLE {} {} {}",
                table,
                trigger.state.action(),
                quote_ident(&trigger.name)
            ));
        }
    }

    out.phase(10, "finish");
    out.comment("COMMIT;");
    out.comment("ROLLBACK;");
    out.comment("");
    out.comment("Once the result is verified and committed, the backup can go:");
    out.comment(format!(
        "DROP TABLE {};",
        qualified(&snapshot.schema, &plan.backup_table)
    ));

    let script = out.finish();
    debug!(bytes = script.len(), "script rendered");
    Ok(script)
}
