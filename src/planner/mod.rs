//! Reshape planning
//!
//! Checks a [`ReshapeRequest`] against a [`TableSnapshot`] and works out the
//! order the columns are recreated in. The result is a [`ReshapePlan`], the
//! only input the script emitter accepts.

use tracing::debug;

use crate::error::ReshapeError;
use crate::model::{ColumnSpec, TableSnapshot};
use crate::sql::{clip_identifier, qualified, quote_ident};

/// Correlation column added to the live table while its columns are rebuilt
const ROWID_COLUMN: &str = "pgreshape_rowid";

/// Suffix for the backup copy of the table
const BACKUP_SUFFIX: &str = "_pgreshape";

/// What the user asked for: add `new_column` right after `insert_after`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReshapeRequest {
    pub schema: String,
    pub table: String,
    pub insert_after: String,
    pub new_column: String,
    /// Free-form type (and optionally default) expression, written verbatim
    pub new_column_type: String,
}

/// One entry of the recreated column list
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnSlot<'a> {
    Existing(&'a ColumnSpec),
    NewColumn,
}

/// A validated request together with everything the emitter needs
#[derive(Debug, Clone)]
pub struct ReshapePlan<'a> {
    pub snapshot: &'a TableSnapshot,
    pub request: &'a ReshapeRequest,
    pub order: Vec<ColumnSlot<'a>>,
    /// Name of the backup table, created in the same schema
    pub backup_table: String,
    /// Name of the temporary row correlation column
    pub rowid_column: String,
}

/// Catalog position of the column called `name`
pub fn locate_column(snapshot: &TableSnapshot, name: &str) -> Option<i32> {
    snapshot.column(name).map(|c| c.position)
}

/// Check the request preconditions, in order: offset exists, offset is not
/// the last column, new column name is free, no other table holds a foreign
/// key to this one. Names match exactly.
pub fn validate(snapshot: &TableSnapshot, request: &ReshapeRequest) -> Result<(), ReshapeError> {
    let offset =
        locate_column(snapshot, &request.insert_after).ok_or_else(|| {
            ReshapeError::OffsetNotFound {
                schema: snapshot.schema.clone(),
                table: snapshot.name.clone(),
                column: request.insert_after.clone(),
            }
        })?;

    if snapshot.last_column().map(|c| c.position) == Some(offset) {
        return Err(ReshapeError::OffsetIsLastColumn {
            schema: snapshot.schema.clone(),
            table: snapshot.name.clone(),
            column: request.insert_after.clone(),
        });
    }

    if snapshot.column(&request.new_column).is_some() {
        return Err(ReshapeError::ColumnAlreadyExists {
            schema: snapshot.schema.clone(),
            table: snapshot.name.clone(),
            column: request.new_column.clone(),
        });
    }

    // Their referenced key is dropped in phase 2, which PostgreSQL refuses
    if !snapshot.referencing_keys.is_empty() {
        let references: Vec<String> = snapshot
            .referencing_keys
            .iter()
            .map(|key| {
                format!(
                    "{}.{}",
                    qualified(&key.schema, &key.table),
                    quote_ident(&key.name)
                )
            })
            .collect();
        return Err(ReshapeError::ReferencedByForeignKeys {
            schema: snapshot.schema.clone(),
            table: snapshot.name.clone(),
            references: references.join(", "),
        });
    }

    Ok(())
}

/// Columns up to and including the offset, the new column, then the rest.
///
/// Relative order inside each part is the snapshot order. Expects a request
/// that passed [`validate`]; an unknown offset puts the new column last.
pub fn compute_order<'a>(
    snapshot: &'a TableSnapshot,
    request: &ReshapeRequest,
) -> Vec<ColumnSlot<'a>> {
    let offset = locate_column(snapshot, &request.insert_after).unwrap_or(i32::MAX);

    let (before, after): (Vec<&ColumnSpec>, Vec<&ColumnSpec>) =
        snapshot.columns.iter().partition(|c| c.position <= offset);

    let mut order = Vec::with_capacity(snapshot.columns.len() + 1);
    order.extend(before.into_iter().map(ColumnSlot::Existing));
    order.push(ColumnSlot::NewColumn);
    order.extend(after.into_iter().map(ColumnSlot::Existing));
    order
}

/// Validate the request and build the plan
pub fn plan<'a>(
    snapshot: &'a TableSnapshot,
    request: &'a ReshapeRequest,
) -> Result<ReshapePlan<'a>, ReshapeError> {
    validate(snapshot, request)?;

    let order = compute_order(snapshot, request);
    let backup_table = clip_identifier(&format!("{}{}", snapshot.name, BACKUP_SUFFIX)).to_string();
    let rowid_column = unused_column_name(snapshot, request, ROWID_COLUMN);
    debug!(%backup_table, %rowid_column, slots = order.len(), "plan ready");

    Ok(ReshapePlan {
        snapshot,
        request,
        order,
        backup_table,
        rowid_column,
    })
}

/// `base`, or `base_N` for the first N that clashes with neither an existing
/// column nor the new one
fn unused_column_name(snapshot: &TableSnapshot, request: &ReshapeRequest, base: &str) -> String {
    let taken = |name: &str| snapshot.column(name).is_some() || request.new_column == name;
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}
