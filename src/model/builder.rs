//! Build a table snapshot from catalog facts
//!
//! One catalog query per object class, issued in a fixed order. The table
//! must exist before anything else is fetched; a missing schema or table
//! stops the build with nothing returned.

use tracing::{debug, info, warn};

use crate::catalog::{
    AttributeRow, CatalogSource, ConstraintRow, IndexRow, LabelScope, Oid, SecurityLabelRow,
    SequenceRow, TriggerRow, ViewRow,
};
use crate::error::ReshapeError;

use super::{
    ColumnSpec, ConstraintKind, ConstraintSpec, DependentView, IdentityKind, IndexSpec,
    OwnedSequence, ReferencingKey, SecurityLabel, StorageMode, TableSnapshot, TriggerSpec,
    TriggerState, ViewKind,
};

/// Build the snapshot of `schema.table`
pub fn build_snapshot<C: CatalogSource + ?Sized>(
    catalog: &C,
    schema: &str,
    table: &str,
) -> Result<TableSnapshot, ReshapeError> {
    if !catalog.schema_exists(schema)? {
        return Err(ReshapeError::SchemaNotFound {
            schema: schema.to_string(),
        });
    }

    let found = catalog
        .find_table(schema, table)?
        .ok_or_else(|| ReshapeError::TableNotFound {
            schema: schema.to_string(),
            table: table.to_string(),
        })?;
    debug!(oid = found.oid, "table located");

    let mut snapshot = TableSnapshot::new(found.oid, found.schema, found.name);

    fetch_attributes(catalog, &mut snapshot)?;
    fetch_indexes(catalog, &mut snapshot)?;
    fetch_unique(catalog, &mut snapshot)?;
    fetch_foreign_keys(catalog, &mut snapshot)?;
    fetch_referencing_keys(catalog, &mut snapshot)?;
    fetch_exclusions(catalog, &mut snapshot)?;
    fetch_checks(catalog, &mut snapshot)?;
    fetch_dependent_views(catalog, &mut snapshot)?;
    fetch_owned_sequences(catalog, &mut snapshot)?;
    fetch_triggers(catalog, &mut snapshot)?;
    fetch_security_labels(catalog, &mut snapshot)?;

    info!(
        table = %snapshot.qualified_name(),
        columns = snapshot.columns.len(),
        indexes = snapshot.indexes.len(),
        constraints = snapshot.unique_constraints.len()
            + snapshot.foreign_keys.len()
            + snapshot.exclusion_constraints.len()
            + snapshot.check_constraints.len(),
        views = snapshot.views.len(),
        sequences = snapshot.sequences.len(),
        triggers = snapshot.triggers.len(),
        "snapshot built"
    );
    Ok(snapshot)
}

pub fn fetch_attributes<C: CatalogSource + ?Sized>(
    catalog: &C,
    snapshot: &mut TableSnapshot,
) -> Result<(), ReshapeError> {
    let rows = catalog.attributes(snapshot.oid)?;
    snapshot.columns.extend(rows.into_iter().map(column_from_row));
    Ok(())
}

pub fn fetch_indexes<C: CatalogSource + ?Sized>(
    catalog: &C,
    snapshot: &mut TableSnapshot,
) -> Result<(), ReshapeError> {
    let rows = catalog.indexes(snapshot.oid)?;
    snapshot.indexes.extend(rows.into_iter().map(index_from_row));
    Ok(())
}

pub fn fetch_unique<C: CatalogSource + ?Sized>(
    catalog: &C,
    snapshot: &mut TableSnapshot,
) -> Result<(), ReshapeError> {
    let rows = catalog.unique_constraints(snapshot.oid)?;
    for row in rows {
        let kind = match ConstraintKind::from_code(&row.kind) {
            Some(kind @ (ConstraintKind::PrimaryKey | ConstraintKind::Unique)) => kind,
            _ => ConstraintKind::Unique,
        };
        snapshot.unique_constraints.push(constraint_from_row(row, kind));
    }
    Ok(())
}

pub fn fetch_foreign_keys<C: CatalogSource + ?Sized>(
    catalog: &C,
    snapshot: &mut TableSnapshot,
) -> Result<(), ReshapeError> {
    let rows = catalog.foreign_keys(snapshot.oid)?;
    snapshot.foreign_keys.extend(
        rows.into_iter()
            .map(|row| constraint_from_row(row, ConstraintKind::ForeignKey)),
    );
    Ok(())
}

pub fn fetch_referencing_keys<C: CatalogSource + ?Sized>(
    catalog: &C,
    snapshot: &mut TableSnapshot,
) -> Result<(), ReshapeError> {
    let rows = catalog.referencing_keys(snapshot.oid)?;
    snapshot
        .referencing_keys
        .extend(rows.into_iter().map(|row| ReferencingKey {
            schema: row.schema,
            table: row.table,
            name: row.name,
        }));
    Ok(())
}

pub fn fetch_exclusions<C: CatalogSource + ?Sized>(
    catalog: &C,
    snapshot: &mut TableSnapshot,
) -> Result<(), ReshapeError> {
    let rows = catalog.exclusion_constraints(snapshot.oid)?;
    snapshot.exclusion_constraints.extend(
        rows.into_iter()
            .map(|row| constraint_from_row(row, ConstraintKind::Exclusion)),
    );
    Ok(())
}

pub fn fetch_checks<C: CatalogSource + ?Sized>(
    catalog: &C,
    snapshot: &mut TableSnapshot,
) -> Result<(), ReshapeError> {
    let rows = catalog.check_constraints(snapshot.oid)?;
    snapshot.check_constraints.extend(
        rows.into_iter()
            .map(|row| constraint_from_row(row, ConstraintKind::Check)),
    );
    Ok(())
}

pub fn fetch_dependent_views<C: CatalogSource + ?Sized>(
    catalog: &C,
    snapshot: &mut TableSnapshot,
) -> Result<(), ReshapeError> {
    for row in catalog.dependent_views(snapshot.oid)? {
        let Some(mut view) = view_from_row(row) else {
            warn!("ignoring dependent relation that is not a view");
            continue;
        };
        if view.kind == ViewKind::MaterializedView {
            view.indexes = catalog
                .indexes(view.oid)?
                .into_iter()
                .map(index_from_row)
                .collect();
            debug!(view = %view.name, indexes = view.indexes.len(), "materialized view indexes");
        }
        snapshot.views.push(view);
    }
    Ok(())
}

pub fn fetch_owned_sequences<C: CatalogSource + ?Sized>(
    catalog: &C,
    snapshot: &mut TableSnapshot,
) -> Result<(), ReshapeError> {
    let rows = catalog.owned_sequences(snapshot.oid)?;
    snapshot
        .sequences
        .extend(rows.into_iter().map(sequence_from_row));
    Ok(())
}

pub fn fetch_triggers<C: CatalogSource + ?Sized>(
    catalog: &C,
    snapshot: &mut TableSnapshot,
) -> Result<(), ReshapeError> {
    let rows = catalog.triggers(snapshot.oid)?;
    snapshot
        .triggers
        .extend(rows.into_iter().map(trigger_from_row));
    Ok(())
}

/// Labels for the table, its columns, dependent views and owned sequences.
/// View and sequence queries are skipped when there is nothing to label.
pub fn fetch_security_labels<C: CatalogSource + ?Sized>(
    catalog: &C,
    snapshot: &mut TableSnapshot,
) -> Result<(), ReshapeError> {
    snapshot.security_labels = catalog
        .security_labels(LabelScope::Table(snapshot.oid))?
        .into_iter()
        .map(label_from_row)
        .collect();

    if !snapshot.columns.is_empty() {
        for row in catalog.security_labels(LabelScope::Columns(snapshot.oid))? {
            match snapshot
                .columns
                .iter_mut()
                .find(|c| c.position == row.sub_id)
            {
                Some(column) => column.security_labels.push(label_from_row(row)),
                None => debug!(sub_id = row.sub_id, "label for unknown column"),
            }
        }
    }

    if !snapshot.views.is_empty() {
        let oids: Vec<Oid> = snapshot.views.iter().map(|v| v.oid).collect();
        for row in catalog.security_labels(LabelScope::Views(&oids))? {
            if let Some(view) = snapshot.views.iter_mut().find(|v| v.oid == row.object) {
                view.security_labels.push(label_from_row(row));
            }
        }
    }

    if !snapshot.sequences.is_empty() {
        let oids: Vec<Oid> = snapshot.sequences.iter().map(|s| s.oid).collect();
        for row in catalog.security_labels(LabelScope::Sequences(&oids))? {
            if let Some(sequence) = snapshot.sequences.iter_mut().find(|s| s.oid == row.object) {
                sequence.security_labels.push(label_from_row(row));
            }
        }
    }

    Ok(())
}

fn column_from_row(row: AttributeRow) -> ColumnSpec {
    let storage = StorageMode::from_code(&row.storage);
    if storage.is_none() {
        warn!(column = %row.name, code = %row.storage, "unknown storage mode, keeping type default");
    }
    ColumnSpec {
        position: row.number,
        name: row.name,
        nullable: !row.not_null,
        type_expr: row.type_name,
        default_expr: row.default_expr,
        collation: row.collation,
        storage: storage.unwrap_or(StorageMode::Extended),
        storage_is_default: row.storage_is_default || storage.is_none(),
        stats_target: row.stats_target,
        options: row.options.filter(|o| !o.is_empty()),
        comment: row.comment,
        acl: row.acl,
        identity: IdentityKind::from_code(&row.identity),
        generated: row.generated == "s",
        security_labels: Vec::new(),
    }
}

fn index_from_row(row: IndexRow) -> IndexSpec {
    IndexSpec {
        name: row.name,
        definition: row.definition,
        tablespace: row.tablespace,
        comment: row.comment,
    }
}

fn constraint_from_row(row: ConstraintRow, kind: ConstraintKind) -> ConstraintSpec {
    ConstraintSpec {
        name: row.name,
        kind,
        definition: row.definition,
        tablespace: row.tablespace,
        comment: row.comment,
    }
}

fn view_from_row(row: ViewRow) -> Option<DependentView> {
    let kind = ViewKind::from_code(&row.kind)?;
    Some(DependentView {
        oid: row.oid,
        schema: row.schema,
        name: row.name,
        kind,
        definition: strip_statement_terminator(&row.definition),
        owner: row.owner,
        acl: row.acl,
        comment: row.comment,
        options: row.options.filter(|o| !o.is_empty()),
        check_option: row.check_option,
        security_labels: Vec::new(),
        indexes: Vec::new(),
    })
}

fn sequence_from_row(row: SequenceRow) -> OwnedSequence {
    OwnedSequence {
        oid: row.oid,
        schema: row.schema,
        name: row.name,
        owner_column: row.owner_column,
        start: row.start,
        increment: row.increment,
        min: row.min,
        max: row.max,
        cycle: row.cycle,
        data_type: row.data_type,
        acl: row.acl,
        comment: row.comment,
        security_labels: Vec::new(),
    }
}

fn trigger_from_row(row: TriggerRow) -> TriggerSpec {
    let state = TriggerState::from_code(&row.enabled).unwrap_or_else(|| {
        warn!(trigger = %row.name, code = %row.enabled, "unknown trigger state, assuming enabled");
        TriggerState::Origin
    });
    TriggerSpec {
        name: row.name,
        state,
    }
}

fn label_from_row(row: SecurityLabelRow) -> SecurityLabel {
    SecurityLabel {
        provider: row.provider,
        label: row.label,
    }
}

/// `pg_get_viewdef()` ends its output with `;` and pads it with whitespace
fn strip_statement_terminator(definition: &str) -> String {
    definition
        .trim()
        .trim_end_matches(';')
        .trim_end()
        .to_string()
}
