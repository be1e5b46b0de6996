//! Unit tests for the table snapshot builder
//!
//! These tests run the builder against fixture catalogs and check the
//! snapshot it produces.

use pgreshape::catalog::{ReferencingKeyRow, SecurityLabelRow};
use pgreshape::model::{build_snapshot, ConstraintKind, StorageMode, TriggerState, ViewKind};
use pgreshape::ReshapeError;
use pretty_assertions::assert_eq;

use crate::common::{trigger, with_materialized_view, FixtureCatalog, ORDERS_OID};

// ============================================================================
// Lookup failures
// ============================================================================

#[test]
fn test_missing_schema() {
    let catalog = FixtureCatalog::orders();
    let err = build_snapshot(&catalog, "sales", "orders").unwrap_err();
    assert!(matches!(err, ReshapeError::SchemaNotFound { ref schema } if schema == "sales"));
    assert_eq!(*catalog.calls.borrow(), vec!["schema"]);
}

#[test]
fn test_missing_table_stops_before_any_fetch() {
    let catalog = FixtureCatalog::orders();
    let err = build_snapshot(&catalog, "public", "invoices").unwrap_err();
    assert!(matches!(err, ReshapeError::TableNotFound { .. }));
    assert_eq!(*catalog.calls.borrow(), vec!["schema", "table"]);
}

#[test]
fn test_table_names_match_exactly() {
    let catalog = FixtureCatalog::orders();
    assert!(build_snapshot(&catalog, "public", "Orders").is_err());
}

// ============================================================================
// Snapshot contents
// ============================================================================

#[test]
fn test_fetch_order() {
    let catalog = FixtureCatalog::orders();
    build_snapshot(&catalog, "public", "orders").unwrap();
    assert_eq!(
        *catalog.calls.borrow(),
        vec![
            "schema",
            "table",
            "attributes",
            "indexes",
            "unique",
            "foreign_keys",
            "referencing_keys",
            "exclusions",
            "checks",
            "views",
            "sequences",
            "triggers",
            // table, columns, views, sequences
            "labels",
            "labels",
            "labels",
            "labels",
        ]
    );
}

#[test]
fn test_columns_in_ordinal_order() {
    let catalog = FixtureCatalog::orders();
    let snapshot = build_snapshot(&catalog, "public", "orders").unwrap();

    let names: Vec<&str> = snapshot.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["id", "customer_id", "qty", "price", "total", "Status"]
    );

    let id = snapshot.column("id").unwrap();
    assert!(!id.nullable);
    assert_eq!(
        id.default_expr.as_deref(),
        Some("nextval('orders_id_seq'::regclass)")
    );

    let total = snapshot.column("total").unwrap();
    assert!(total.generated);
    assert!(!total.is_restorable());

    let status = snapshot.column("Status").unwrap();
    assert_eq!(status.storage, StorageMode::Main);
    assert!(!status.storage_is_default);
}

#[test]
fn test_object_classes() {
    let catalog = FixtureCatalog::orders();
    let snapshot = build_snapshot(&catalog, "public", "orders").unwrap();

    assert_eq!(snapshot.indexes.len(), 1);
    assert_eq!(snapshot.unique_constraints[0].kind, ConstraintKind::PrimaryKey);
    assert_eq!(snapshot.foreign_keys[0].kind, ConstraintKind::ForeignKey);
    assert_eq!(snapshot.check_constraints[0].kind, ConstraintKind::Check);
    assert!(snapshot.exclusion_constraints.is_empty());

    let view = &snapshot.views[0];
    assert_eq!(view.kind, ViewKind::View);
    assert_eq!(view.definition, "SELECT orders.id,\n    orders.total\n   FROM orders");

    assert_eq!(snapshot.sequences[0].owner_column, "id");
    assert_eq!(snapshot.security_labels[0].label, "classified");
}

#[test]
fn test_materialized_view_indexes_captured() {
    let catalog = with_materialized_view(FixtureCatalog::orders());
    let snapshot = build_snapshot(&catalog, "public", "orders").unwrap();

    assert!(snapshot.views[0].indexes.is_empty());
    let totals = &snapshot.views[1];
    assert_eq!(totals.kind, ViewKind::MaterializedView);
    assert_eq!(totals.indexes.len(), 1);
    assert_eq!(totals.indexes[0].name, "customer_totals_customer_idx");
    // The table's own index list is untouched
    assert_eq!(snapshot.indexes.len(), 1);
}

#[test]
fn test_trigger_states() {
    let mut catalog = FixtureCatalog::orders();
    catalog.triggers = vec![
        trigger("audit", "O"),
        trigger("legacy_sync", "D"),
        trigger("replicate", "R"),
        trigger("stamp", "A"),
        trigger("odd", "?"),
    ];
    let snapshot = build_snapshot(&catalog, "public", "orders").unwrap();
    let states: Vec<TriggerState> = snapshot.triggers.iter().map(|t| t.state).collect();
    assert_eq!(
        states,
        vec![
            TriggerState::Origin,
            TriggerState::Disabled,
            TriggerState::Replica,
            TriggerState::Always,
            TriggerState::Origin,
        ]
    );
}

#[test]
fn test_referencing_keys_captured() {
    let mut catalog = FixtureCatalog::orders();
    catalog.referencing_keys.push(ReferencingKeyRow {
        schema: "public".to_string(),
        table: "order_lines".to_string(),
        name: "order_lines_order_fk".to_string(),
    });
    let snapshot = build_snapshot(&catalog, "public", "orders").unwrap();
    assert_eq!(snapshot.referencing_keys.len(), 1);
    assert_eq!(snapshot.referencing_keys[0].table, "order_lines");
    // The table's own foreign keys stay separate
    assert_eq!(snapshot.foreign_keys.len(), 1);
}

#[test]
fn test_column_labels_follow_attribute_number() {
    let mut catalog = FixtureCatalog::with_columns("public", "t", &["a", "b", "c"]);
    // Column b was renumbered by an earlier drop
    catalog.attributes[1].number = 5;
    catalog.attributes[2].number = 6;
    catalog.labels.push(SecurityLabelRow {
        object: ORDERS_OID,
        sub_id: 5,
        provider: "dummy".to_string(),
        label: "secret".to_string(),
    });

    let snapshot = build_snapshot(&catalog, "public", "t").unwrap();
    assert!(snapshot.column("a").unwrap().security_labels.is_empty());
    assert_eq!(snapshot.column("b").unwrap().security_labels[0].label, "secret");
}

#[test]
fn test_no_view_or_sequence_label_queries_when_empty() {
    let catalog = FixtureCatalog::with_columns("public", "t", &["a", "b"]);
    build_snapshot(&catalog, "public", "t").unwrap();
    let labels = catalog
        .calls
        .borrow()
        .iter()
        .filter(|c| **c == "labels")
        .count();
    assert_eq!(labels, 2);
}
