//! Unit tests for the reshape planner

use pgreshape::model::{ColumnSpec, ReferencingKey, TableSnapshot};
use pgreshape::planner::{compute_order, plan, validate, ColumnSlot};
use pgreshape::ReshapeError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::request;

fn snapshot(columns: &[&str]) -> TableSnapshot {
    let mut snapshot = TableSnapshot::new(1, "public", "orders");
    snapshot.columns = columns
        .iter()
        .enumerate()
        .map(|(i, name)| ColumnSpec::new(i as i32 + 1, *name, "integer"))
        .collect();
    snapshot
}

fn slot_names<'a>(order: &[ColumnSlot<'a>]) -> Vec<&'a str> {
    order
        .iter()
        .map(|slot| match slot {
            ColumnSlot::Existing(column) => column.name.as_str(),
            ColumnSlot::NewColumn => "<new>",
        })
        .collect()
}

#[test]
fn test_insert_after_first_column() {
    let snap = snapshot(&["id", "name", "email"]);
    let req = request("public", "orders", "id", "nickname", "text");
    let plan = plan(&snap, &req).unwrap();
    assert_eq!(slot_names(&plan.order), vec!["id", "<new>", "name", "email"]);
    assert_eq!(plan.backup_table, "orders_pgreshape");
    assert_eq!(plan.rowid_column, "pgreshape_rowid");
}

#[test]
fn test_offset_is_last_column() {
    let snap = snapshot(&["id", "name", "email"]);
    let req = request("public", "orders", "email", "nickname", "text");
    assert!(matches!(
        validate(&snap, &req),
        Err(ReshapeError::OffsetIsLastColumn { .. })
    ));
}

#[test]
fn test_offset_not_found() {
    let snap = snapshot(&["id", "name"]);
    let req = request("public", "orders", "ID", "nickname", "text");
    let err = plan(&snap, &req).unwrap_err();
    assert!(matches!(err, ReshapeError::OffsetNotFound { ref column, .. } if column == "ID"));
    assert!(err.is_precondition());
}

#[test]
fn test_column_already_exists() {
    let snap = snapshot(&["id", "name", "email"]);
    let req = request("public", "orders", "id", "email", "text");
    assert!(matches!(
        plan(&snap, &req),
        Err(ReshapeError::ColumnAlreadyExists { .. })
    ));
}

#[test]
fn test_offset_checked_before_name_clash() {
    // Both preconditions fail; the offset problem is reported
    let snap = snapshot(&["id", "name"]);
    let req = request("public", "orders", "name", "id", "text");
    assert!(matches!(
        validate(&snap, &req),
        Err(ReshapeError::OffsetIsLastColumn { .. })
    ));
}

#[test]
fn test_referenced_table_is_rejected() {
    let mut snap = snapshot(&["id", "name"]);
    snap.referencing_keys.push(ReferencingKey {
        schema: "Sales".to_string(),
        table: "order_lines".to_string(),
        name: "order_lines_order_fk".to_string(),
    });
    let req = request("public", "orders", "id", "nickname", "text");
    let err = plan(&snap, &req).unwrap_err();
    assert!(err.is_precondition());
    match err {
        ReshapeError::ReferencedByForeignKeys { references, .. } => {
            assert_eq!(references, "\"Sales\".order_lines.order_lines_order_fk");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_request_checked_before_foreign_key_references() {
    let mut snap = snapshot(&["id", "name"]);
    snap.referencing_keys.push(ReferencingKey {
        schema: "public".to_string(),
        table: "order_lines".to_string(),
        name: "order_lines_order_fk".to_string(),
    });
    let req = request("public", "orders", "id", "name", "text");
    assert!(matches!(
        validate(&snap, &req),
        Err(ReshapeError::ColumnAlreadyExists { .. })
    ));
}

#[test]
fn test_compute_order_with_unknown_offset_appends() {
    let snap = snapshot(&["a", "b"]);
    let req = request("public", "orders", "zzz", "n", "text");
    assert_eq!(slot_names(&compute_order(&snap, &req)), vec!["a", "b", "<new>"]);
}

proptest! {
    /// Dropping the marker gives back the original order, and the marker
    /// sits right after the offset column.
    #[test]
    fn prop_order_keeps_existing_columns(
        count in 2usize..24,
        offset_seed in any::<usize>(),
    ) {
        let names: Vec<String> = (0..count).map(|i| format!("c{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let snap = snapshot(&refs);
        let offset = offset_seed % (count - 1);
        let req = request("public", "orders", &names[offset], "inserted", "text");

        let plan = plan(&snap, &req).unwrap();
        let order = slot_names(&plan.order);

        prop_assert_eq!(order.iter().filter(|n| **n == "<new>").count(), 1);
        let marker = order.iter().position(|n| *n == "<new>").unwrap();
        prop_assert_eq!(marker, offset + 1);
        prop_assert_eq!(order[marker - 1], names[offset].as_str());

        let existing: Vec<&str> = order.into_iter().filter(|n| *n != "<new>").collect();
        prop_assert_eq!(existing, refs);
    }
}
