//! Unit tests for ACL parsing and grant replay

use pgreshape::acl::{parse_acl_entry, parse_acl_list, write_grants, GrantObject, GrantTarget};
use pretty_assertions::assert_eq;

fn orders_target() -> GrantTarget<'static> {
    GrantTarget {
        object: GrantObject::Table,
        schema: "public",
        name: "orders",
        columns: None,
    }
}

#[test]
fn test_two_entry_list() {
    let records = parse_acl_list("{alice=r/bob,carol=rw/bob}");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].grantee.as_deref(), Some("alice"));
    assert_eq!(records[0].privileges, "r");
    assert_eq!(records[1].grantee.as_deref(), Some("carol"));
    assert_eq!(records[1].privileges, "rw");

    let mut out = String::new();
    write_grants(&mut out, &orders_target(), &records).unwrap();
    assert_eq!(
        out,
        "GRANT SELECT ON TABLE public.orders TO alice;\n\
         GRANT SELECT, UPDATE ON TABLE public.orders TO carol;\n"
    );
}

#[test]
fn test_malformed_entry_is_skipped() {
    let records = parse_acl_list("{alice=r/bob,not-a-valid-entry,carol=w/bob}");
    let grantees: Vec<_> = records.iter().map(|r| r.grantee.as_deref()).collect();
    assert_eq!(grantees, vec![Some("alice"), Some("carol")]);

    let mut out = String::new();
    write_grants(&mut out, &orders_target(), &records).unwrap();
    assert_eq!(out.lines().count(), 2);
    assert!(!out.contains("not-a-valid-entry"));
}

#[test]
fn test_privileges_keep_token_order() {
    let records = parse_acl_list("{app=wra/app}");
    let mut out = String::new();
    write_grants(&mut out, &orders_target(), &records).unwrap();
    assert_eq!(
        out,
        "GRANT UPDATE, SELECT, INSERT ON TABLE public.orders TO app;\n"
    );
}

#[test]
fn test_full_table_privileges_are_not_collapsed() {
    let records = parse_acl_list("{owner=arwdDxtm/owner}");
    let mut out = String::new();
    write_grants(&mut out, &orders_target(), &records).unwrap();
    assert_eq!(
        out,
        "GRANT INSERT, SELECT, UPDATE, DELETE, TRUNCATE, REFERENCES, TRIGGER, MAINTAIN \
         ON TABLE public.orders TO owner;\n"
    );
}

#[test]
fn test_role_names_are_quoted() {
    let records = parse_acl_list(r#"{"\"Sales Team\"=r/app",user=r/app}"#);
    let mut out = String::new();
    write_grants(&mut out, &orders_target(), &records).unwrap();
    assert!(out.contains("TO \"Sales Team\";"));
    assert!(out.contains("TO \"user\";"));
}

#[test]
fn test_grantor_is_dropped() {
    let record = parse_acl_entry("alice=r/\"Someone Else\"").unwrap();
    assert_eq!(record.grantee.as_deref(), Some("alice"));
    assert_eq!(record.privileges, "r");
}
