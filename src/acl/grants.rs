//! GRANT statement writer

use std::fmt::{self, Write};

use crate::sql::{qualified, quote_ident};

use super::GrantRecord;

/// Object class named in the `ON` clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantObject {
    /// Tables, views and materialized views
    Table,
    Sequence,
}

impl GrantObject {
    pub fn keyword(&self) -> &'static str {
        match self {
            GrantObject::Table => "TABLE",
            GrantObject::Sequence => "SEQUENCE",
        }
    }
}

/// What a set of grants applies to
#[derive(Debug, Clone, Copy)]
pub struct GrantTarget<'a> {
    pub object: GrantObject,
    pub schema: &'a str,
    pub name: &'a str,
    /// Column-level grants when set
    pub columns: Option<&'a [&'a str]>,
}

/// Write one `GRANT` per record, plus a second `... WITH GRANT OPTION`
/// statement for privileges that carried `*`.
///
/// Privileges are written in the order they appear in the ACL token, one
/// keyword per letter, never merged into `ALL`.
pub fn write_grants<W: Write>(
    out: &mut W,
    target: &GrantTarget<'_>,
    records: &[GrantRecord],
) -> fmt::Result {
    let object_name = qualified(target.schema, target.name);
    let column_list = target.columns.map(|columns| {
        columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ")
    });

    for record in records {
        let grantee = match &record.grantee {
            Some(role) => quote_ident(role).into_owned(),
            None => "PUBLIC".to_string(),
        };
        let privileges = record.privilege_list();

        for with_option in [false, true] {
            let keywords: Vec<String> = privileges
                .iter()
                .filter(|(_, grantable)| *grantable == with_option)
                .map(|(privilege, _)| match &column_list {
                    Some(columns) => format!("{} ({})", privilege.keyword(), columns),
                    None => privilege.keyword().to_string(),
                })
                .collect();
            if keywords.is_empty() {
                continue;
            }
            write!(
                out,
                "GRANT {} ON {} {} TO {}",
                keywords.join(", "),
                target.object.keyword(),
                object_name,
                grantee
            )?;
            if with_option {
                out.write_str(" WITH GRANT OPTION")?;
            }
            out.write_str(";\n")?;
        }
    }
    Ok(())
}
