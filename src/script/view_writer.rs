//! Dependent view statements
//!
//! Views are dropped dependents first and recreated dependencies first,
//! then given back their owner, grants, comment and security labels.
//! Materialized views also get their indexes back.

use crate::acl::{parse_acl_list, write_grants, GrantObject, GrantTarget};
use crate::model::{DependentView, ViewKind};
use crate::sql::{qualified, quote_ident, quote_literal};

use super::column_writer::write_labels;
use super::object_writer::write_index_create;
use super::writer::ScriptWriter;

pub(crate) fn write_view_drops(out: &mut ScriptWriter, views: &[DependentView]) {
    for view in views.iter().rev() {
        out.statement(format!(
            "DROP {} {}",
            view.kind.keyword(),
            qualified(&view.schema, &view.name)
        ));
    }
}

pub(crate) fn write_view_creates(
    out: &mut ScriptWriter,
    views: &[DependentView],
) -> anyhow::Result<()> {
    for view in views {
        write_view(out, view)?;
    }
    Ok(())
}

fn write_view(out: &mut ScriptWriter, view: &DependentView) -> anyhow::Result<()> {
    let name = qualified(&view.schema, &view.name);

    let mut create = format!("CREATE {} {}", view.kind.keyword(), name);
    if let Some(options) = &view.options {
        create.push_str(&format!(" WITH ({})", options));
    }
    create.push_str(" AS\n");
    create.push_str(&view.definition);
    match view.kind {
        ViewKind::View => {
            if let Some(check) = &view.check_option {
                create.push_str(&format!("\n  WITH {} CHECK OPTION", check));
            }
        }
        ViewKind::MaterializedView => create.push_str("\n  WITH DATA"),
    }
    out.statement(create);

    for index in &view.indexes {
        write_index_create(out, &view.schema, index);
    }

    out.statement(format!(
        "ALTER {} {} OWNER TO {}",
        view.kind.keyword(),
        name,
        quote_ident(&view.owner)
    ));

    if let Some(acl) = &view.acl {
        write_grants(
            out,
            &GrantTarget {
                object: GrantObject::Table,
                schema: &view.schema,
                name: &view.name,
                columns: None,
            },
            &parse_acl_list(acl),
        )?;
    }

    if let Some(comment) = &view.comment {
        out.statement(format!(
            "COMMENT ON {} {} IS {}",
            view.kind.keyword(),
            name,
            quote_literal(comment)
        ));
    }

    write_labels(
        out,
        &format!("{} {}", view.kind.keyword(), name),
        &view.security_labels,
    );
    Ok(())
}
