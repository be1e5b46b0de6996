//! Identifier and literal quoting for generated PostgreSQL text.
//!
//! Every name that reaches the script (schemas, tables, columns, roles,
//! constraint names) goes through [`quote_ident`] or [`qualified`]. String
//! values such as comments and security labels go through [`quote_literal`].
//! Catalog definitions and user supplied expressions are never passed through
//! these helpers; they are written verbatim.
//!
//! # Examples
//!
//! ```
//! use pgreshape::sql::{qualified, quote_ident, quote_literal};
//!
//! assert_eq!(quote_ident("orders"), "orders");
//! assert_eq!(quote_ident("Orders"), "\"Orders\"");
//! assert_eq!(quote_ident("user"), "\"user\"");
//! assert_eq!(qualified("public", "my table"), "public.\"my table\"");
//! assert_eq!(quote_literal("it's"), "'it''s'");
//! ```

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// PostgreSQL truncates identifiers longer than this many bytes.
pub const MAX_IDENTIFIER_BYTES: usize = 63;

/// Identifiers that can be written without quotes (before keyword checks).
static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_$]*$").expect("Invalid identifier regex"));

/// Reserved, column-name and type/function-name keywords. Sorted for binary search.
const KEYWORDS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "authorization", "between", "bigint", "binary", "bit", "boolean", "both", "case",
    "cast", "char", "character", "check", "coalesce", "collate", "collation", "column",
    "concurrently", "constraint", "create", "cross", "current_catalog", "current_date",
    "current_role", "current_schema", "current_time", "current_timestamp", "current_user",
    "dec", "decimal", "default", "deferrable", "desc", "distinct", "do", "else", "end",
    "except", "exists", "extract", "false", "fetch", "float", "for", "foreign", "freeze",
    "from", "full", "grant", "greatest", "group", "grouping", "having", "ilike", "in",
    "initially", "inner", "inout", "int", "integer", "intersect", "interval", "into", "is",
    "isnull", "join", "json", "json_array", "json_arrayagg", "json_exists", "json_object",
    "json_objectagg", "json_query", "json_scalar", "json_serialize", "json_table",
    "json_value", "lateral", "leading", "least", "left", "like", "limit", "localtime",
    "localtimestamp", "merge_action", "national", "natural", "nchar", "none", "normalize",
    "not", "notnull", "null", "nullif", "numeric", "offset", "on", "only", "or", "order",
    "out", "outer", "overlaps", "overlay", "placing", "position", "precision", "primary",
    "real", "references", "returning", "right", "row", "select", "session_user", "setof",
    "similar", "smallint", "some", "substring", "symmetric", "system_user", "table",
    "tablesample", "then", "time", "timestamp", "to", "trailing", "treat", "trim", "true",
    "union", "unique", "user", "using", "values", "varchar", "variadic", "verbose", "when",
    "where", "window", "with", "xmlattributes", "xmlconcat", "xmlelement", "xmlexists",
    "xmlforest", "xmlnamespaces", "xmlparse", "xmlpi", "xmlroot", "xmlserialize",
    "xmltable",
];

/// Quote an identifier the way `quote_ident()` does on the server.
///
/// Lower-case names made of letters, digits, `_` and `$` that are not
/// keywords are returned untouched; everything else is wrapped in double
/// quotes with embedded quotes doubled.
pub fn quote_ident(ident: &str) -> Cow<'_, str> {
    if PLAIN_IDENTIFIER.is_match(ident) && KEYWORDS.binary_search(&ident).is_err() {
        Cow::Borrowed(ident)
    } else {
        Cow::Owned(format!("\"{}\"", ident.replace('"', "\"\"")))
    }
}

/// Schema-qualified name, each part quoted independently.
pub fn qualified(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(name))
}

/// Quote a string value as a SQL literal.
///
/// Backslashes switch to the `E'...'` form so the result is correct
/// regardless of `standard_conforming_strings`.
pub fn quote_literal(value: &str) -> String {
    let escaped = value.replace('\'', "''");
    if escaped.contains('\\') {
        format!("E'{}'", escaped.replace('\\', "\\\\"))
    } else {
        format!("'{}'", escaped)
    }
}

/// Clip an identifier to [`MAX_IDENTIFIER_BYTES`] without splitting a character.
pub fn clip_identifier(ident: &str) -> &str {
    if ident.len() <= MAX_IDENTIFIER_BYTES {
        return ident;
    }
    let mut end = MAX_IDENTIFIER_BYTES;
    while !ident.is_char_boundary(end) {
        end -= 1;
    }
    &ident[..end]
}
