//! Catalog facts about one table
//!
//! [`CatalogSource`] is the seam between the reshape engine and the
//! database: one method per fact class, each returning plain rows. The live
//! implementation is [`PgCatalog`]; tests substitute fixture data.

mod postgres;
mod queries;

pub use postgres::PgCatalog;

use crate::error::ReshapeError;

/// PostgreSQL object identifier
pub type Oid = u32;

/// A table located by schema and name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub oid: Oid,
    pub schema: String,
    pub name: String,
}

/// One live column, in ordinal order
#[derive(Debug, Clone, Default)]
pub struct AttributeRow {
    pub number: i32,
    pub name: String,
    pub not_null: bool,
    pub type_name: String,
    pub default_expr: Option<String>,
    /// Already quoted and schema-qualified; only set when not the type default
    pub collation: Option<String>,
    /// Storage code: `p`, `e`, `m` or `x`
    pub storage: String,
    pub storage_is_default: bool,
    pub stats_target: Option<i32>,
    /// Comma-separated `name=value` pairs
    pub options: Option<String>,
    pub comment: Option<String>,
    pub acl: Option<String>,
    /// `a` (always), `d` (by default) or empty
    pub identity: String,
    /// `s` (stored) or empty
    pub generated: String,
}

/// An index that does not back a constraint, on the table or on a
/// materialized view
#[derive(Debug, Clone, Default)]
pub struct IndexRow {
    pub name: String,
    pub definition: String,
    pub tablespace: Option<String>,
    pub comment: Option<String>,
}

/// A table constraint; `kind` is the `contype` code
#[derive(Debug, Clone, Default)]
pub struct ConstraintRow {
    pub name: String,
    pub kind: String,
    pub definition: String,
    pub tablespace: Option<String>,
    pub comment: Option<String>,
}

/// A foreign key on another table that references this one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencingKeyRow {
    pub schema: String,
    pub table: String,
    pub name: String,
}

/// A view depending on the table, directly or through other views
#[derive(Debug, Clone, Default)]
pub struct ViewRow {
    pub oid: Oid,
    pub schema: String,
    pub name: String,
    /// `relkind`: `v` or `m`
    pub kind: String,
    pub definition: String,
    pub owner: String,
    pub acl: Option<String>,
    pub comment: Option<String>,
    pub options: Option<String>,
    pub check_option: Option<String>,
}

/// A sequence owned by one of the table's columns (`serial` style)
#[derive(Debug, Clone, Default)]
pub struct SequenceRow {
    pub oid: Oid,
    pub schema: String,
    pub name: String,
    pub owner_column: String,
    pub start: i64,
    pub increment: i64,
    pub min: i64,
    pub max: i64,
    pub cycle: bool,
    pub data_type: String,
    pub acl: Option<String>,
    pub comment: Option<String>,
}

/// A user trigger on the table; `enabled` is the `tgenabled` code
#[derive(Debug, Clone, Default)]
pub struct TriggerRow {
    pub name: String,
    pub enabled: String,
}

/// A security label on a relation (`sub_id` 0) or one of its columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityLabelRow {
    pub object: Oid,
    pub sub_id: i32,
    pub provider: String,
    pub label: String,
}

/// Which objects a security label query covers
#[derive(Debug, Clone, Copy)]
pub enum LabelScope<'a> {
    Table(Oid),
    Columns(Oid),
    Views(&'a [Oid]),
    Sequences(&'a [Oid]),
}

/// Structured fact queries about one table.
///
/// Implementations must return rows in catalog order: ordinal order for
/// attributes, name order for indexes, constraints and sequences, and
/// dependency order (dependencies first) for views. Triggers come in
/// name order.
pub trait CatalogSource {
    fn schema_exists(&self, schema: &str) -> Result<bool, ReshapeError>;

    fn find_table(&self, schema: &str, table: &str) -> Result<Option<TableRow>, ReshapeError>;

    fn attributes(&self, table: Oid) -> Result<Vec<AttributeRow>, ReshapeError>;

    /// Also asked for each dependent materialized view
    fn indexes(&self, table: Oid) -> Result<Vec<IndexRow>, ReshapeError>;

    /// Primary key and unique constraints
    fn unique_constraints(&self, table: Oid) -> Result<Vec<ConstraintRow>, ReshapeError>;

    fn foreign_keys(&self, table: Oid) -> Result<Vec<ConstraintRow>, ReshapeError>;

    /// Foreign keys of other tables pointing at `table`
    fn referencing_keys(&self, table: Oid) -> Result<Vec<ReferencingKeyRow>, ReshapeError>;

    fn exclusion_constraints(&self, table: Oid) -> Result<Vec<ConstraintRow>, ReshapeError>;

    fn check_constraints(&self, table: Oid) -> Result<Vec<ConstraintRow>, ReshapeError>;

    fn dependent_views(&self, table: Oid) -> Result<Vec<ViewRow>, ReshapeError>;

    fn owned_sequences(&self, table: Oid) -> Result<Vec<SequenceRow>, ReshapeError>;

    /// User triggers, internal constraint triggers excluded
    fn triggers(&self, table: Oid) -> Result<Vec<TriggerRow>, ReshapeError>;

    fn security_labels(
        &self,
        scope: LabelScope<'_>,
    ) -> Result<Vec<SecurityLabelRow>, ReshapeError>;
}
