//! Table snapshot representation

use crate::catalog::Oid;
use crate::sql::qualified;

use super::{
    ColumnSpec, ConstraintSpec, DependentView, IndexSpec, OwnedSequence, ReferencingKey, SecurityLabel,
    TriggerSpec,
};

/// Everything known about one table and the objects that depend on its
/// column layout. Built once, then only read.
#[derive(Debug, Clone, Default)]
pub struct TableSnapshot {
    pub oid: Oid,
    pub schema: String,
    pub name: String,
    pub security_labels: Vec<SecurityLabel>,
    /// Ordinal order
    pub columns: Vec<ColumnSpec>,
    pub indexes: Vec<IndexSpec>,
    /// Primary key and unique constraints
    pub unique_constraints: Vec<ConstraintSpec>,
    pub foreign_keys: Vec<ConstraintSpec>,
    /// Foreign keys on other tables that reference this one
    pub referencing_keys: Vec<ReferencingKey>,
    pub exclusion_constraints: Vec<ConstraintSpec>,
    pub check_constraints: Vec<ConstraintSpec>,
    /// Dependencies first
    pub views: Vec<DependentView>,
    pub sequences: Vec<OwnedSequence>,
    pub triggers: Vec<TriggerSpec>,
}

impl TableSnapshot {
    pub fn new(oid: Oid, schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            oid,
            schema: schema.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Quoted `schema.table`
    pub fn qualified_name(&self) -> String {
        qualified(&self.schema, &self.name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column with the highest ordinal
    pub fn last_column(&self) -> Option<&ColumnSpec> {
        self.columns.iter().max_by_key(|c| c.position)
    }
}
