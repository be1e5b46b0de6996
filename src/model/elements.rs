//! Schema model element types

use crate::catalog::Oid;

/// A security label attached by a label provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityLabel {
    pub provider: String,
    pub label: String,
}

/// Column storage strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Plain,
    External,
    Main,
    Extended,
}

impl StorageMode {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "p" => Some(StorageMode::Plain),
            "e" => Some(StorageMode::External),
            "m" => Some(StorageMode::Main),
            "x" => Some(StorageMode::Extended),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            StorageMode::Plain => "PLAIN",
            StorageMode::External => "EXTERNAL",
            StorageMode::Main => "MAIN",
            StorageMode::Extended => "EXTENDED",
        }
    }
}

/// Identity column flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    Always,
    ByDefault,
}

impl IdentityKind {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(IdentityKind::Always),
            "d" => Some(IdentityKind::ByDefault),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            IdentityKind::Always => "ALWAYS",
            IdentityKind::ByDefault => "BY DEFAULT",
        }
    }
}

/// Column element
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Catalog ordinal at snapshot time (1-based, may have gaps left by
    /// previously dropped columns)
    pub position: i32,
    pub name: String,
    pub nullable: bool,
    /// `format_type()` output, e.g. `character varying(40)`
    pub type_expr: String,
    /// Default expression, or the generation expression when `generated`
    pub default_expr: Option<String>,
    pub collation: Option<String>,
    pub storage: StorageMode,
    pub storage_is_default: bool,
    pub stats_target: Option<i32>,
    pub options: Option<String>,
    pub comment: Option<String>,
    /// Raw column ACL
    pub acl: Option<String>,
    pub identity: Option<IdentityKind>,
    /// Stored generated column
    pub generated: bool,
    pub security_labels: Vec<SecurityLabel>,
}

impl ColumnSpec {
    /// Plain column with default settings; handy for fixtures.
    pub fn new(position: i32, name: impl Into<String>, type_expr: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
            nullable: true,
            type_expr: type_expr.into(),
            default_expr: None,
            collation: None,
            storage: StorageMode::Extended,
            storage_is_default: true,
            stats_target: None,
            options: None,
            comment: None,
            acl: None,
            identity: None,
            generated: false,
            security_labels: Vec::new(),
        }
    }

    /// Whether the value has to be copied back from the backup table.
    /// Generated columns recompute themselves.
    pub fn is_restorable(&self) -> bool {
        !self.generated
    }
}

/// Index element (indexes that do not back a constraint)
#[derive(Debug, Clone)]
pub struct IndexSpec {
    pub name: String,
    /// Full `CREATE INDEX` statement
    pub definition: String,
    pub tablespace: Option<String>,
    pub comment: Option<String>,
}

/// Constraint type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    Check,
    Exclusion,
}

impl ConstraintKind {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "p" => Some(ConstraintKind::PrimaryKey),
            "u" => Some(ConstraintKind::Unique),
            "f" => Some(ConstraintKind::ForeignKey),
            "c" => Some(ConstraintKind::Check),
            "x" => Some(ConstraintKind::Exclusion),
            _ => None,
        }
    }

    /// Constraints backed by an index that can live in a tablespace
    pub fn has_index(&self) -> bool {
        matches!(
            self,
            ConstraintKind::PrimaryKey | ConstraintKind::Unique | ConstraintKind::Exclusion
        )
    }
}

/// Constraint element
#[derive(Debug, Clone)]
pub struct ConstraintSpec {
    pub name: String,
    pub kind: ConstraintKind,
    /// `pg_get_constraintdef()` output, e.g. `CHECK ((qty > 0))`
    pub definition: String,
    pub tablespace: Option<String>,
    pub comment: Option<String>,
}

/// Foreign key of another table that points at the snapshot table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencingKey {
    pub schema: String,
    pub table: String,
    pub name: String,
}

/// View flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    View,
    MaterializedView,
}

impl ViewKind {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "v" => Some(ViewKind::View),
            "m" => Some(ViewKind::MaterializedView),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            ViewKind::View => "VIEW",
            ViewKind::MaterializedView => "MATERIALIZED VIEW",
        }
    }
}

/// View element for a view that references the table
#[derive(Debug, Clone)]
pub struct DependentView {
    pub oid: Oid,
    pub schema: String,
    pub name: String,
    pub kind: ViewKind,
    /// Query text without a trailing semicolon
    pub definition: String,
    pub owner: String,
    pub acl: Option<String>,
    pub comment: Option<String>,
    /// `WITH (...)` options other than the check option
    pub options: Option<String>,
    /// `LOCAL` or `CASCADED`
    pub check_option: Option<String>,
    pub security_labels: Vec<SecurityLabel>,
    /// Indexes on a materialized view; dropping the view takes them along
    pub indexes: Vec<IndexSpec>,
}

/// Sequence owned by a column of the table
#[derive(Debug, Clone)]
pub struct OwnedSequence {
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
    pub security_labels: Vec<SecurityLabel>,
}

/// Firing mode of a trigger (`tgenabled`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    /// Fires in origin and local sessions, the `ENABLE` default
    Origin,
    Replica,
    Always,
    Disabled,
}

impl TriggerState {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "O" => Some(TriggerState::Origin),
            "R" => Some(TriggerState::Replica),
            "A" => Some(TriggerState::Always),
            "D" => Some(TriggerState::Disabled),
            _ => None,
        }
    }

    /// `ALTER TABLE` action that puts a trigger back in this state
    pub fn action(&self) -> &'static str {
        match self {
            TriggerState::Origin => "ENABLE TRIGGER",
            TriggerState::Replica => "ENABLE REPLICA TRIGGER",
            TriggerState::Always => "ENABLE ALWAYS TRIGGER",
            TriggerState::Disabled => "DISABLE TRIGGER",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TriggerSpec {
    pub name: String,
    pub state: TriggerState,
}
