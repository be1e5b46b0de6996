//! Access-control list handling
//!
//! Raw `aclitem[]` text from the catalog is decoded into [`GrantRecord`]s and
//! replayed as `GRANT` statements for objects the script drops and recreates.

mod grants;
mod parser;

pub use grants::{write_grants, GrantObject, GrantTarget};
pub use parser::{parse_acl_entry, parse_acl_list, MalformedAclToken};

/// One parsed ACL entry: who was granted what. The grantor is not kept;
/// replayed grants are issued by whoever runs the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRecord {
    /// `None` means `PUBLIC`
    pub grantee: Option<String>,
    /// Privilege token exactly as it appeared, e.g. `"arw"` or `"r*"`
    pub privileges: String,
}

impl GrantRecord {
    /// Privileges in token order, paired with their grant option flag.
    pub fn privilege_list(&self) -> Vec<(Privilege, bool)> {
        let mut list: Vec<(Privilege, bool)> = Vec::with_capacity(self.privileges.len());
        for c in self.privileges.chars() {
            if c == '*' {
                if let Some(last) = list.last_mut() {
                    last.1 = true;
                }
            } else if let Some(privilege) = Privilege::from_code(c) {
                list.push((privilege, false));
            }
        }
        list
    }
}

/// A single privilege letter from the PostgreSQL ACL alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    Insert,
    Select,
    Update,
    Delete,
    Truncate,
    References,
    Trigger,
    Maintain,
    Execute,
    Usage,
    Create,
    Connect,
    Temporary,
    Set,
    AlterSystem,
}

impl Privilege {
    pub fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'a' => Privilege::Insert,
            'r' => Privilege::Select,
            'w' => Privilege::Update,
            'd' => Privilege::Delete,
            'D' => Privilege::Truncate,
            'x' => Privilege::References,
            't' => Privilege::Trigger,
            'm' => Privilege::Maintain,
            'X' => Privilege::Execute,
            'U' => Privilege::Usage,
            'C' => Privilege::Create,
            'c' => Privilege::Connect,
            'T' => Privilege::Temporary,
            's' => Privilege::Set,
            'A' => Privilege::AlterSystem,
            _ => return None,
        })
    }

    /// Keyword used in `GRANT` statements
    pub fn keyword(&self) -> &'static str {
        match self {
            Privilege::Insert => "INSERT",
            Privilege::Select => "SELECT",
            Privilege::Update => "UPDATE",
            Privilege::Delete => "DELETE",
            Privilege::Truncate => "TRUNCATE",
            Privilege::References => "REFERENCES",
            Privilege::Trigger => "TRIGGER",
            Privilege::Maintain => "MAINTAIN",
            Privilege::Execute => "EXECUTE",
            Privilege::Usage => "USAGE",
            Privilege::Create => "CREATE",
            Privilege::Connect => "CONNECT",
            Privilege::Temporary => "TEMPORARY",
            Privilege::Set => "SET",
            Privilege::AlterSystem => "ALTER SYSTEM",
        }
    }
}
