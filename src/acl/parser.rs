//! Parser for `aclitem[]` text such as `{alice=r/bob,=arw/bob}`.

use thiserror::Error;
use tracing::warn;

use super::{GrantRecord, Privilege};

/// An ACL entry that could not be decoded. Recoverable: the entry is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed ACL entry {token:?}: {reason}")]
pub struct MalformedAclToken {
    pub token: String,
    pub reason: &'static str,
}

impl MalformedAclToken {
    fn new(token: &str, reason: &'static str) -> Self {
        Self {
            token: token.to_string(),
            reason,
        }
    }
}

/// Parse one `grantee=privileges/grantor` entry.
///
/// The grantee may be double-quoted (`""` escapes a quote) and is empty for
/// `PUBLIC`. The grantor is validated for presence and then dropped.
pub fn parse_acl_entry(token: &str) -> Result<GrantRecord, MalformedAclToken> {
    let token = token.trim();

    let (grantee, rest) = if let Some(quoted) = token.strip_prefix('"') {
        let (name, after) = read_quoted_grantee(quoted)
            .ok_or_else(|| MalformedAclToken::new(token, "unterminated quoted grantee"))?;
        let rest = after
            .strip_prefix('=')
            .ok_or_else(|| MalformedAclToken::new(token, "missing '=' after grantee"))?;
        (name, rest)
    } else {
        let (name, rest) = token
            .split_once('=')
            .ok_or_else(|| MalformedAclToken::new(token, "missing '='"))?;
        (name.to_string(), rest)
    };

    let (privileges, grantor) = rest
        .split_once('/')
        .ok_or_else(|| MalformedAclToken::new(token, "missing '/grantor'"))?;

    if grantor.is_empty() {
        return Err(MalformedAclToken::new(token, "empty grantor"));
    }
    validate_privileges(privileges).map_err(|reason| MalformedAclToken::new(token, reason))?;

    Ok(GrantRecord {
        grantee: if grantee.is_empty() {
            None
        } else {
            Some(grantee)
        },
        privileges: privileges.to_string(),
    })
}

/// Parse a full ACL array literal, skipping entries that do not decode.
///
/// Order is preserved. Empty input, `{}` and `NULL` give an empty list.
pub fn parse_acl_list(raw: &str) -> Vec<GrantRecord> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return Vec::new();
    }
    let body = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed);

    split_array_elements(body)
        .into_iter()
        .filter(|element| !element.is_empty())
        .filter_map(|element| match parse_acl_entry(&element) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(%err, "skipping ACL entry");
                None
            }
        })
        .collect()
}

/// Read a quoted grantee (opening quote already consumed).
/// Returns the unescaped name and the remainder after the closing quote.
fn read_quoted_grantee(input: &str) -> Option<(String, &str)> {
    let mut name = String::new();
    let mut chars = input.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '"' {
            if let Some(&(_, '"')) = chars.peek() {
                chars.next();
                name.push('"');
            } else {
                return Some((name, &input[i + 1..]));
            }
        } else {
            name.push(c);
        }
    }
    None
}

fn validate_privileges(privileges: &str) -> Result<(), &'static str> {
    if privileges.is_empty() {
        return Err("no privileges");
    }
    let mut after_privilege = false;
    for c in privileges.chars() {
        if c == '*' {
            if !after_privilege {
                return Err("grant option without privilege");
            }
            after_privilege = false;
        } else if Privilege::from_code(c).is_some() {
            after_privilege = true;
        } else {
            return Err("unknown privilege code");
        }
    }
    Ok(())
}

/// Split the inside of an array literal on top-level commas.
///
/// Elements wrapped in double quotes are unquoted and their backslash escapes
/// resolved, so `"\"my role\"=r/x"` yields `"my role"=r/x`.
fn split_array_elements(body: &str) -> Vec<String> {
    let mut elements = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                elements.push(std::mem::take(&mut current).trim().to_string());
            }
            _ => current.push(c),
        }
    }
    elements.push(current.trim().to_string());
    elements
}
