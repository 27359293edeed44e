//! Request target used to partition per-table timers

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{CONTEXT_SEPARATOR, UNDEFINED_KEYSPACE, UNDEFINED_TABLE};

/// Keyspace and table a request is issued against
///
/// Construction never fails: blank parts are replaced by the
/// `undefined-keyspace` / `undefined-table` sentinels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableMeta {
    keyspace: String,
    table: String,
}

impl TableMeta {
    pub fn new(keyspace: impl AsRef<str>, table: impl AsRef<str>) -> Self {
        Self {
            keyspace: sanitize(keyspace.as_ref(), UNDEFINED_KEYSPACE),
            table: sanitize(table.as_ref(), UNDEFINED_TABLE),
        }
    }

    /// Target whose keyspace and table are both unknown
    pub fn undefined() -> Self {
        Self { keyspace: UNDEFINED_KEYSPACE.to_string(), table: UNDEFINED_TABLE.to_string() }
    }

    /// Build from optional parts, e.g. a statement with no bound keyspace
    pub fn from_parts(keyspace: Option<&str>, table: Option<&str>) -> Self {
        Self::new(keyspace.unwrap_or(""), table.unwrap_or(""))
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Metric context string, `"{keyspace}.{table}"`
    pub fn context(&self) -> String {
        format!("{}{}{}", self.keyspace, CONTEXT_SEPARATOR, self.table)
    }

    /// Context for an optional target, falling back to the sentinels
    pub fn context_for(target: Option<&Self>) -> String {
        match target {
            Some(meta) => meta.context(),
            None => Self::undefined().context(),
        }
    }
}

impl Default for TableMeta {
    fn default() -> Self {
        Self::undefined()
    }
}

impl fmt::Display for TableMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.keyspace, CONTEXT_SEPARATOR, self.table)
    }
}

fn sanitize(value: &str, sentinel: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        sentinel.to_string()
    } else {
        trimmed.to_string()
    }
}
