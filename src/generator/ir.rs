//! Structured form of a generated context module
//!
//! The IR states what must be true about a context module (which keys it exposes, how
//! each entry loads, whether lookups are deferred) independently of how it is printed.

use serde::Serialize;

/// How an entry pulls in the file it exposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "kebab-case")]
pub enum Reference {
    /// `require(path)`: the file is bundled together with the context module
    Require(String),
    /// `import(path)`: the file is loaded on first access
    Import(String),
}

impl Reference {
    pub fn path(&self) -> &str {
        match self {
            Reference::Require(path) | Reference::Import(path) => path,
        }
    }
}

/// One lookup table entry. Always rendered as an accessor, never a precomputed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    /// `./`-prefixed request path relative to the context root
    pub key: String,
    pub reference: Reference,
}

/// Shape of the value returned by the lookup function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupWrapper {
    /// The entry value is returned as-is
    Direct,
    /// The entry value is returned through an already-resolved promise
    Deferred,
}

/// A context module before rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "kebab-case")]
pub enum ContextModuleIr {
    /// No file matched: every lookup throws `MODULE_NOT_FOUND`
    Empty { id: String },
    Table {
        id: String,
        entries: Vec<TableEntry>,
        lookup: LookupWrapper,
    },
}

impl ContextModuleIr {
    pub fn id(&self) -> &str {
        match self {
            ContextModuleIr::Empty { id } | ContextModuleIr::Table { id, .. } => id,
        }
    }

    /// Keys in table order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries().iter().map(|entry| entry.key.as_str()).collect()
    }

    pub fn entries(&self) -> &[TableEntry] {
        match self {
            ContextModuleIr::Empty { .. } => &[],
            ContextModuleIr::Table { entries, .. } => entries,
        }
    }

    /// Whether the lookup function returns a deferred value.
    ///
    /// The empty module throws synchronously whatever the mode.
    pub fn is_deferred(&self) -> bool {
        matches!(
            self,
            ContextModuleIr::Table {
                lookup: LookupWrapper::Deferred,
                ..
            }
        )
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ContextModuleIr::Empty { .. })
    }
}
