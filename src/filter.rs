//! Context filters: raw pattern plus flags, compiled on demand.
//!
//! A filter is carried around in its raw form (as written in the require call) and
//! compiled to a [`CompiledFilter`] when a resolution needs it. Compilation failures are
//! configuration errors and abort the resolution that asked for them.

use crate::error::ContextError;
use parking_lot::Mutex;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Flag characters a filter may carry, in canonical order.
const KNOWN_FLAGS: &[char] = &['g', 'i', 'm', 's', 'u', 'y'];

/// Raw filter as supplied by the context request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextFilter {
    pub pattern: String,
    #[serde(default)]
    pub flags: String,
}

impl ContextFilter {
    pub fn new(pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            flags: flags.into(),
        }
    }

    /// Filter accepting every candidate.
    pub fn match_all() -> Self {
        Self::new(".*", "")
    }

    fn configuration_error(&self, reason: impl Into<String>) -> ContextError {
        ContextError::Configuration {
            pattern: self.pattern.clone(),
            flags: self.flags.clone(),
            reason: reason.into(),
        }
    }

    /// Flags deduplicated and sorted. Unknown flags are rejected.
    pub fn canonical_flags(&self) -> Result<String, ContextError> {
        let mut seen = Vec::new();
        for flag in self.flags.chars() {
            if !KNOWN_FLAGS.contains(&flag) {
                return Err(self.configuration_error(format!("unsupported flag '{}'", flag)));
            }
            if !seen.contains(&flag) {
                seen.push(flag);
            }
        }
        seen.sort_unstable();
        Ok(seen.into_iter().collect())
    }

    /// `/source/flags`, the string form used in identity keys.
    ///
    /// Unescaped `/` in the source is escaped and an empty source becomes `(?:)`, so
    /// filters that compile to the same matcher share one canonical form.
    pub fn canonical(&self) -> Result<String, ContextError> {
        let flags = self.canonical_flags()?;
        Ok(format!("/{}/{}", canonical_source(&self.pattern), flags))
    }

    /// Compile without memoization.
    pub fn compile(&self) -> Result<CompiledFilter, ContextError> {
        let canonical = self.canonical()?;
        let flags = self.canonical_flags()?;
        let regex = RegexBuilder::new(&self.pattern)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .build()
            .map_err(|e| self.configuration_error(e.to_string()))?;
        Ok(CompiledFilter { canonical, regex })
    }
}

fn canonical_source(pattern: &str) -> String {
    if pattern.is_empty() {
        return "(?:)".to_string();
    }
    let mut out = String::with_capacity(pattern.len());
    let mut escaped = false;
    let mut in_class = false;
    for c in pattern.chars() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => out.push('\\'),
            _ => {}
        }
        out.push(c);
    }
    out
}

/// Executable filter
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    canonical: String,
    regex: Regex,
}

impl CompiledFilter {
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

/// Memoizes compiled filters per (pattern, flags) pair.
///
/// Owned by a resolution service; two services never share compiled state.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: Mutex<HashMap<(String, String), Arc<CompiledFilter>>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(&self, filter: &ContextFilter) -> Result<Arc<CompiledFilter>, ContextError> {
        let key = (filter.pattern.clone(), filter.flags.clone());
        if let Some(hit) = self.compiled.lock().get(&key) {
            return Ok(Arc::clone(hit));
        }

        trace!(pattern = %filter.pattern, flags = %filter.flags, "Compiling context filter");
        let compiled = Arc::new(filter.compile()?);
        self.compiled.lock().insert(key, Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.compiled.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
