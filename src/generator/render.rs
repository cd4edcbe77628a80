//! Renders a [`ContextModuleIr`] to CommonJS module source

use crate::generator::ir::{ContextModuleIr, LookupWrapper, Reference, TableEntry};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};

/// Error code carried by lookups of keys the context does not contain.
pub const MODULE_NOT_FOUND_CODE: &str = "MODULE_NOT_FOUND";

const LOOKUP_FN: &str = "requireContext";

/// Source text for a context module.
pub fn render(ir: &ContextModuleIr) -> String {
    ModuleSource(ir).to_string()
}

fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

struct ModuleSource<'a>(&'a ContextModuleIr);

impl Display for ModuleSource<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let ir = self.0;
        writeln!(f, "var contextId = {};", js_string(ir.id()))?;
        write_not_found_helper(f)?;

        match ir {
            ContextModuleIr::Empty { .. } => {
                writeln!(f, "function {}(request) {{", LOOKUP_FN)?;
                writeln!(f, "  throw contextModuleNotFound(request);")?;
                writeln!(f, "}}")?;
                writeln!(f, "{}.keys = function keys() {{", LOOKUP_FN)?;
                writeln!(f, "  return [];")?;
                writeln!(f, "}};")?;
            }
            ContextModuleIr::Table {
                entries, lookup, ..
            } => {
                write_table(f, entries)?;
                write_lookup(f, *lookup)?;
                writeln!(f, "{}.keys = function keys() {{", LOOKUP_FN)?;
                writeln!(f, "  return Object.keys(map);")?;
                writeln!(f, "}};")?;
            }
        }

        writeln!(f, "{}.id = contextId;", LOOKUP_FN)?;
        writeln!(f, "{}.resolve = function resolve(request) {{", LOOKUP_FN)?;
        writeln!(
            f,
            "  throw new Error(\"resolve() is not implemented for context modules (requested \" + JSON.stringify(request) + \")\");"
        )?;
        writeln!(f, "}};")?;
        writeln!(f, "module.exports = {};", LOOKUP_FN)
    }
}

fn write_not_found_helper(f: &mut Formatter<'_>) -> fmt::Result {
    writeln!(f, "function contextModuleNotFound(request) {{")?;
    writeln!(
        f,
        "  var error = new Error(\"Cannot find module \" + JSON.stringify(request) + \" in context \" + contextId);"
    )?;
    writeln!(f, "  error.code = {};", js_string(MODULE_NOT_FOUND_CODE))?;
    writeln!(f, "  return error;")?;
    writeln!(f, "}}")
}

fn write_table(f: &mut Formatter<'_>, entries: &[TableEntry]) -> fmt::Result {
    // getters re-evaluate on every read so a broken file only fails its own key
    writeln!(f, "var map = Object.defineProperties({{}}, {{")?;
    for entry in entries {
        let expression = match &entry.reference {
            Reference::Require(path) => format!("require({})", js_string(path)),
            Reference::Import(path) => format!("import({})", js_string(path)),
        };
        writeln!(
            f,
            "  {}: {{ enumerable: true, get: function () {{ return {}; }} }},",
            js_string(&entry.key),
            expression
        )?;
    }
    writeln!(f, "}});")
}

fn write_lookup(f: &mut Formatter<'_>, lookup: LookupWrapper) -> fmt::Result {
    writeln!(f, "function {}(request) {{", LOOKUP_FN)?;
    match lookup {
        LookupWrapper::Direct => {
            write_guarded_read(f, "  ")?;
        }
        LookupWrapper::Deferred => {
            // a resolved promise keeps lookup failures as rejections instead of throws
            writeln!(f, "  return Promise.resolve().then(function () {{")?;
            write_guarded_read(f, "    ")?;
            writeln!(f, "  }});")?;
        }
    }
    writeln!(f, "}}")
}

fn write_guarded_read(f: &mut Formatter<'_>, indent: &str) -> fmt::Result {
    writeln!(
        f,
        "{}if (!Object.prototype.hasOwnProperty.call(map, request)) {{",
        indent
    )?;
    writeln!(f, "{}  throw contextModuleNotFound(request);", indent)?;
    writeln!(f, "{}}}", indent)?;
    writeln!(f, "{}return map[request];", indent)
}
