//! Read-only syntax tree visitors used by the migration stages.

mod binding_references;
mod default_export;
mod dependency_collector;
mod loader_calls;
mod mock_calls;

pub use binding_references::{RenamePlan, RenameSite, plan_rename, top_level_bindings};
pub use default_export::{
    DefaultExport, DefaultForm, ForwardedDefault, LocalDeclaration, LocalDefault, ReexportedDefault,
    analyze_default_export, exported_names,
};
pub use dependency_collector::collect_dependencies;
pub use loader_calls::{LoaderCall, LoaderKind, collect_loader_calls};
pub use mock_calls::{MockCall, collect_mock_calls};
use swc_ecma_ast::{Expr, Lit, ModuleExportName, ObjectPatProp, Pat};

use crate::source_module::SourceModule;

/// Module specifier written as a plain string or a template literal without substitutions
pub(crate) fn literal_specifier(module: &SourceModule, expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(Lit::Str(literal)) => Some(module.string_value(literal)),
        Expr::Tpl(template) if template.exprs.is_empty() => {
            let raw = module.text(template.span);
            raw.strip_prefix('`')
                .and_then(|rest| rest.strip_suffix('`'))
                .map(str::to_owned)
        }
        Expr::Paren(paren) => literal_specifier(module, &paren.expr),
        _ => None,
    }
}

/// Name written in an import/export specifier
pub(crate) fn export_name(module: &SourceModule, name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ModuleExportName::Str(literal) => module.string_value(literal),
    }
}

/// Push every identifier bound by a declaration pattern
pub(crate) fn pattern_bindings(pat: &Pat, out: &mut Vec<String>) {
    match pat {
        Pat::Ident(binding) => out.push(binding.id.sym.to_string()),
        Pat::Array(array) => {
            for element in array.elems.iter().flatten() {
                pattern_bindings(element, out);
            }
        }
        Pat::Rest(rest) => pattern_bindings(&rest.arg, out),
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ObjectPatProp::KeyValue(key_value) => {
                        pattern_bindings(&key_value.value, out);
                    }
                    ObjectPatProp::Assign(assign) => {
                        out.push(assign.key.id.sym.to_string());
                    }
                    ObjectPatProp::Rest(rest) => pattern_bindings(&rest.arg, out),
                }
            }
        }
        Pat::Assign(assign) => pattern_bindings(&assign.left, out),
        Pat::Invalid(_) | Pat::Expr(_) => {}
    }
}
