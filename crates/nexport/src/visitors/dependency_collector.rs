//! Collects every module specifier a module depends on.

use swc_ecma_ast::{
    CallExpr, Callee, ExportAll, Expr, ImportDecl, NamedExport, TsImportEqualsDecl,
    TsModuleRef,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::literal_specifier;
use crate::source_module::SourceModule;

/// Specifiers of imports, re-exports, `require` calls and dynamic imports, in source
/// order and before resolution
pub fn collect_dependencies(module: &SourceModule) -> Vec<String> {
    let mut collector = DependencyCollector {
        module,
        dependencies: Vec::new(),
    };
    module.ast().visit_with(&mut collector);
    collector.dependencies
}

struct DependencyCollector<'a> {
    module: &'a SourceModule,
    dependencies: Vec<String>,
}

impl Visit for DependencyCollector<'_> {
    fn visit_import_decl(&mut self, import: &ImportDecl) {
        self.dependencies.push(self.module.string_value(&import.src));
    }

    fn visit_named_export(&mut self, export: &NamedExport) {
        if let Some(src) = &export.src {
            self.dependencies.push(self.module.string_value(src));
        }
    }

    fn visit_export_all(&mut self, export: &ExportAll) {
        self.dependencies.push(self.module.string_value(&export.src));
    }

    fn visit_ts_import_equals_decl(&mut self, import: &TsImportEqualsDecl) {
        if let TsModuleRef::TsExternalModuleRef(external) = &import.module_ref {
            self.dependencies.push(self.module.string_value(&external.expr));
        }
    }

    fn visit_call_expr(&mut self, call: &CallExpr) {
        let loads_module = match &call.callee {
            Callee::Import(_) => true,
            Callee::Expr(callee) => {
                matches!(&**callee, Expr::Ident(ident) if &*ident.sym == "require")
            }
            Callee::Super(_) => false,
        };
        if loads_module
            && let Some(first) = call.args.first()
            && first.spread.is_none()
            && let Some(specifier) = literal_specifier(self.module, &first.expr)
        {
            self.dependencies.push(specifier);
        }
        call.visit_children_with(self);
    }
}
