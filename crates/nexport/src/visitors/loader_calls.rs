//! Finds runtime loader calls whose targets must keep their default export.
//!
//! Two call shapes load a module by specifier at runtime and read its `default` property
//! implicitly: CommonJS `require('./x')` and lazy-loading helpers such as
//! `lazy(() => import('./x'))` or `React.lazy(...)`.

use swc_common::Span;
use swc_ecma_ast::{CallExpr, Callee, Expr, MemberProp};
use swc_ecma_visit::{Visit, VisitWith};

use super::literal_specifier;
use crate::source_module::SourceModule;

/// How a module is loaded at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderKind {
    /// `require('<specifier>')`
    Require,
    /// Dynamic `import('<specifier>')` wrapped in a lazy-loading helper
    Lazy,
}

/// A loader call found in a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderCall {
    pub kind: LoaderKind,
    pub specifier: String,
    pub span: Span,
}

/// Collect `require` calls and dynamic imports nested inside calls to `lazy_helpers`
pub fn collect_loader_calls(module: &SourceModule, lazy_helpers: &[String]) -> Vec<LoaderCall> {
    let mut visitor = LoaderCallVisitor {
        module,
        lazy_helpers,
        calls: Vec::new(),
    };
    module.ast().visit_with(&mut visitor);
    visitor.calls
}

struct LoaderCallVisitor<'a> {
    module: &'a SourceModule,
    lazy_helpers: &'a [String],
    calls: Vec<LoaderCall>,
}

impl LoaderCallVisitor<'_> {
    fn is_lazy_helper(&self, callee: &Expr) -> bool {
        let name = match callee {
            Expr::Ident(ident) => &*ident.sym,
            Expr::Member(member) => match &member.prop {
                MemberProp::Ident(prop) => &*prop.sym,
                _ => return false,
            },
            _ => return false,
        };
        self.lazy_helpers.iter().any(|helper| helper == name)
    }
}

impl Visit for LoaderCallVisitor<'_> {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        if let Callee::Expr(callee) = &call.callee {
            if let Expr::Ident(ident) = &**callee
                && &*ident.sym == "require"
                && let Some(first) = call.args.first()
                && let Some(specifier) = literal_specifier(self.module, &first.expr)
            {
                self.calls.push(LoaderCall {
                    kind: LoaderKind::Require,
                    specifier,
                    span: call.span,
                });
            } else if self.is_lazy_helper(callee) {
                let mut imports = DynamicImports {
                    module: self.module,
                    found: Vec::new(),
                };
                call.args.visit_with(&mut imports);
                self.calls
                    .extend(imports.found.into_iter().map(|(specifier, span)| LoaderCall {
                        kind: LoaderKind::Lazy,
                        specifier,
                        span,
                    }));
            }
        }
        call.visit_children_with(self);
    }
}

/// Dynamic `import()` calls anywhere below a lazy helper call
struct DynamicImports<'a> {
    module: &'a SourceModule,
    found: Vec<(String, Span)>,
}

impl Visit for DynamicImports<'_> {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        if matches!(call.callee, Callee::Import(_))
            && let Some(first) = call.args.first()
            && let Some(specifier) = literal_specifier(self.module, &first.expr)
        {
            self.found.push((specifier, call.span));
        }
        call.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn loader_calls(source: &str) -> Vec<(LoaderKind, String)> {
        let module = SourceModule::parse(PathBuf::from("/project/src/App.tsx"), source.to_owned())
            .expect("module should parse");
        collect_loader_calls(&module, &["lazy".to_owned()])
            .into_iter()
            .map(|call| (call.kind, call.specifier))
            .collect()
    }

    #[test]
    fn test_require_and_lazy_targets() {
        let calls = loader_calls(
            r#"
import React, { lazy } from 'react';
const config = require('./config');
const Video = lazy(() => import('./Video'));
const Player = React.lazy(async () => {
  const mod = await import('./Player');
  return mod;
});
"#,
        );
        assert_eq!(
            calls,
            vec![
                (LoaderKind::Require, "./config".to_owned()),
                (LoaderKind::Lazy, "./Video".to_owned()),
                (LoaderKind::Lazy, "./Player".to_owned()),
            ]
        );
    }

    #[test]
    fn test_plain_dynamic_import_is_not_a_loader_call() {
        let calls = loader_calls("const load = () => import('./Chart');\n");
        assert!(calls.is_empty());
    }

    #[test]
    fn test_unknown_helper_is_ignored() {
        let calls = loader_calls("const A = loadable(() => import('./A'));\n");
        assert!(calls.is_empty());
    }
}
