//! Rewrites test mock factories that still provide a `default` key.
//!
//! `jest.mock('./Video', () => ({ default: Fake }))` stops matching once `Video.tsx`
//! exports `Video` by name, so the key is renamed to the canonical name. Factories that
//! return the mocked value directly are wrapped in an object keyed by that name.

use log::{debug, info, warn};
use swc_common::Spanned;
use swc_ecma_ast::{
    ArrowExpr, BlockStmtOrExpr, Class, Expr, Function, ObjectLit, Prop, PropName, PropOrSpread,
    ReturnStmt,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::{
    edits::TextEdit,
    module_set::ModuleSet,
    registry::CanonicalExportRegistry,
    resolver::ModuleResolver,
    source_module::SourceModule,
    visitors::collect_mock_calls,
};

/// Fix mock factories in every module; returns the number of edits applied
pub fn fix_mock_calls(
    modules: &mut ModuleSet,
    resolver: &mut ModuleResolver,
    registry: &CanonicalExportRegistry,
    namespaces: &[String],
) -> usize {
    let mut fixed = 0;
    for index in 0..modules.len() {
        let module = modules.module(index);
        let mut edits = Vec::new();
        for call in collect_mock_calls(module, namespaces) {
            let Some(canonical) = resolver
                .resolve(&call.specifier, module.path())
                .and_then(|path| registry.canonical_name(&path))
            else {
                continue;
            };
            debug!(
                "{}: mock of '{}' now provides '{canonical}'",
                module.path().display(),
                call.specifier
            );
            edits.extend(factory_edits(module, &call.factory, canonical));
        }
        if edits.is_empty() {
            continue;
        }

        let module = modules.module_mut(index);
        match module.apply(edits) {
            Ok(applied) => fixed += applied,
            Err(err) => warn!("Leaving mocks in {} unchanged: {err:#}", module.path().display()),
        }
    }
    info!("Fixed {fixed} mock factory sites");
    fixed
}

/// Edits making a mock factory provide `canonical` instead of `default`
fn factory_edits(module: &SourceModule, factory: &Expr, canonical: &str) -> Vec<TextEdit> {
    match unwrap_parens(factory) {
        Expr::Arrow(ArrowExpr { body, .. }) => match &**body {
            BlockStmtOrExpr::Expr(expr) => match unwrap_parens(expr) {
                Expr::Object(object) => rename_default_keys(module, object, canonical),
                _ => {
                    let range = module.range(expr.span());
                    let text = &module.source()[range.clone()];
                    vec![TextEdit::replace(range, format!("({{ {canonical}: {text} }})"))]
                }
            },
            BlockStmtOrExpr::BlockStmt(block) => {
                let mut returns = FactoryReturns::default();
                block.visit_with(&mut returns);
                returned_value_edits(module, &returns.values, canonical)
            }
        },
        Expr::Fn(function) => {
            let mut returns = FactoryReturns::default();
            function.function.body.visit_with(&mut returns);
            returned_value_edits(module, &returns.values, canonical)
        }
        _ => Vec::new(),
    }
}

fn returned_value_edits(module: &SourceModule, values: &[Box<Expr>], canonical: &str) -> Vec<TextEdit> {
    let mut edits = Vec::new();
    for value in values {
        match unwrap_parens(value) {
            Expr::Object(object) => edits.extend(rename_default_keys(module, object, canonical)),
            Expr::Arrow(_) | Expr::Fn(_) => {
                let range = module.range(value.span());
                let text = &module.source()[range.clone()];
                edits.push(TextEdit::replace(range, format!("{{ {canonical}: {text} }}")));
            }
            _ => {}
        }
    }
    edits
}

/// Rename `default` keys of an object literal unless it already has a `canonical` key
fn rename_default_keys(module: &SourceModule, object: &ObjectLit, canonical: &str) -> Vec<TextEdit> {
    let keys: Vec<(&PropName, String)> = object
        .props
        .iter()
        .filter_map(|prop| match prop {
            PropOrSpread::Prop(prop) => prop_key(prop),
            PropOrSpread::Spread(_) => None,
        })
        .map(|key| (key, key_name(module, key)))
        .collect();

    if keys.iter().any(|(_, name)| name == canonical) {
        debug!("Mock factory already provides '{canonical}'");
        return Vec::new();
    }
    keys.into_iter()
        .filter(|(_, name)| name == "default")
        .map(|(key, _)| TextEdit::replace(module.range(key.span()), canonical))
        .collect()
}

fn prop_key(prop: &Prop) -> Option<&PropName> {
    match prop {
        Prop::KeyValue(key_value) => Some(&key_value.key),
        Prop::Method(method) => Some(&method.key),
        Prop::Getter(getter) => Some(&getter.key),
        Prop::Setter(setter) => Some(&setter.key),
        Prop::Shorthand(_) | Prop::Assign(_) => None,
    }
}

fn key_name(module: &SourceModule, key: &PropName) -> String {
    match key {
        PropName::Ident(ident) => ident.sym.to_string(),
        PropName::Str(literal) => module.string_value(literal),
        _ => String::new(),
    }
}

fn unwrap_parens(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_parens(&paren.expr),
        _ => expr,
    }
}

/// Values returned by a factory body, nested functions and classes excluded
#[derive(Default)]
struct FactoryReturns {
    values: Vec<Box<Expr>>,
}

impl Visit for FactoryReturns {
    fn visit_return_stmt(&mut self, stmt: &ReturnStmt) {
        if let Some(arg) = &stmt.arg {
            self.values.push(arg.clone());
        }
    }

    fn visit_function(&mut self, _: &Function) {}

    fn visit_arrow_expr(&mut self, _: &ArrowExpr) {}

    fn visit_class(&mut self, _: &Class) {}
}
