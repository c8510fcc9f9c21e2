//! Test framework module mocks, e.g. `jest.mock('./Video', () => ...)`.

use swc_ecma_ast::{CallExpr, Callee, Expr, MemberProp};
use swc_ecma_visit::{Visit, VisitWith};

use super::literal_specifier;
use crate::source_module::SourceModule;

/// A `<namespace>.mock(<specifier>, <factory>)` call
#[derive(Debug, Clone)]
pub struct MockCall {
    pub specifier: String,
    pub factory: Box<Expr>,
}

/// Collect mock registrations made through any of `namespaces`
pub fn collect_mock_calls(module: &SourceModule, namespaces: &[String]) -> Vec<MockCall> {
    let mut visitor = MockCallVisitor {
        module,
        namespaces,
        calls: Vec::new(),
    };
    module.ast().visit_with(&mut visitor);
    visitor.calls
}

struct MockCallVisitor<'a> {
    module: &'a SourceModule,
    namespaces: &'a [String],
    calls: Vec<MockCall>,
}

impl MockCallVisitor<'_> {
    fn is_mock_callee(&self, callee: &Callee) -> bool {
        let Callee::Expr(callee) = callee else {
            return false;
        };
        let Expr::Member(member) = &**callee else {
            return false;
        };
        let (Expr::Ident(object), MemberProp::Ident(prop)) = (&*member.obj, &member.prop) else {
            return false;
        };
        &*prop.sym == "mock" && self.namespaces.iter().any(|ns| ns == &*object.sym)
    }
}

impl Visit for MockCallVisitor<'_> {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        if self.is_mock_callee(&call.callee)
            && let [path, factory, ..] = call.args.as_slice()
            && factory.spread.is_none()
            && let Some(specifier) = literal_specifier(self.module, &path.expr)
        {
            self.calls.push(MockCall {
                specifier,
                factory: factory.expr.clone(),
            });
        }
        call.visit_children_with(self);
    }
}
