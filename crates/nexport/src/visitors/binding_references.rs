//! Scope-aware reference search for renaming a module-level binding.
//!
//! The walker keeps a stack of lexical scopes, each recording whether it declares the
//! binding being renamed or the name it is renamed to. An identifier refers to the
//! module-level binding only when no enclosing scope redeclares it.

use rustc_hash::FxHashSet;
use swc_common::Span;
use swc_ecma_ast::{
    ArrowExpr, BlockStmt, BlockStmtOrExpr, BreakStmt, CatchClause, Class, ClassExpr, Constructor,
    ContinueStmt, Decl, DefaultDecl, ExportSpecifier, FnExpr, ForHead, ForInStmt, ForOfStmt,
    ForStmt, Function, GetterProp, Ident, ImportDecl, ImportSpecifier, JSXElementName, LabeledStmt,
    Module, ModuleDecl, ModuleExportName, ModuleItem, NamedExport, ParamOrTsParamProp, Prop,
    SetterProp, Stmt, SwitchStmt, TsCallSignatureDecl, TsConstructSignatureDecl,
    TsConstructorType, TsEnumMember, TsFnType, TsGetterSignature, TsInterfaceDecl,
    TsMethodSignature, TsModuleName, TsParamPropParam, TsPropertySignature, TsSetterSignature,
    TsTypeAliasDecl, TsTypeParam, TsTypeParamDecl, VarDecl, VarDeclKind, VarDeclOrExpr,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::pattern_bindings;

/// A place in the source that must change when a binding is renamed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameSite {
    /// Plain identifier reference
    Reference(Span),
    /// Shorthand object property `{ Local }`, which must keep its key
    Shorthand(Span),
    /// `Local` in a local export specifier; `aliased` when written `Local as X`
    LocalExport { span: Span, aliased: bool },
}

/// Every site of a module-level binding, and whether renaming it would change meaning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenamePlan {
    pub sites: Vec<RenameSite>,
    /// The new name is declared in a nested scope that encloses a reference
    pub captured: bool,
    /// The new name is used somewhere without a binding in scope
    pub free_use: bool,
    /// The new name is already bound at module level
    pub shadows_module_binding: bool,
}

impl RenamePlan {
    pub fn is_safe(&self) -> bool {
        !(self.captured || self.free_use || self.shadows_module_binding)
    }
}

/// Find every reference to the module-level binding `local` and check that renaming it
/// to `target` keeps each reference pointing at the same binding.
///
/// Import specifiers and re-exports with a `from` clause are not reported; the caller
/// rewrites those statements itself.
pub fn plan_rename(module: &Module, local: &str, target: &str) -> RenamePlan {
    let module_scope = top_level_bindings(module);
    let mut walker = ReferenceWalker {
        local,
        target,
        scopes: Vec::new(),
        plan: RenamePlan {
            shadows_module_binding: module_scope.contains(target),
            ..RenamePlan::default()
        },
        target_at_module_level: module_scope.contains(target),
    };
    module.visit_with(&mut walker);
    walker.plan
}

/// Names bound at module level: imports, top-level declarations and hoisted `var`s
pub fn top_level_bindings(module: &Module) -> FxHashSet<String> {
    let mut names = Vec::new();
    for item in &module.body {
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                names.extend(import.specifiers.iter().map(|specifier| match specifier {
                    ImportSpecifier::Named(named) => named.local.sym.to_string(),
                    ImportSpecifier::Default(default) => default.local.sym.to_string(),
                    ImportSpecifier::Namespace(namespace) => namespace.local.sym.to_string(),
                }));
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                lexical_decl_bindings(&export.decl, &mut names);
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => {
                let ident = match &export.decl {
                    DefaultDecl::Class(class) => class.ident.as_ref(),
                    DefaultDecl::Fn(function) => function.ident.as_ref(),
                    DefaultDecl::TsInterfaceDecl(interface) => Some(&interface.id),
                };
                names.extend(ident.map(|ident| ident.sym.to_string()));
            }
            ModuleItem::ModuleDecl(ModuleDecl::TsImportEquals(import)) => {
                names.push(import.id.sym.to_string());
            }
            ModuleItem::Stmt(Stmt::Decl(decl)) => lexical_decl_bindings(decl, &mut names),
            _ => {}
        }
    }
    let mut hoisted = HoistedVars::default();
    module.visit_with(&mut hoisted);
    names.extend(hoisted.names);
    names.into_iter().collect()
}

#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    declares_local: bool,
    declares_target: bool,
}

struct ReferenceWalker<'a> {
    local: &'a str,
    target: &'a str,
    scopes: Vec<Scope>,
    plan: RenamePlan,
    target_at_module_level: bool,
}

impl ReferenceWalker<'_> {
    fn scope_of(&self, names: &[String]) -> Scope {
        Scope {
            declares_local: names.iter().any(|name| name == self.local),
            declares_target: names.iter().any(|name| name == self.target),
        }
    }

    fn with_scope(&mut self, names: &[String], visit: impl FnOnce(&mut Self)) {
        let scope = self.scope_of(names);
        self.scopes.push(scope);
        visit(self);
        self.scopes.pop();
    }

    fn local_is_shadowed(&self) -> bool {
        self.scopes.iter().any(|scope| scope.declares_local)
    }

    fn target_in_scope(&self) -> bool {
        self.target_at_module_level || self.scopes.iter().any(|scope| scope.declares_target)
    }

    /// Record a reference to `ident`; returns whether it refers to the renamed binding
    fn reference(&mut self, ident: &Ident) -> bool {
        let name = &*ident.sym;
        if name == self.local && !self.local_is_shadowed() {
            if self.scopes.iter().any(|scope| scope.declares_target) {
                self.plan.captured = true;
            }
            return true;
        }
        if name == self.target && name != self.local && !self.target_in_scope() {
            self.plan.free_use = true;
        }
        false
    }
}

impl Visit for ReferenceWalker<'_> {
    fn visit_import_decl(&mut self, _: &ImportDecl) {}

    fn visit_named_export(&mut self, export: &NamedExport) {
        if export.src.is_some() {
            return;
        }
        for specifier in &export.specifiers {
            if let ExportSpecifier::Named(named) = specifier
                && let ModuleExportName::Ident(orig) = &named.orig
                && self.reference(orig)
            {
                self.plan.sites.push(RenameSite::LocalExport {
                    span: orig.span,
                    aliased: named.exported.is_some(),
                });
            }
        }
    }

    fn visit_ident(&mut self, ident: &Ident) {
        if self.reference(ident) {
            self.plan.sites.push(RenameSite::Reference(ident.span));
        }
    }

    fn visit_prop(&mut self, prop: &Prop) {
        if let Prop::Shorthand(ident) = prop {
            if self.reference(ident) {
                self.plan.sites.push(RenameSite::Shorthand(ident.span));
            }
            return;
        }
        prop.visit_children_with(self);
    }

    fn visit_jsx_element_name(&mut self, name: &JSXElementName) {
        // Lowercase tags are intrinsic elements, not references
        if let JSXElementName::Ident(ident) = name
            && ident.sym.starts_with(|c: char| c.is_ascii_lowercase())
        {
            return;
        }
        name.visit_children_with(self);
    }

    fn visit_labeled_stmt(&mut self, stmt: &LabeledStmt) {
        stmt.body.visit_with(self);
    }

    fn visit_break_stmt(&mut self, _: &BreakStmt) {}

    fn visit_continue_stmt(&mut self, _: &ContinueStmt) {}

    fn visit_ts_enum_member(&mut self, member: &TsEnumMember) {
        member.init.visit_with(self);
    }

    fn visit_ts_property_signature(&mut self, signature: &TsPropertySignature) {
        if signature.computed {
            signature.key.visit_with(self);
        }
        signature.type_ann.visit_with(self);
    }

    fn visit_ts_method_signature(&mut self, signature: &TsMethodSignature) {
        if signature.computed {
            signature.key.visit_with(self);
        }
        let names = type_param_names(signature.type_params.as_deref());
        self.with_scope(&names, |walker| {
            signature.type_params.visit_with(walker);
            signature.params.visit_with(walker);
            signature.type_ann.visit_with(walker);
        });
    }

    fn visit_ts_getter_signature(&mut self, signature: &TsGetterSignature) {
        if signature.computed {
            signature.key.visit_with(self);
        }
        signature.type_ann.visit_with(self);
    }

    fn visit_ts_setter_signature(&mut self, signature: &TsSetterSignature) {
        if signature.computed {
            signature.key.visit_with(self);
        }
        signature.param.visit_with(self);
    }

    fn visit_ts_type_param(&mut self, param: &TsTypeParam) {
        param.constraint.visit_with(self);
        param.default.visit_with(self);
    }

    fn visit_ts_type_alias_decl(&mut self, alias: &TsTypeAliasDecl) {
        let names = type_param_names(alias.type_params.as_deref());
        self.with_scope(&names, |walker| alias.visit_children_with(walker));
    }

    fn visit_ts_interface_decl(&mut self, interface: &TsInterfaceDecl) {
        let names = type_param_names(interface.type_params.as_deref());
        self.with_scope(&names, |walker| interface.visit_children_with(walker));
    }

    fn visit_ts_fn_type(&mut self, function: &TsFnType) {
        let names = type_param_names(function.type_params.as_deref());
        self.with_scope(&names, |walker| function.visit_children_with(walker));
    }

    fn visit_ts_constructor_type(&mut self, constructor: &TsConstructorType) {
        let names = type_param_names(constructor.type_params.as_deref());
        self.with_scope(&names, |walker| constructor.visit_children_with(walker));
    }

    fn visit_ts_call_signature_decl(&mut self, signature: &TsCallSignatureDecl) {
        let names = type_param_names(signature.type_params.as_deref());
        self.with_scope(&names, |walker| signature.visit_children_with(walker));
    }

    fn visit_ts_construct_signature_decl(&mut self, signature: &TsConstructSignatureDecl) {
        let names = type_param_names(signature.type_params.as_deref());
        self.with_scope(&names, |walker| signature.visit_children_with(walker));
    }

    fn visit_class(&mut self, class: &Class) {
        let names = type_param_names(class.type_params.as_deref());
        self.with_scope(&names, |walker| class.visit_children_with(walker));
    }

    fn visit_function(&mut self, function: &Function) {
        let mut names = type_param_names(function.type_params.as_deref());
        for param in &function.params {
            pattern_bindings(&param.pat, &mut names);
        }
        if let Some(body) = &function.body {
            names.extend(hoisted_in(body));
        }
        self.with_scope(&names, |walker| function.visit_children_with(walker));
    }

    fn visit_arrow_expr(&mut self, arrow: &ArrowExpr) {
        let mut names = type_param_names(arrow.type_params.as_deref());
        for param in &arrow.params {
            pattern_bindings(param, &mut names);
        }
        if let BlockStmtOrExpr::BlockStmt(body) = &*arrow.body {
            names.extend(hoisted_in(body));
        }
        self.with_scope(&names, |walker| arrow.visit_children_with(walker));
    }

    fn visit_constructor(&mut self, constructor: &Constructor) {
        let mut names = Vec::new();
        for param in &constructor.params {
            match param {
                ParamOrTsParamProp::Param(param) => pattern_bindings(&param.pat, &mut names),
                ParamOrTsParamProp::TsParamProp(prop) => match &prop.param {
                    TsParamPropParam::Ident(ident) => names.push(ident.id.sym.to_string()),
                    TsParamPropParam::Assign(assign) => pattern_bindings(&assign.left, &mut names),
                },
            }
        }
        if let Some(body) = &constructor.body {
            names.extend(hoisted_in(body));
        }
        self.with_scope(&names, |walker| constructor.visit_children_with(walker));
    }

    fn visit_getter_prop(&mut self, getter: &GetterProp) {
        let names = getter.body.as_ref().map(hoisted_in).unwrap_or_default();
        self.with_scope(&names, |walker| getter.visit_children_with(walker));
    }

    fn visit_setter_prop(&mut self, setter: &SetterProp) {
        let mut names = Vec::new();
        pattern_bindings(&setter.param, &mut names);
        if let Some(body) = &setter.body {
            names.extend(hoisted_in(body));
        }
        self.with_scope(&names, |walker| setter.visit_children_with(walker));
    }

    fn visit_fn_expr(&mut self, function: &FnExpr) {
        let names: Vec<String> = function.ident.iter().map(|id| id.sym.to_string()).collect();
        self.with_scope(&names, |walker| function.function.visit_with(walker));
    }

    fn visit_class_expr(&mut self, class: &ClassExpr) {
        let names: Vec<String> = class.ident.iter().map(|id| id.sym.to_string()).collect();
        self.with_scope(&names, |walker| class.class.visit_with(walker));
    }

    fn visit_block_stmt(&mut self, block: &BlockStmt) {
        let names = lexical_bindings(&block.stmts);
        self.with_scope(&names, |walker| block.visit_children_with(walker));
    }

    fn visit_switch_stmt(&mut self, switch: &SwitchStmt) {
        switch.discriminant.visit_with(self);
        let names: Vec<String> = switch
            .cases
            .iter()
            .flat_map(|case| lexical_bindings(&case.cons))
            .collect();
        self.with_scope(&names, |walker| switch.cases.visit_with(walker));
    }

    fn visit_catch_clause(&mut self, clause: &CatchClause) {
        let mut names = Vec::new();
        if let Some(param) = &clause.param {
            pattern_bindings(param, &mut names);
        }
        self.with_scope(&names, |walker| clause.visit_children_with(walker));
    }

    fn visit_for_stmt(&mut self, stmt: &ForStmt) {
        let mut names = Vec::new();
        if let Some(VarDeclOrExpr::VarDecl(var)) = &stmt.init {
            var_bindings(var, &mut names);
        }
        self.with_scope(&names, |walker| stmt.visit_children_with(walker));
    }

    fn visit_for_in_stmt(&mut self, stmt: &ForInStmt) {
        let names = for_head_bindings(&stmt.left);
        self.with_scope(&names, |walker| stmt.visit_children_with(walker));
    }

    fn visit_for_of_stmt(&mut self, stmt: &ForOfStmt) {
        let names = for_head_bindings(&stmt.left);
        self.with_scope(&names, |walker| stmt.visit_children_with(walker));
    }
}

/// Type parameters are bindings of the node that declares them
fn type_param_names(type_params: Option<&TsTypeParamDecl>) -> Vec<String> {
    type_params
        .map(|decl| decl.params.iter().map(|param| param.name.sym.to_string()).collect())
        .unwrap_or_default()
}

fn var_bindings(var: &VarDecl, out: &mut Vec<String>) {
    for declarator in &var.decls {
        pattern_bindings(&declarator.name, out);
    }
}

fn for_head_bindings(head: &ForHead) -> Vec<String> {
    let mut names = Vec::new();
    match head {
        ForHead::VarDecl(var) => var_bindings(var, &mut names),
        ForHead::UsingDecl(using) => {
            for declarator in &using.decls {
                pattern_bindings(&declarator.name, &mut names);
            }
        }
        ForHead::Pat(_) => {}
    }
    names
}

/// Names a declaration binds in the scope it appears in
fn lexical_decl_bindings(decl: &Decl, out: &mut Vec<String>) {
    match decl {
        Decl::Class(class) => out.push(class.ident.sym.to_string()),
        Decl::Fn(function) => out.push(function.ident.sym.to_string()),
        Decl::Var(var) => var_bindings(var, out),
        Decl::Using(using) => {
            for declarator in &using.decls {
                pattern_bindings(&declarator.name, out);
            }
        }
        Decl::TsInterface(interface) => out.push(interface.id.sym.to_string()),
        Decl::TsTypeAlias(alias) => out.push(alias.id.sym.to_string()),
        Decl::TsEnum(enumeration) => out.push(enumeration.id.sym.to_string()),
        Decl::TsModule(namespace) => {
            if let TsModuleName::Ident(ident) = &namespace.id {
                out.push(ident.sym.to_string());
            }
        }
    }
}

fn lexical_bindings(stmts: &[Stmt]) -> Vec<String> {
    let mut names = Vec::new();
    for stmt in stmts {
        if let Stmt::Decl(decl) = stmt {
            match decl {
                Decl::Var(var) if var.kind == VarDeclKind::Var => {}
                _ => lexical_decl_bindings(decl, &mut names),
            }
        }
    }
    names
}

/// `var` declarations hoisted to the function whose body is `body`
fn hoisted_in(body: &BlockStmt) -> Vec<String> {
    let mut hoisted = HoistedVars::default();
    body.visit_children_with(&mut hoisted);
    hoisted.names
}

/// Collects `var` bindings without descending into nested functions
#[derive(Default)]
struct HoistedVars {
    names: Vec<String>,
}

impl Visit for HoistedVars {
    fn visit_var_decl(&mut self, var: &VarDecl) {
        if var.kind == VarDeclKind::Var {
            let mut names = Vec::new();
            var_bindings(var, &mut names);
            self.names.append(&mut names);
        }
    }

    fn visit_function(&mut self, _: &Function) {}

    fn visit_arrow_expr(&mut self, _: &ArrowExpr) {}

    fn visit_constructor(&mut self, _: &Constructor) {}

    fn visit_getter_prop(&mut self, _: &GetterProp) {}

    fn visit_setter_prop(&mut self, _: &SetterProp) {}

    // Static blocks scope their own `var`s
    fn visit_class(&mut self, _: &Class) {}
}
