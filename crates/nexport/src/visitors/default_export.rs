//! Default export detection.
//!
//! Classifies the default export of a module into the shapes the migration knows how to
//! handle: a default bound to a local top-level declaration, a default forwarding an
//! imported binding, a default re-exported from another module, or something that is
//! left alone (inline expressions, anonymous declarations, several candidates).

use std::ops::Range;

use rustc_hash::FxHashSet;
use swc_common::Span;
use swc_ecma_ast::{
    Decl, DefaultDecl, ExportSpecifier, Expr, ImportSpecifier, ModuleDecl, ModuleItem, Stmt,
    TsModuleName,
};

use super::{export_name, pattern_bindings};
use crate::source_module::SourceModule;

/// Shape of the statement that carries a default export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultForm {
    /// `export default X;`
    Expression { statement: Range<usize> },
    /// `export { X as default }`, optionally with a `from` clause
    Specifier {
        statement: Range<usize>,
        /// Ranges of every specifier in the statement's list
        specifiers: Vec<Range<usize>>,
        /// Position of the default specifier in `specifiers`
        index: usize,
    },
    /// `export default function X() {}`, `export default class X {}` or an interface
    NamedDeclaration {
        statement: Range<usize>,
        /// The `export default ` keywords, including trailing whitespace
        keywords: Range<usize>,
    },
}

/// Top-level declaration of the name a default export refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalDeclaration {
    /// Offset where an `export ` keyword would be inserted
    pub start: usize,
    /// Whether the declaration is already a named export
    pub exported: bool,
}

/// Default export bound to an identifier declared in the same module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDefault {
    pub name: String,
    pub form: DefaultForm,
    pub declarations: Vec<LocalDeclaration>,
}

/// Default export forwarding a binding imported from another module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedDefault {
    pub name: String,
    pub form: DefaultForm,
    /// Specifier of the import that introduced `name`
    pub source: String,
}

/// `export { <name> as default } from '<source>'`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReexportedDefault {
    /// Name exported by the source module, `default` for `export { default } from`
    pub name: String,
    pub form: DefaultForm,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultExport {
    None,
    /// More than one statement exports a default
    Ambiguous { candidates: usize },
    /// Inline expression or anonymous declaration
    Inline,
    /// Identifier that no top-level declaration or import binds
    Unbound { name: String },
    Local(LocalDefault),
    Forwarded(ForwardedDefault),
    Reexported(ReexportedDefault),
}

enum Candidate {
    Inline,
    Ident { name: String, form: DefaultForm },
    Reexported(ReexportedDefault),
}

/// Classify the default export of `module`
pub fn analyze_default_export(module: &SourceModule) -> DefaultExport {
    let mut candidates = collect_candidates(module);
    if candidates.len() > 1 {
        return DefaultExport::Ambiguous {
            candidates: candidates.len(),
        };
    }
    let Some(candidate) = candidates.pop() else {
        return DefaultExport::None;
    };

    match candidate {
        Candidate::Inline => DefaultExport::Inline,
        Candidate::Reexported(reexported) => DefaultExport::Reexported(reexported),
        Candidate::Ident {
            name,
            form: form @ DefaultForm::NamedDeclaration { .. },
        } => DefaultExport::Local(LocalDefault {
            name,
            form,
            declarations: Vec::new(),
        }),
        Candidate::Ident { name, form } => {
            let declarations = find_declarations(module, &name);
            if !declarations.is_empty() {
                return DefaultExport::Local(LocalDefault {
                    name,
                    form,
                    declarations,
                });
            }
            match import_source(module, &name) {
                Some(source) => DefaultExport::Forwarded(ForwardedDefault { name, form, source }),
                None => DefaultExport::Unbound { name },
            }
        }
    }
}

/// Names a module exports under their own name, `default` excluded
pub fn exported_names(module: &SourceModule) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    for item in &module.ast().body {
        let ModuleItem::ModuleDecl(decl) = item else {
            continue;
        };
        match decl {
            ModuleDecl::ExportDecl(export) => names.extend(declared_names(&export.decl)),
            ModuleDecl::ExportNamed(export) => {
                for specifier in &export.specifiers {
                    let name = match specifier {
                        ExportSpecifier::Named(named) => {
                            export_name(module, named.exported.as_ref().unwrap_or(&named.orig))
                        }
                        ExportSpecifier::Namespace(namespace) => {
                            export_name(module, &namespace.name)
                        }
                        ExportSpecifier::Default(default) => default.exported.sym.to_string(),
                    };
                    names.insert(name);
                }
            }
            _ => {}
        }
    }
    names.remove("default");
    names
}

fn collect_candidates(module: &SourceModule) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for (index, item) in module.ast().body.iter().enumerate() {
        let ModuleItem::ModuleDecl(decl) = item else {
            continue;
        };
        match decl {
            ModuleDecl::ExportDefaultExpr(export) => {
                let statement = module.item_start(index)..module.range(export.span).end;
                candidates.push(match unwrap_parens(&export.expr) {
                    Expr::Ident(ident) => Candidate::Ident {
                        name: ident.sym.to_string(),
                        form: DefaultForm::Expression { statement },
                    },
                    _ => Candidate::Inline,
                });
            }
            ModuleDecl::ExportDefaultDecl(export) => {
                let name = match &export.decl {
                    DefaultDecl::Fn(function) => function.ident.as_ref().map(|id| &id.sym),
                    DefaultDecl::Class(class) => class.ident.as_ref().map(|id| &id.sym),
                    DefaultDecl::TsInterfaceDecl(interface) => Some(&interface.id.sym),
                };
                let statement = module.item_start(index)..module.range(export.span).end;
                match (name, default_keywords(module, &statement)) {
                    (Some(name), Some(keywords)) => candidates.push(Candidate::Ident {
                        name: name.to_string(),
                        form: DefaultForm::NamedDeclaration {
                            statement,
                            keywords,
                        },
                    }),
                    _ => candidates.push(Candidate::Inline),
                }
            }
            ModuleDecl::ExportNamed(export) => {
                let statement = module.item_start(index)..module.range(export.span).end;
                let specifiers: Vec<Range<usize>> = export
                    .specifiers
                    .iter()
                    .map(|specifier| module.range(specifier_span(specifier)))
                    .collect();
                for (position, specifier) in export.specifiers.iter().enumerate() {
                    let ExportSpecifier::Named(named) = specifier else {
                        continue;
                    };
                    let orig = export_name(module, &named.orig);
                    let exported = named
                        .exported
                        .as_ref()
                        .map_or_else(|| orig.clone(), |name| export_name(module, name));
                    if exported != "default" {
                        continue;
                    }
                    let form = DefaultForm::Specifier {
                        statement: statement.clone(),
                        specifiers: specifiers.clone(),
                        index: position,
                    };
                    candidates.push(match &export.src {
                        Some(src) => Candidate::Reexported(ReexportedDefault {
                            name: orig,
                            form,
                            source: module.string_value(src),
                        }),
                        None => Candidate::Ident { name: orig, form },
                    });
                }
            }
            _ => {}
        }
    }
    candidates
}

fn unwrap_parens(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_parens(&paren.expr),
        _ => expr,
    }
}

fn specifier_span(specifier: &ExportSpecifier) -> Span {
    match specifier {
        ExportSpecifier::Named(named) => named.span,
        ExportSpecifier::Namespace(namespace) => namespace.span,
        ExportSpecifier::Default(default) => default.exported.span,
    }
}

/// Range of `export default ` at the head of a default declaration statement
fn default_keywords(module: &SourceModule, statement: &Range<usize>) -> Option<Range<usize>> {
    let text = &module.source()[statement.clone()];
    let export_at = text.find("export")?;
    let after_export = &text[export_at + "export".len()..];
    let rest = after_export.trim_start().strip_prefix("default")?;
    let end = text.len() - rest.trim_start().len();
    Some(statement.start + export_at..statement.start + end)
}

fn declared_names(decl: &Decl) -> Vec<String> {
    match decl {
        Decl::Class(class) => vec![class.ident.sym.to_string()],
        Decl::Fn(function) => vec![function.ident.sym.to_string()],
        Decl::Var(var) => {
            let mut names = Vec::new();
            for declarator in &var.decls {
                pattern_bindings(&declarator.name, &mut names);
            }
            names
        }
        Decl::Using(using) => {
            let mut names = Vec::new();
            for declarator in &using.decls {
                pattern_bindings(&declarator.name, &mut names);
            }
            names
        }
        Decl::TsInterface(interface) => vec![interface.id.sym.to_string()],
        Decl::TsTypeAlias(alias) => vec![alias.id.sym.to_string()],
        Decl::TsEnum(enumeration) => vec![enumeration.id.sym.to_string()],
        Decl::TsModule(namespace) => match &namespace.id {
            TsModuleName::Ident(ident) => vec![ident.sym.to_string()],
            TsModuleName::Str(_) => Vec::new(),
        },
    }
}

/// Every top-level declaration of `name`; overloads and merged declarations yield several
fn find_declarations(module: &SourceModule, name: &str) -> Vec<LocalDeclaration> {
    let mut declarations = Vec::new();
    for (index, item) in module.ast().body.iter().enumerate() {
        let (decl, exported) = match item {
            ModuleItem::Stmt(Stmt::Decl(decl)) => (decl, false),
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => (&export.decl, true),
            _ => continue,
        };
        if !declared_names(decl).iter().any(|declared| declared == name) {
            continue;
        }
        let start = match decl {
            Decl::Class(class) if !class.class.decorators.is_empty() => {
                let last = class
                    .class
                    .decorators
                    .iter()
                    .map(|decorator| module.range(decorator.span).end)
                    .max()
                    .unwrap_or_default();
                module.next_token_start(last)
            }
            _ => module.item_start(index),
        };
        declarations.push(LocalDeclaration { start, exported });
    }
    declarations
}

/// Specifier of the import statement binding `name` locally
fn import_source(module: &SourceModule, name: &str) -> Option<String> {
    module.ast().body.iter().find_map(|item| {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
            return None;
        };
        import
            .specifiers
            .iter()
            .any(|specifier| {
                let local = match specifier {
                    ImportSpecifier::Named(named) => &named.local,
                    ImportSpecifier::Default(default) => &default.local,
                    ImportSpecifier::Namespace(namespace) => &namespace.local,
                };
                &*local.sym == name
            })
            .then(|| module.string_value(&import.src))
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn analyze(source: &str) -> (SourceModule, DefaultExport) {
        let module = SourceModule::parse(PathBuf::from("/project/src/Video.tsx"), source.to_owned())
            .expect("module should parse");
        let analysis = analyze_default_export(&module);
        (module, analysis)
    }

    #[test]
    fn test_default_bound_to_local_declaration() {
        let (module, analysis) = analyze("const Video = () => null;\n\nexport default Video;\n");
        let DefaultExport::Local(local) = analysis else {
            panic!("expected local default, got {analysis:?}");
        };
        assert_eq!(local.name, "Video");
        assert_eq!(local.declarations.len(), 1);
        assert_eq!(local.declarations[0].start, 0);
        assert!(!local.declarations[0].exported);
        let DefaultForm::Expression { statement } = local.form else {
            panic!("expected expression form");
        };
        assert_eq!(&module.source()[statement], "export default Video;");
    }

    #[test]
    fn test_default_of_already_exported_declaration() {
        let (_, analysis) = analyze("export function Video() {}\nexport default Video;\n");
        let DefaultExport::Local(local) = analysis else {
            panic!("expected local default, got {analysis:?}");
        };
        assert!(local.declarations[0].exported);
    }

    #[test]
    fn test_overloads_yield_every_declaration() {
        let (_, analysis) = analyze(
            "function parse(a: string): number;\nfunction parse(a: unknown) { return 1; }\nexport default parse;\n",
        );
        let DefaultExport::Local(local) = analysis else {
            panic!("expected local default, got {analysis:?}");
        };
        assert_eq!(local.declarations.len(), 2);
    }

    #[test]
    fn test_named_default_declaration_keywords() {
        let (module, analysis) = analyze("export default function Video() {\n  return null;\n}\n");
        let DefaultExport::Local(LocalDefault {
            name,
            form: DefaultForm::NamedDeclaration { keywords, .. },
            ..
        }) = analysis
        else {
            panic!("expected named declaration, got {analysis:?}");
        };
        assert_eq!(name, "Video");
        assert_eq!(&module.source()[keywords], "export default ");
    }

    #[test]
    fn test_local_specifier_default() {
        let (module, analysis) = analyze("class Video {}\nexport { Video as default, other };\nconst other = 1;\n");
        let DefaultExport::Local(LocalDefault {
            form: DefaultForm::Specifier {
                specifiers, index, ..
            },
            ..
        }) = analysis
        else {
            panic!("expected specifier form, got {analysis:?}");
        };
        assert_eq!(index, 0);
        assert_eq!(&module.source()[specifiers[0].clone()], "Video as default");
    }

    #[test]
    fn test_forwarded_import_binding() {
        let (_, analysis) = analyze("import Player from './Player';\nexport default Player;\n");
        let DefaultExport::Forwarded(forwarded) = analysis else {
            panic!("expected forwarded default, got {analysis:?}");
        };
        assert_eq!(forwarded.name, "Player");
        assert_eq!(forwarded.source, "./Player");
    }

    #[test]
    fn test_reexported_default() {
        let (_, analysis) = analyze("export { default } from './Button';\n");
        let DefaultExport::Reexported(reexported) = analysis else {
            panic!("expected re-export, got {analysis:?}");
        };
        assert_eq!(reexported.name, "default");
        assert_eq!(reexported.source, "./Button");
    }

    #[test]
    fn test_inline_and_anonymous_defaults() {
        assert_eq!(analyze("export default () => null;\n").1, DefaultExport::Inline);
        assert_eq!(analyze("export default class {}\n").1, DefaultExport::Inline);
        assert_eq!(
            analyze("export default window;\n").1,
            DefaultExport::Unbound {
                name: "window".to_owned()
            }
        );
    }

    #[test]
    fn test_multiple_candidates_are_ambiguous() {
        let (_, analysis) = analyze("const a = 1;\nexport { a as default };\nexport { default } from './b';\n");
        assert_eq!(analysis, DefaultExport::Ambiguous { candidates: 2 });
    }

    #[test]
    fn test_exported_names_excludes_default() {
        let module = SourceModule::parse(
            PathBuf::from("/project/src/index.ts"),
            "export const a = 1;\nconst b = 2;\nexport { b as c, b as default };\nexport * as ns from './x';\n"
                .to_owned(),
        )
        .expect("module should parse");
        let mut names: Vec<_> = exported_names(&module).into_iter().collect();
        names.sort();
        assert_eq!(names, vec!["a", "c", "ns"]);
    }
}
