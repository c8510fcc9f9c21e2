//! In-memory code model for a single JavaScript/TypeScript module.
//!
//! A [`SourceModule`] owns the current source text of a file together with its parsed
//! swc syntax tree. Mutations are applied as text edits and followed by a re-parse, so
//! the tree always reflects the text that will eventually be flushed to disk.

use std::{
    ffi::OsStr,
    ops::Range,
    path::{Path, PathBuf},
};

use anyhow::{Result, anyhow, bail};
use log::{debug, trace};
use swc_common::{FileName, SourceMap, Span, Spanned, sync::Lrc};
use swc_ecma_ast::{Module, Str};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax, lexer::Lexer};

use crate::edits::{TextEdit, apply_edits};

/// File extensions the code model knows how to parse
pub const SUPPORTED_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// A parsed module together with its current source text
#[derive(Debug)]
pub struct SourceModule {
    path: PathBuf,
    /// Text as it was read from disk, used to detect pending changes
    original: String,
    source: String,
    ast: Module,
    /// Position of the first byte of this file in the swc source map
    base: u32,
}

impl SourceModule {
    /// Parse `source` as the module stored at `path`
    pub fn parse(path: PathBuf, source: String) -> Result<Self> {
        let (ast, base) = parse_source(&path, &source)?;
        Ok(Self {
            path,
            original: source.clone(),
            source,
            ast,
            base,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Module {
        &self.ast
    }

    /// Whether the module has edits that are not yet flushed
    pub fn is_dirty(&self) -> bool {
        self.source != self.original
    }

    /// Byte range in the current source covered by `span`
    pub fn range(&self, span: Span) -> Range<usize> {
        let start = span.lo.0.saturating_sub(self.base) as usize;
        let end = span.hi.0.saturating_sub(self.base) as usize;
        start.min(self.source.len())..end.min(self.source.len())
    }

    /// Source text covered by `span`
    pub fn text(&self, span: Span) -> &str {
        &self.source[self.range(span)]
    }

    /// Value of a string literal, read from the source without its quotes
    pub fn string_value(&self, literal: &Str) -> String {
        let raw = self.text(literal.span);
        if raw.len() >= 2 {
            raw[1..raw.len() - 1].to_owned()
        } else {
            raw.to_owned()
        }
    }

    /// Offset of the first byte at or after `from` that is not whitespace or a comment
    pub fn next_token_start(&self, from: usize) -> usize {
        let bytes = self.source.as_bytes();
        let mut pos = from;
        while pos < bytes.len() {
            match bytes[pos] {
                b' ' | b'\t' | b'\n' | b'\r' => pos += 1,
                b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                    pos = self.source[pos..].find('\n').map_or(bytes.len(), |i| pos + i);
                }
                b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                    pos = self.source[pos + 2..]
                        .find("*/")
                        .map_or(bytes.len(), |i| pos + 2 + i + 2);
                }
                _ => break,
            }
        }
        pos
    }

    /// Offset where the top-level item at `index` starts, leading comments excluded
    pub fn item_start(&self, index: usize) -> usize {
        let previous_end = index
            .checked_sub(1)
            .and_then(|previous| self.ast.body.get(previous))
            .map_or(0, |item| self.range(item.span()).end);
        self.next_token_start(previous_end)
    }

    /// Apply `edits` to the source and re-parse.
    ///
    /// Returns the number of edits applied. When the edited text no longer parses the
    /// module is left as it was and an error is returned.
    pub fn apply(&mut self, edits: Vec<TextEdit>) -> Result<usize> {
        if edits.is_empty() {
            return Ok(0);
        }

        let (source, applied) = apply_edits(&self.source, edits);
        if applied == 0 {
            return Ok(0);
        }

        let (ast, base) = parse_source(&self.path, &source).map_err(|err| {
            anyhow!(
                "edits to {} produced unparsable output: {err}",
                self.path.display()
            )
        })?;
        trace!("Applied {applied} edits to {}", self.path.display());
        self.source = source;
        self.ast = ast;
        self.base = base;
        Ok(applied)
    }
}

/// Pick the parser syntax from the file extension
fn syntax_for(path: &Path) -> Syntax {
    let file_name = path.file_name().and_then(OsStr::to_str).unwrap_or_default();
    match path.extension().and_then(OsStr::to_str) {
        Some("ts" | "mts" | "cts") => Syntax::Typescript(TsSyntax {
            tsx: false,
            decorators: true,
            dts: file_name.ends_with(".d.ts"),
            ..Default::default()
        }),
        Some("tsx") => Syntax::Typescript(TsSyntax {
            tsx: true,
            decorators: true,
            ..Default::default()
        }),
        _ => Syntax::Es(EsSyntax {
            jsx: true,
            decorators: true,
            ..Default::default()
        }),
    }
}

fn parse_source(path: &Path, source: &str) -> Result<(Module, u32)> {
    let cm: Lrc<SourceMap> = Lrc::default();
    let fm = cm.new_source_file(FileName::Real(path.to_path_buf()).into(), source.to_owned());
    let lexer = Lexer::new(
        syntax_for(path),
        Default::default(),
        StringInput::from(&*fm),
        None,
    );
    let mut parser = Parser::new_from(lexer);
    let module = parser
        .parse_module()
        .map_err(|err| anyhow!("failed to parse {}: {:?}", path.display(), err))?;

    // Recoverable errors count as failures too
    let recovered = parser.take_errors();
    if let Some(first) = recovered.first() {
        debug!(
            "{} recoverable syntax errors in {}",
            recovered.len(),
            path.display()
        );
        bail!("failed to parse {}: {:?}", path.display(), first);
    }

    Ok((module, fm.start_pos.0))
}

#[cfg(test)]
mod tests {
    use swc_ecma_ast::{ModuleDecl, ModuleItem};

    use super::*;

    fn import_source(module: &SourceModule) -> String {
        match &module.ast().body[0] {
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => module.string_value(&import.src),
            other => panic!("expected import, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_tsx_module() {
        let module = SourceModule::parse(
            PathBuf::from("/project/Video.tsx"),
            "import React from 'react';\nexport const Video = () => <div />;\n".to_owned(),
        )
        .expect("tsx should parse");
        assert_eq!(module.ast().body.len(), 2);
        assert_eq!(import_source(&module), "react");
        assert!(!module.is_dirty());
    }

    #[test]
    fn test_spans_map_to_source_text() {
        let module = SourceModule::parse(
            PathBuf::from("/project/a.ts"),
            "// header\nimport Foo from \"./foo\";\n".to_owned(),
        )
        .expect("module should parse");
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = &module.ast().body[0] else {
            panic!("expected import");
        };
        assert_eq!(module.text(import.span), "import Foo from \"./foo\";");
        assert_eq!(module.string_value(&import.src), "./foo");
    }

    #[test]
    fn test_apply_reparses_module() {
        let mut module = SourceModule::parse(
            PathBuf::from("/project/a.ts"),
            "import Foo from './foo';\n".to_owned(),
        )
        .expect("module should parse");
        let applied = module
            .apply(vec![TextEdit::replace(7..10, "{ Foo }")])
            .expect("edit keeps module valid");
        assert_eq!(applied, 1);
        assert!(module.is_dirty());
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = &module.ast().body[0] else {
            panic!("expected import");
        };
        assert_eq!(module.text(import.span), "import { Foo } from './foo';");
    }

    #[test]
    fn test_apply_rejects_broken_output() {
        let mut module = SourceModule::parse(
            PathBuf::from("/project/a.ts"),
            "const a = 1;\n".to_owned(),
        )
        .expect("module should parse");
        assert!(module.apply(vec![TextEdit::insert(0, "export export ")]).is_err());
        assert_eq!(module.source(), "const a = 1;\n");
    }

    #[test]
    fn test_item_start_skips_comments() {
        let module = SourceModule::parse(
            PathBuf::from("/project/a.ts"),
            "import a from './a';\n/** docs */\n// more\ndeclare const b: number;\n".to_owned(),
        )
        .expect("module should parse");
        let start = module.item_start(1);
        assert!(module.source()[start..].starts_with("declare const b"));
        assert_eq!(module.item_start(0), 0);
    }

    #[test]
    fn test_plain_javascript_accepts_jsx() {
        let module = SourceModule::parse(
            PathBuf::from("/project/App.js"),
            "const App = () => <main />;\nexport default App;\n".to_owned(),
        );
        assert!(module.is_ok());
    }
}
