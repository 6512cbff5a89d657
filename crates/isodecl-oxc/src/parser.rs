//! Module statements from oxc's AST.

use async_trait::async_trait;
use isodecl_core::{
    Error, ImportKind, ModuleParser, ModuleStatement, Result, SourceLiteral, StatementKind,
};
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ExportAllDeclaration, ExportNamedDeclaration, ImportDeclaration,
    ImportDeclarationSpecifier, ImportOrExportKind, Statement, StringLiteral,
};
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Parses sources and declarations with oxc.
///
/// Everything is parsed as a TypeScript module so that declaration text
/// produced for a `.js` or `.cjs` source still parses.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcParser;

impl OxcParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] with the first diagnostic.
    pub fn parse_statements(&self, id: &str, text: &str) -> Result<Vec<ModuleStatement>> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, text, source_type_for(id)).parse();

        if let Some(first) = ret.errors.first() {
            return Err(Error::Parse {
                id: id.to_string(),
                message: first.to_string(),
            });
        }
        if ret.panicked {
            return Err(Error::Parse {
                id: id.to_string(),
                message: "parser aborted".to_string(),
            });
        }

        Ok(ret.program.body.iter().map(lower_statement).collect())
    }
}

#[async_trait]
impl ModuleParser for OxcParser {
    async fn parse(&self, id: &str, text: &str) -> Result<Vec<ModuleStatement>> {
        self.parse_statements(id, text)
    }
}

/// TypeScript module source type, keeping JSX for `.tsx`/`.jsx` files.
pub(crate) fn source_type_for(id: &str) -> SourceType {
    SourceType::from_path(id)
        .unwrap_or_else(|_| SourceType::ts())
        .with_typescript(true)
        .with_module(true)
}

fn kind(kind: ImportOrExportKind) -> ImportKind {
    if kind.is_type() {
        ImportKind::Type
    } else {
        ImportKind::Value
    }
}

fn literal(source: &StringLiteral<'_>) -> SourceLiteral {
    SourceLiteral {
        value: source.value.to_string(),
        start: source.span.start as usize,
        end: source.span.end as usize,
    }
}

fn lower_statement(statement: &Statement<'_>) -> ModuleStatement {
    match statement {
        Statement::ImportDeclaration(decl) => lower_import(decl),
        Statement::ExportAllDeclaration(decl) => lower_export_all(decl),
        Statement::ExportNamedDeclaration(decl) => lower_export_named(decl),
        _ => ModuleStatement {
            kind: StatementKind::Other,
            source: None,
            type_only: false,
            specifiers: None,
        },
    }
}

fn lower_import(decl: &ImportDeclaration<'_>) -> ModuleStatement {
    let specifiers = decl.specifiers.as_ref().map(|specifiers| {
        specifiers
            .iter()
            .map(|specifier| match specifier {
                ImportDeclarationSpecifier::ImportSpecifier(named) => kind(named.import_kind),
                // Default and namespace bindings are always values.
                _ => ImportKind::Value,
            })
            .collect()
    });

    ModuleStatement {
        kind: StatementKind::Import,
        source: Some(literal(&decl.source)),
        type_only: decl.import_kind.is_type(),
        specifiers,
    }
}

fn lower_export_all(decl: &ExportAllDeclaration<'_>) -> ModuleStatement {
    ModuleStatement {
        kind: StatementKind::ExportAll,
        source: Some(literal(&decl.source)),
        type_only: decl.export_kind.is_type(),
        specifiers: None,
    }
}

fn lower_export_named(decl: &ExportNamedDeclaration<'_>) -> ModuleStatement {
    ModuleStatement {
        kind: StatementKind::ExportNamed,
        source: decl.source.as_ref().map(literal),
        type_only: decl.export_kind.is_type(),
        specifiers: Some(
            decl.specifiers
                .iter()
                .map(|specifier| kind(specifier.export_kind))
                .collect(),
        ),
    }
}
