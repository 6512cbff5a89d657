//! Import/export statements and the records rewritten inside declarations.
//!
//! Parsers (see `isodecl-oxc`) lower their AST to [`ModuleStatement`]s; this
//! module filters them down to what rewriting and dependency walking need.

use serde::Serialize;

/// Kind of a top-level statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// `import ... from '...'` or `import '...'`
    Import,
    /// `export * from '...'`
    ExportAll,
    /// `export { ... }`, with or without `from`
    ExportNamed,
    /// Anything else.
    Other,
}

/// Whether an import/export binding carries a value or only a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Value,
    Type,
}

/// String literal naming a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLiteral {
    /// Unquoted value.
    pub value: String,
    /// Byte offset of the opening quote.
    pub start: usize,
    /// Byte offset just past the closing quote.
    pub end: usize,
}

/// One top-level statement of a parsed module body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleStatement {
    pub kind: StatementKind,
    /// Module the statement imports from or re-exports.
    pub source: Option<SourceLiteral>,
    /// Statement-level `import type` / `export type`.
    pub type_only: bool,
    /// Kinds of the named bindings. `None` for side-effect imports and
    /// `export *`. Default and namespace imports count as [`ImportKind::Value`].
    pub specifiers: Option<Vec<ImportKind>>,
}

impl ModuleStatement {
    /// Import or export that names a source module.
    pub fn references_module(&self) -> bool {
        self.kind != StatementKind::Other && self.source.is_some()
    }

    /// Whether the statement exists only for types: marked `type` as a whole,
    /// or every named binding is `type`.
    pub fn is_type_only(&self) -> bool {
        match self.kind {
            StatementKind::Import | StatementKind::ExportNamed => {
                self.type_only
                    || self
                        .specifiers
                        .as_ref()
                        .is_some_and(|kinds| kinds.iter().all(|k| *k == ImportKind::Type))
            }
            StatementKind::ExportAll => self.type_only,
            StatementKind::Other => false,
        }
    }
}

/// A rewritable reference inside a declaration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    /// Specifier text currently visible in the buffer.
    pub specifier: String,
    /// Byte offset of the specifier content (after the opening quote).
    pub start: usize,
    /// Byte offset just past the specifier content (before the closing quote).
    pub end: usize,
    pub type_only: bool,
    /// Value before a rewrite hook replaced the visible text; used for
    /// resolution.
    pub original: Option<String>,
    /// Canonical target returned by the module resolver.
    pub resolved: Option<String>,
    /// Suffix appended before any extension, e.g. `/index`.
    pub suffix: Option<String>,
}

impl ImportRecord {
    /// Whether the visible specifier is relative (`./`, `../`, `.`).
    pub fn is_relative(&self) -> bool {
        self.specifier.starts_with('.')
    }

    /// Specifier to hand to the module resolver.
    pub fn lookup_specifier(&self) -> &str {
        self.original.as_deref().unwrap_or(&self.specifier)
    }
}

/// Collect the rewritable references of a module body, in source order.
pub fn collect_imports(statements: &[ModuleStatement]) -> Vec<ImportRecord> {
    statements
        .iter()
        .filter(|statement| statement.references_module())
        .filter_map(|statement| {
            let source = statement.source.as_ref()?;
            // Offsets exclude the quotes.
            if source.end < source.start + 2 {
                return None;
            }
            Some(ImportRecord {
                specifier: source.value.clone(),
                start: source.start + 1,
                end: source.end - 1,
                type_only: statement.is_type_only(),
                original: None,
                resolved: None,
                suffix: None,
            })
        })
        .collect()
}

/// Source literals of type-only imports/exports.
pub fn type_only_imports(statements: &[ModuleStatement]) -> Vec<&SourceLiteral> {
    statements
        .iter()
        .filter(|statement| statement.references_module() && statement.is_type_only())
        .filter_map(|statement| statement.source.as_ref())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(
        kind: StatementKind,
        source: Option<&str>,
        type_only: bool,
        specifiers: Option<Vec<ImportKind>>,
    ) -> ModuleStatement {
        ModuleStatement {
            kind,
            source: source.map(|value| SourceLiteral {
                value: value.to_string(),
                start: 10,
                end: 12 + value.len(),
            }),
            type_only,
            specifiers,
        }
    }

    #[test]
    fn test_collect_skips_statements_without_source() {
        let body = vec![
            statement(StatementKind::Import, Some("./a"), false, Some(vec![])),
            statement(StatementKind::ExportNamed, None, false, Some(vec![ImportKind::Value])),
            statement(StatementKind::Other, None, false, None),
            statement(StatementKind::ExportAll, Some("./b"), false, None),
        ];

        let records = collect_imports(&body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].specifier, "./a");
        assert_eq!(records[0].start, 11);
        assert_eq!(records[0].end, 14);
        assert_eq!(records[1].specifier, "./b");
    }

    #[test]
    fn test_type_only_detection() {
        use ImportKind::*;
        let whole = statement(StatementKind::Import, Some("./t"), true, Some(vec![Value]));
        let every = statement(StatementKind::Import, Some("./t"), false, Some(vec![Type, Type]));
        let mixed = statement(StatementKind::Import, Some("./t"), false, Some(vec![Type, Value]));
        let side_effect = statement(StatementKind::Import, Some("./t"), false, None);
        let export_all = statement(StatementKind::ExportAll, Some("./t"), false, None);
        let export_all_type = statement(StatementKind::ExportAll, Some("./t"), true, None);
        let export_named = statement(StatementKind::ExportNamed, Some("./t"), false, Some(vec![Type]));

        assert!(whole.is_type_only());
        assert!(every.is_type_only());
        assert!(!mixed.is_type_only());
        assert!(!side_effect.is_type_only());
        assert!(!export_all.is_type_only());
        assert!(export_all_type.is_type_only());
        assert!(export_named.is_type_only());
    }

    #[test]
    fn test_type_only_imports_filters_sources() {
        use ImportKind::*;
        let body = vec![
            statement(StatementKind::Import, Some("./types"), true, Some(vec![Value])),
            statement(StatementKind::Import, Some("./runtime"), false, Some(vec![Value])),
            statement(StatementKind::ExportNamed, None, true, Some(vec![Type])),
        ];

        let sources: Vec<_> = type_only_imports(&body)
            .into_iter()
            .map(|s| s.value.as_str())
            .collect();
        assert_eq!(sources, vec!["./types"]);
    }

    #[test]
    fn test_lookup_prefers_original() {
        let mut record = collect_imports(&[statement(
            StatementKind::Import,
            Some("./foo"),
            false,
            None,
        )])
        .remove(0);
        assert_eq!(record.lookup_specifier(), "./foo");

        record.original = Some("~/foo".to_string());
        assert_eq!(record.lookup_specifier(), "~/foo");
        assert!(record.is_relative());
    }
}
