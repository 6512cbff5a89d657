//! Line-oriented stand-ins for the oxc backend.

#![allow(dead_code)]

use async_trait::async_trait;
use isodecl_core::{
    paths, BuildSession, Collaborators, DeclarationTransformer, EmittedDeclaration,
    EntryResolution, Error, ImportKind, ModuleParser, ModuleResolver, ModuleStatement,
    OutputNamer, ResolvedModule, ResolvedOptions, Result, SourceLiteral, StatementKind,
    TransformResult,
};
use isodecl_fs::MemoryFileSystem;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Parses one import/export per line. Text containing `@@syntax-error`
/// fails to parse.
#[derive(Debug, Default)]
pub struct LineParser;

fn quoted(line: &str) -> Option<(usize, usize)> {
    let start = line.find(['"', '\''])?;
    let quote = line[start..].chars().next()?;
    let len = line[start + 1..].find(quote)?;
    Some((start, start + len + 2))
}

fn named_bindings(line: &str) -> Option<Vec<ImportKind>> {
    let open = line.find('{')?;
    let close = line[open..].find('}')? + open;
    Some(
        line[open + 1..close]
            .split(',')
            .map(str::trim)
            .filter(|binding| !binding.is_empty())
            .map(|binding| {
                if binding.starts_with("type ") {
                    ImportKind::Type
                } else {
                    ImportKind::Value
                }
            })
            .collect(),
    )
}

#[async_trait]
impl ModuleParser for LineParser {
    async fn parse(&self, id: &str, text: &str) -> Result<Vec<ModuleStatement>> {
        if text.contains("@@syntax-error") {
            return Err(Error::Parse {
                id: id.to_string(),
                message: "Unexpected token".to_string(),
            });
        }

        let mut statements = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            let trimmed = line.trim_start();
            let kind = if trimmed.starts_with("import ") {
                StatementKind::Import
            } else if trimmed.starts_with("export * ") {
                StatementKind::ExportAll
            } else if trimmed.starts_with("export {") || trimmed.starts_with("export type {") {
                StatementKind::ExportNamed
            } else {
                StatementKind::Other
            };

            if kind != StatementKind::Other {
                let has_from = line.contains(" from ");
                let source = if has_from || kind == StatementKind::Import {
                    quoted(line).map(|(start, end)| SourceLiteral {
                        value: line[start + 1..end - 1].to_string(),
                        start: offset + start,
                        end: offset + end,
                    })
                } else {
                    None
                };
                let specifiers = match kind {
                    StatementKind::ExportAll => None,
                    _ => named_bindings(line).or_else(|| has_from.then(|| vec![ImportKind::Value])),
                };
                statements.push(ModuleStatement {
                    kind,
                    source,
                    type_only: trimmed.starts_with("import type ")
                        || trimmed.starts_with("export type "),
                    specifiers,
                });
            } else {
                statements.push(ModuleStatement {
                    kind,
                    source: None,
                    type_only: false,
                    specifiers: None,
                });
            }
            offset += line.len();
        }
        Ok(statements)
    }
}

/// Returns canned declarations and counts calls per module.
#[derive(Debug, Default)]
pub struct FixtureTransformer {
    outputs: HashMap<String, TransformResult>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FixtureTransformer {
    pub fn with(mut self, id: &str, code: &str) -> Self {
        self.outputs.insert(
            id.to_string(),
            TransformResult {
                code: code.to_string(),
                ..TransformResult::default()
            },
        );
        self
    }

    pub fn with_result(mut self, id: &str, result: TransformResult) -> Self {
        self.outputs.insert(id.to_string(), result);
        self
    }

    pub fn calls(&self, id: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(id)
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DeclarationTransformer for FixtureTransformer {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn transform(&self, id: &str, _code: &str, source_map: bool) -> TransformResult {
        *self.calls.lock().unwrap().entry(id.to_string()).or_default() += 1;
        let mut result = self.outputs.get(id).cloned().unwrap_or_else(|| TransformResult {
            code: "export {};\n".to_string(),
            ..TransformResult::default()
        });
        if !source_map {
            result.map = None;
        }
        result
    }
}

/// Resolves relative specifiers against a known file set, TypeScript style.
#[derive(Debug, Default)]
pub struct SetResolver {
    files: HashSet<String>,
    aliases: Vec<(String, String)>,
    externals: HashSet<String>,
    pub queries: Mutex<Vec<(String, String)>>,
}

impl SetResolver {
    pub fn new<'a>(files: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            files: files.into_iter().map(str::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn alias(mut self, prefix: &str, dir: &str) -> Self {
        self.aliases.push((prefix.to_string(), dir.to_string()));
        self
    }

    pub fn external(mut self, specifier: &str) -> Self {
        self.externals.insert(specifier.to_string());
        self
    }

    fn probe(&self, base: &str) -> Option<String> {
        let stem = paths::strip_declarable_extension(base);
        [
            base.to_string(),
            format!("{stem}.ts"),
            format!("{stem}.tsx"),
            format!("{stem}.mts"),
            format!("{stem}.cts"),
            format!("{base}/index.ts"),
        ]
        .into_iter()
        .find(|candidate| self.files.contains(candidate))
    }
}

#[async_trait]
impl ModuleResolver for SetResolver {
    async fn resolve(&self, specifier: &str, importer: &str) -> Option<ResolvedModule> {
        self.queries
            .lock()
            .unwrap()
            .push((specifier.to_string(), importer.to_string()));

        if self.externals.contains(specifier) {
            return Some(ResolvedModule {
                id: format!("/p/node_modules/{specifier}/index.d.ts"),
                external: true,
            });
        }
        let base = if specifier.starts_with('.') {
            paths::resolve(&paths::dirname(importer), specifier)
        } else {
            let (prefix, dir) = self
                .aliases
                .iter()
                .find(|(prefix, _)| specifier.starts_with(prefix.as_str()))?;
            paths::join(dir, &specifier[prefix.len()..])
        };
        self.probe(&base).map(|id| ResolvedModule {
            id,
            external: false,
        })
    }
}

/// A session over an in-memory project rooted at `/p`.
pub struct Fixture {
    pub fs: Arc<MemoryFileSystem>,
    pub transformer: Arc<FixtureTransformer>,
    pub resolver: Arc<SetResolver>,
}

impl Fixture {
    pub fn new(
        sources: &[(&str, &str)],
        transformer: FixtureTransformer,
        resolver: SetResolver,
    ) -> Self {
        let fs = MemoryFileSystem::new(
            "/p",
            sources
                .iter()
                .map(|(path, text)| (path.into(), text.to_string())),
        )
        .unwrap();
        Self {
            fs: Arc::new(fs),
            transformer: Arc::new(transformer),
            resolver: Arc::new(resolver),
        }
    }

    pub fn session(&self, options: ResolvedOptions) -> BuildSession {
        BuildSession::new(
            Collaborators {
                fs: self.fs.clone(),
                transformer: self.transformer.clone(),
                parser: Arc::new(LineParser),
                resolver: self.resolver.clone(),
            },
            options,
        )
    }
}

/// Run `entries` to completion and emit under `/out`.
pub async fn build(
    fixture: &Fixture,
    entries: &EntryResolution,
    options: ResolvedOptions,
) -> Result<Vec<EmittedDeclaration>> {
    let template = options.template.clone();
    let out_ext = options.out_ext;
    let mut session = fixture.session(options);
    for entry in &entries.entries {
        session.add_entry(entry);
    }
    session.run().await?;

    let namer = OutputNamer::new(entries, &template).with_out_ext(out_ext);
    Ok(session.finish(&namer, "/out"))
}

pub fn emitted<'a>(outputs: &'a [EmittedDeclaration], path: &str) -> &'a EmittedDeclaration {
    outputs
        .iter()
        .find(|output| output.path == path)
        .unwrap_or_else(|| {
            let paths: Vec<_> = outputs.iter().map(|o| o.path.as_str()).collect();
            panic!("{path} not emitted, got {paths:?}")
        })
}
