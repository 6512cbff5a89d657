//! isodecl Core - per-module declaration emission with import rewriting.
//!
//! Declarations are generated one module at a time by a pluggable
//! transformer. Once entries are aliased or a name template moves outputs
//! away from the source layout, relative specifiers inside those
//! declarations stop pointing at the right files. This crate computes where
//! every module is emitted and rewrites the specifiers to match.
//!
//! - [`paths`]: forward-slash path algebra
//! - [`EntryResolution`]: base directory and alias table
//! - [`OutputNamer`]: emission names from a [`NameTemplate`]
//! - [`rewrite()`]: relative specifier rewriting on a [`DeclarationBuffer`]
//! - [`BuildSession`]: transform queue, type-only dependency walk, emission
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   isodecl-cli   │  (config, entry globs, writing)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐      ┌─────────────────┐
//! │  isodecl-core   │ ───▶ │   isodecl-fs    │
//! └────────┬────────┘      └─────────────────┘
//!          │ DeclarationTransformer / ModuleParser / ModuleResolver
//!          ▼
//! ┌─────────────────┐
//! │  isodecl-oxc    │  (oxc parser, isolated declarations, resolver)
//! └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use isodecl_core::{EntryInput, EntryResolution, NameTemplate, OutputNamer};
//!
//! let input = EntryInput::Map([("a".to_string(), "src/a/index.ts".to_string())].into());
//! let entries = EntryResolution::resolve(&input, None, "/project");
//! let template = NameTemplate::new("[name]/index.js")?;
//! let namer = OutputNamer::new(&entries, &template);
//!
//! assert_eq!(namer.emission_name("/project/src/a/index.ts"), "a/index.d.ts");
//! # Ok::<(), isodecl_core::Error>(())
//! ```

pub mod buffer;
pub mod emit;
pub mod entry;
pub mod error;
pub mod host;
pub mod imports;
pub mod naming;
pub mod options;
pub mod paths;
pub mod rewrite;
pub mod session;

pub use buffer::DeclarationBuffer;
pub use emit::EmittedDeclaration;
pub use entry::{AliasTable, EntryInput, EntryResolution};
pub use error::{Error, Result};
pub use host::{
    DeclarationTransformer, ModuleParser, ModuleResolver, ResolvedModule, TransformResult,
};
pub use imports::{
    collect_imports, type_only_imports, ImportKind, ImportRecord, ModuleStatement, SourceLiteral,
    StatementKind,
};
pub use naming::{DeclarationExtension, NameTemplate, OutputNamer};
pub use options::{
    prefix_rewrite_hook, Options, ResolvedOptions, RewriteImportsHook, SourceFilter,
};
pub use rewrite::{rewrite, RewritePolicy};
pub use session::{BuildSession, Collaborators, ModuleOutput};
