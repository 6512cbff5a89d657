//! Collaborator traits supplied by a backend.
//!
//! The core never parses, resolves or generates declarations itself. A build
//! is driven through three seams, implemented for oxc by `isodecl-oxc`:
//!
//! - [`DeclarationTransformer`]: source → declaration text
//! - [`ModuleParser`]: text → import/export statements
//! - [`ModuleResolver`]: specifier + importer → canonical path

use crate::error::Result;
use crate::imports::ModuleStatement;
use async_trait::async_trait;
use serde::Serialize;

/// Output of a declaration transform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformResult {
    /// Declaration text. May be empty when `errors` is not.
    pub code: String,
    /// Diagnostics, first one most relevant.
    pub errors: Vec<String>,
    /// Source map `mappings` of the declaration, when requested.
    pub map: Option<String>,
}

/// Produces declaration text for one source module.
///
/// # Thread Safety
///
/// Implementations must be Send + Sync so a session can be driven from any
/// runtime thread.
#[async_trait]
pub trait DeclarationTransformer: Send + Sync {
    /// Short name used in logs (e.g., "oxc").
    fn name(&self) -> &str;

    /// Transform `code` of module `id`.
    ///
    /// Diagnostics are returned in [`TransformResult::errors`] rather than as
    /// an `Err`; the session decides whether they are fatal.
    async fn transform(&self, id: &str, code: &str, source_map: bool) -> TransformResult;
}

/// Lowers module text to top-level import/export statements.
#[async_trait]
pub trait ModuleParser: Send + Sync {
    /// Parse `text` of module `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`](crate::Error::Parse) when the text is not
    /// syntactically valid.
    async fn parse(&self, id: &str, text: &str) -> Result<Vec<ModuleStatement>>;
}

/// A resolved module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedModule {
    /// Canonical absolute path.
    pub id: String,
    /// Outside the build (a package or an explicitly external module).
    pub external: bool,
}

/// Resolves specifiers the way the host bundler would.
#[async_trait]
pub trait ModuleResolver: Send + Sync {
    /// Resolve `specifier` imported from `importer`. `None` is a miss.
    async fn resolve(&self, specifier: &str, importer: &str) -> Option<ResolvedModule>;
}
