//! # isodecl-oxc
//!
//! The oxc backend for isodecl: a [`ModuleParser`](isodecl_core::ModuleParser)
//! over `oxc_parser`, a [`DeclarationTransformer`](isodecl_core::DeclarationTransformer)
//! over `oxc_isolated_declarations` and a
//! [`ModuleResolver`](isodecl_core::ModuleResolver) over `oxc_resolver`.
//!
//! ```no_run
//! use isodecl_core::{BuildSession, Options};
//! use isodecl_fs::NativeFileSystem;
//! use isodecl_oxc::{collaborators, OxcResolver, OxcTransformer};
//! use std::sync::Arc;
//!
//! # async fn demo() -> isodecl_core::Result<()> {
//! let host = collaborators(
//!     Arc::new(NativeFileSystem::new(std::env::current_dir()?)?),
//!     OxcTransformer::new(),
//!     OxcResolver::default(),
//! );
//! let mut session = BuildSession::new(host, Options::default().resolve()?);
//! session.add_entry("/project/src/index.ts");
//! session.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod parser;
pub mod resolver;
pub mod transformer;

pub use parser::OxcParser;
pub use resolver::{OxcResolver, ResolverConfig};
pub use transformer::OxcTransformer;

use isodecl_core::Collaborators;
use isodecl_fs::FileSystem;
use std::sync::Arc;

/// Session collaborators backed by oxc.
pub fn collaborators(
    fs: Arc<dyn FileSystem>,
    transformer: OxcTransformer,
    resolver: OxcResolver,
) -> Collaborators {
    Collaborators {
        fs,
        transformer: Arc::new(transformer),
        parser: Arc::new(OxcParser::new()),
        resolver: Arc::new(resolver),
    }
}
