//! Isolated declarations with oxc.

use crate::parser::source_type_for;
use async_trait::async_trait;
use isodecl_core::{DeclarationTransformer, TransformResult};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_isolated_declarations::{IsolatedDeclarations, IsolatedDeclarationsOptions};
use oxc_parser::Parser;
use std::path::PathBuf;

/// Generates `.d.ts` text without type checking.
///
/// Every exported binding must carry an explicit type (TypeScript's
/// `isolatedDeclarations`); violations are reported as errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcTransformer {
    strip_internal: bool,
}

impl OxcTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop declarations tagged `@internal`.
    pub fn strip_internal(mut self, strip: bool) -> Self {
        self.strip_internal = strip;
        self
    }

    /// Transform synchronously.
    pub fn transform_sync(&self, id: &str, code: &str, source_map: bool) -> TransformResult {
        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, code, source_type_for(id)).parse();
        if !parsed.errors.is_empty() || parsed.panicked {
            return TransformResult {
                code: String::new(),
                errors: parsed.errors.iter().map(ToString::to_string).collect(),
                map: None,
            };
        }

        let declarations = IsolatedDeclarations::new(
            &allocator,
            IsolatedDeclarationsOptions {
                strip_internal: self.strip_internal,
            },
        )
        .build(&parsed.program);

        let options = CodegenOptions {
            source_map_path: source_map.then(|| PathBuf::from(id)),
            ..CodegenOptions::default()
        };
        let generated = Codegen::new()
            .with_options(options)
            .build(&declarations.program);

        TransformResult {
            code: generated.code,
            errors: declarations.errors.iter().map(ToString::to_string).collect(),
            map: generated
                .map
                .and_then(|map| mappings_of(&map.to_json_string())),
        }
    }
}

/// The `mappings` field of a source map.
fn mappings_of(json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    value.get("mappings")?.as_str().map(str::to_string)
}

#[async_trait]
impl DeclarationTransformer for OxcTransformer {
    fn name(&self) -> &str {
        "oxc"
    }

    async fn transform(&self, id: &str, code: &str, source_map: bool) -> TransformResult {
        self.transform_sync(id, code, source_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emits_declarations() {
        let result = OxcTransformer::new().transform_sync(
            "/p/src/main.ts",
            "import type { U } from './util';\nexport function main(u: U): string { return ''; }\n",
            false,
        );

        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert!(result.code.contains("export declare function main(u: U): string;"));
        assert!(result.code.contains("./util"));
        assert!(result.map.is_none());
    }

    #[test]
    fn test_reports_missing_annotations() {
        let result = OxcTransformer::new().transform_sync(
            "/p/src/bad.ts",
            "export const x = [1, 2].map((n) => n * 2);\n",
            false,
        );
        assert!(!result.errors.is_empty());
    }

    #[test]
    fn test_reports_syntax_errors() {
        let result = OxcTransformer::new().transform_sync("/p/src/bad.ts", "export const = ;", false);
        assert!(!result.errors.is_empty());
        assert!(result.code.is_empty());
    }

    #[test]
    fn test_source_map_mappings() {
        let result = OxcTransformer::new().transform_sync(
            "/p/src/main.ts",
            "export function main(): void {}\n",
            true,
        );
        assert!(result.map.is_some_and(|mappings| !mappings.is_empty()));
    }

    #[test]
    fn test_strip_internal() {
        let code = "/** @internal */\nexport declare function hidden(): void;\nexport declare function shown(): void;\n";
        let stripped = OxcTransformer::new().strip_internal(true).transform_sync("/p/src/a.ts", code, false);
        assert!(!stripped.code.contains("hidden"));
        assert!(stripped.code.contains("shown"));
    }

    #[test]
    fn test_mappings_of() {
        assert_eq!(
            mappings_of(r#"{"version":3,"mappings":"AAAA"}"#).as_deref(),
            Some("AAAA")
        );
        assert_eq!(mappings_of("not json"), None);
    }
}
