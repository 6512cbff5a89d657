//! Position-addressed edit buffer for declaration text.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    start: usize,
    end: usize,
    content: String,
}

/// Declaration text plus pending replacements addressed by byte offsets into
/// the original text.
///
/// Offsets stay valid while edits accumulate, so every [`ImportRecord`]
/// collected from the original text can be applied without adjusting the
/// others.
///
/// [`ImportRecord`]: crate::imports::ImportRecord
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationBuffer {
    original: String,
    /// Sorted by `start`; never overlapping.
    edits: Vec<Edit>,
}

impl DeclarationBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            original: text.into(),
            edits: Vec::new(),
        }
    }

    /// The text as it was before any edit.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Slice of the original text.
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        self.original.get(start..end)
    }

    /// Replace `start..end` of the original text with `content`.
    ///
    /// Replacing exactly the same span again supersedes the earlier edit.
    /// Returns `false` and leaves the buffer untouched when the span is out
    /// of bounds, not on a char boundary, or overlaps a different edit.
    #[must_use]
    pub fn overwrite(&mut self, start: usize, end: usize, content: impl Into<String>) -> bool {
        if start > end || self.original.get(start..end).is_none() {
            return false;
        }

        let index = self.edits.partition_point(|edit| edit.start < start);
        if let Some(existing) = self.edits.get_mut(index) {
            if existing.start == start && existing.end == end {
                existing.content = content.into();
                return true;
            }
            if existing.start < end || (existing.start == start && start == end) {
                return false;
            }
        }
        if index > 0 && self.edits[index - 1].end > start {
            return false;
        }

        self.edits.insert(
            index,
            Edit {
                start,
                end,
                content: content.into(),
            },
        );
        true
    }

    /// Whether any edit changes the text.
    pub fn has_changed(&self) -> bool {
        self.edits
            .iter()
            .any(|edit| self.original[edit.start..edit.end] != edit.content)
    }
}

impl fmt::Display for DeclarationBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cursor = 0;
        for edit in &self.edits {
            f.write_str(&self.original[cursor..edit.start])?;
            f.write_str(&edit.content)?;
            cursor = edit.end;
        }
        f.write_str(&self.original[cursor..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_buffer() {
        let buffer = DeclarationBuffer::new("export {};\n");
        assert!(!buffer.has_changed());
        assert_eq!(buffer.to_string(), "export {};\n");
    }

    #[test]
    fn test_overwrite_keeps_original_offsets() {
        let text = r#"import { a } from "./a";
import { b } from "./b";
"#;
        let mut buffer = DeclarationBuffer::new(text);
        let a = text.find("./a").unwrap();
        let b = text.find("./b").unwrap();

        assert!(buffer.overwrite(b, b + 3, "../lib/b.js"));
        assert!(buffer.overwrite(a, a + 3, "./a/index.js"));

        assert!(buffer.has_changed());
        assert_eq!(
            buffer.to_string(),
            "import { a } from \"./a/index.js\";\nimport { b } from \"../lib/b.js\";\n"
        );
    }

    #[test]
    fn test_same_span_is_superseded() {
        let mut buffer = DeclarationBuffer::new("'./x'");
        assert!(buffer.overwrite(1, 4, "./y"));
        assert!(buffer.overwrite(1, 4, "./z"));
        assert_eq!(buffer.to_string(), "'./z'");
    }

    #[test]
    fn test_rejects_bad_spans() {
        let mut buffer = DeclarationBuffer::new("abcdef");
        assert!(!buffer.overwrite(4, 2, "x"));
        assert!(!buffer.overwrite(0, 10, "x"));
        assert!(buffer.overwrite(1, 3, "x"));
        assert!(!buffer.overwrite(2, 4, "y"));
        assert!(!buffer.overwrite(0, 2, "y"));
        assert_eq!(buffer.to_string(), "axdef");
    }

    #[test]
    fn test_identical_overwrite_is_not_a_change() {
        let mut buffer = DeclarationBuffer::new("'./x'");
        assert!(buffer.overwrite(1, 4, "./x"));
        assert!(!buffer.has_changed());
    }
}
