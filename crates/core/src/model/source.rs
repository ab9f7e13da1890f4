use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hasher;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::Xxh3;

/// The pair of comment styles a language offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CommentSyntax {
    /// `//` and `/* */`
    CFamily,
    /// `#` only
    Hash,
    /// `--` and `/* */`
    Sql,
    /// `--` and `--[[ ]]`
    Lua,
}

impl CommentSyntax {
    pub fn line_marker(&self) -> &'static str {
        match self {
            CommentSyntax::CFamily => "//",
            CommentSyntax::Hash => "#",
            CommentSyntax::Sql | CommentSyntax::Lua => "--",
        }
    }

    pub fn block_delimiters(&self) -> Option<(&'static str, &'static str)> {
        match self {
            CommentSyntax::CFamily | CommentSyntax::Sql => Some(("/*", "*/")),
            CommentSyntax::Lua => Some(("--[[", "]]")),
            CommentSyntax::Hash => None,
        }
    }

    pub fn for_extension(ext: &str) -> Option<Self> {
        let syntax = match ext.to_ascii_lowercase().as_str() {
            "c" | "h" | "cc" | "cpp" | "cxx" | "hh" | "hpp" | "hxx" | "rs" | "go" | "java"
            | "js" | "jsx" | "ts" | "tsx" | "swift" | "kt" | "cs" | "scala" | "m" => {
                CommentSyntax::CFamily
            }
            "py" | "sh" | "bash" | "rb" | "pl" | "toml" | "yaml" | "yml" | "cmake" | "r" => {
                CommentSyntax::Hash
            }
            "sql" => CommentSyntax::Sql,
            "lua" => CommentSyntax::Lua,
            _ => return None,
        };
        Some(syntax)
    }

    /// Falls back to C-family syntax for unknown extensions.
    pub fn for_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::for_extension)
            .unwrap_or(CommentSyntax::CFamily)
    }
}

/// One input file's text, immutable for the duration of a scan.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub text: String,
    pub content_hash: u64,
    pub syntax: CommentSyntax,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let text = text.into();
        let syntax = CommentSyntax::for_path(&path);
        Self {
            content_hash: content_hash(text.as_bytes()),
            path,
            text,
            syntax,
        }
    }

    /// Decodes raw bytes. The flag is true when invalid UTF-8 had to be replaced.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8]) -> (Self, bool) {
        let path = path.into();
        let hash = content_hash(bytes);
        let (text, lossy) = match String::from_utf8_lossy(bytes) {
            std::borrow::Cow::Borrowed(s) => (s.to_string(), false),
            std::borrow::Cow::Owned(s) => (s, true),
        };
        let syntax = CommentSyntax::for_path(&path);
        (
            Self {
                path,
                text,
                content_hash: hash,
                syntax,
            },
            lossy,
        )
    }

    pub fn whole_file(&self) -> SourceLocation {
        let lines = self.text.lines().count().max(1);
        SourceLocation::new(&self.path, 1, lines)
    }
}

pub fn content_hash(bytes: &[u8]) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.write(bytes);
    hasher.finish()
}

/// A 1-based, inclusive line range within a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct SourceLocation {
    pub path: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
}

impl SourceLocation {
    pub fn new(path: impl Into<PathBuf>, start_line: usize, end_line: usize) -> Self {
        Self {
            path: path.into(),
            start_line,
            end_line: end_line.max(start_line),
        }
    }

    pub fn line(path: impl Into<PathBuf>, line: usize) -> Self {
        Self::new(path, line, line)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_line == self.end_line {
            write!(f, "{}:{}", self.path.display(), self.start_line)
        } else {
            write!(
                f,
                "{}:{}-{}",
                self.path.display(),
                self.start_line,
                self.end_line
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_from_extension() {
        assert_eq!(CommentSyntax::for_path(Path::new("a/b.c")), CommentSyntax::CFamily);
        assert_eq!(CommentSyntax::for_path(Path::new("run.PY")), CommentSyntax::Hash);
        assert_eq!(CommentSyntax::for_path(Path::new("init.lua")), CommentSyntax::Lua);
        assert_eq!(CommentSyntax::for_path(Path::new("Makefile")), CommentSyntax::CFamily);
    }

    #[test]
    fn lossy_decoding_is_flagged() {
        let (unit, lossy) = SourceUnit::from_bytes("x.c", b"// AI_PHASE: A\xff\n");
        assert!(lossy);
        assert!(unit.text.starts_with("// AI_PHASE: A"));

        let (_, lossy) = SourceUnit::from_bytes("x.c", b"int x;\n");
        assert!(!lossy);
    }

    #[test]
    fn identical_text_hashes_identically() {
        let a = SourceUnit::new("a.c", "// AI_PHASE: X\n");
        let b = SourceUnit::new("b.c", "// AI_PHASE: X\n");
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn location_display() {
        assert_eq!(SourceLocation::line("a.c", 3).to_string(), "a.c:3");
        assert_eq!(SourceLocation::new("a.c", 3, 7).to_string(), "a.c:3-7");
    }
}
