use crate::model::CommentSyntax;

/// Name of the first declaration-like line at or after `from`.
///
/// Blank lines and further comments are skipped. C-family preprocessor
/// lines are skipped too, so a breadcrumb above `#include` still binds to
/// the function that follows.
pub fn declaration_after(lines: &[&str], from: usize, syntax: CommentSyntax) -> Option<String> {
    let marker = syntax.line_marker();
    let delimiters = syntax.block_delimiters();
    let mut idx = from;

    while idx < lines.len() {
        let trimmed = lines[idx].trim();
        idx += 1;

        if trimmed.is_empty() {
            continue;
        }
        if let Some((open, close)) = delimiters {
            if let Some(rest) = trimmed.strip_prefix(open) {
                if !rest.contains(close) {
                    while idx < lines.len() && !lines[idx].contains(close) {
                        idx += 1;
                    }
                    idx += 1;
                }
                continue;
            }
        }
        if trimmed.starts_with(marker) {
            continue;
        }
        if syntax == CommentSyntax::CFamily && trimmed.starts_with('#') {
            continue;
        }
        return declared_name(trimmed);
    }
    None
}

/// `void* memory_alloc(size_t size)` -> `memory_alloc`
pub fn declared_name(line: &str) -> Option<String> {
    let head = match line.find('(') {
        Some(pos) => &line[..pos],
        None => line
            .find(['{', '=', ';', ':'])
            .map(|pos| &line[..pos])
            .unwrap_or(line),
    };

    head.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .filter(|token| !token.starts_with(|c: char| c.is_ascii_digit()))
        .last()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_from_common_declarations() {
        assert_eq!(declared_name("void* memory_alloc(size_t size)").as_deref(), Some("memory_alloc"));
        assert_eq!(declared_name("static int init_gpu(void) {").as_deref(), Some("init_gpu"));
        assert_eq!(declared_name("struct task_queue {").as_deref(), Some("task_queue"));
        assert_eq!(declared_name("static const char *banner;").as_deref(), Some("banner"));
        assert_eq!(declared_name("int retries = 3;").as_deref(), Some("retries"));
        assert_eq!(declared_name("def scan(root):").as_deref(), Some("scan"));
        assert_eq!(declared_name("}"), None);
    }

    #[test]
    fn skips_comments_and_preprocessor_lines() {
        let lines = [
            "",
            "/* unrelated",
            "   prose */",
            "#include <stdio.h>",
            "// trailing note",
            "int main(int argc, char **argv)",
        ];
        assert_eq!(
            declaration_after(&lines, 0, CommentSyntax::CFamily).as_deref(),
            Some("main")
        );
    }

    #[test]
    fn nothing_after_the_comment() {
        let lines = ["", "   "];
        assert_eq!(declaration_after(&lines, 0, CommentSyntax::CFamily), None);
    }

    #[test]
    fn hash_syntax_keeps_hash_as_comment() {
        let lines = ["# more notes", "def handler(event):"];
        assert_eq!(
            declaration_after(&lines, 0, CommentSyntax::Hash).as_deref(),
            Some("handler")
        );
    }
}
