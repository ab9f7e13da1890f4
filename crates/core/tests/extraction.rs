use crumbtrail_core::extract::{extract_blocks, CommentKind};
use crumbtrail_core::parser::FieldParser;
use crumbtrail_core::{DiagnosticKind, SourceUnit};
use proptest::prelude::*;
use std::path::Path;

fn fixture(name: &str) -> SourceUnit {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let text = std::fs::read_to_string(&path).unwrap();
    SourceUnit::new(path, text)
}

#[test]
fn fixture_blocks_and_declarations() {
    let unit = fixture("scheduler.c");
    let blocks: Vec<_> = extract_blocks(&unit).map(Result::unwrap).collect();

    let spans: Vec<_> = blocks.iter().map(|b| (b.start_line, b.end_line)).collect();
    assert_eq!(spans, vec![(9, 13), (20, 31), (37, 47)]);

    let names: Vec<_> = blocks.iter().map(|b| b.declaration.as_deref()).collect();
    assert_eq!(
        names,
        vec![Some("queue_setup"), Some("steal_task"), Some("balance_load")]
    );
    assert_eq!(blocks[2].kind, CommentKind::Block);
}

#[test]
fn unterminated_block_keeps_earlier_blocks() {
    let unit = fixture("broken.c");
    let items: Vec<_> = extract_blocks(&unit).collect();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().start_line, 1);
    let diag = items[1].as_ref().unwrap_err();
    assert_eq!(diag.kind, DiagnosticKind::UnterminatedBlockComment);
    let loc = diag.location.as_ref().unwrap();
    assert_eq!((loc.start_line, loc.end_line), (5, 7));
}

#[test]
fn block_ranges_never_overlap() {
    let unit = fixture("recovery.c");
    let blocks: Vec<_> = extract_blocks(&unit).map(Result::unwrap).collect();
    assert_eq!(blocks.len(), 3);
    for pair in blocks.windows(2) {
        assert!(pair[0].end_line < pair[1].start_line);
    }
}

fn block_comment(inner: &[bool]) -> String {
    let mut text = String::from("/*\n * AI_PHASE: P\n");
    for blank in inner {
        if *blank {
            text.push('\n');
        } else {
            text.push_str(" * AI_NOTE: more\n");
        }
    }
    text.push_str(" */\nint f(void);\n");
    text
}

proptest! {
    #[test]
    fn block_comment_is_one_block(inner in prop::collection::vec(any::<bool>(), 0..24)) {
        let unit = SourceUnit::new("p.c", block_comment(&inner));
        let blocks: Vec<_> = extract_blocks(&unit).collect();
        prop_assert_eq!(blocks.len(), 1);
        let block = blocks[0].as_ref().unwrap();
        prop_assert_eq!(block.start_line, 1);
        prop_assert_eq!(block.end_line, inner.len() + 3);
    }

    #[test]
    fn adjacent_line_comments_merge(count in 1usize..16, gap in 0usize..3) {
        let mut text = String::new();
        for i in 0..count {
            text.push_str(&format!("// AI_NOTE: line {i}\n"));
        }
        text.push_str(&"\n".repeat(gap));
        text.push_str("// AI_PHASE: NEXT\n");

        let unit = SourceUnit::new("p.c", text);
        let blocks: Vec<_> = extract_blocks(&unit).map(Result::unwrap).collect();
        if gap == 0 {
            prop_assert_eq!(blocks.len(), 1);
            prop_assert_eq!(blocks[0].lines.len(), count + 1);
        } else {
            prop_assert_eq!(blocks.len(), 2);
            prop_assert_eq!(blocks[0].end_line, count);
        }
    }

    #[test]
    fn extension_parsing_is_idempotent(
        fields in prop::collection::vec(("ZZ_[A-Z]{1,8}Q", "[a-z0-9][a-z0-9 ]{0,16}"), 1..12)
    ) {
        let mut text = String::from("// AI_PHASE: P\n");
        for (key, value) in &fields {
            text.push_str(&format!("// {key}: {value}\n"));
        }
        let unit = SourceUnit::new("p.c", text);
        let parse = || {
            let block = extract_blocks(&unit).next().unwrap().unwrap();
            FieldParser::new().parse(&block, &unit.path).unwrap().record.extensions
        };
        let first = parse();
        prop_assert_eq!(&first, &parse());
        let total: usize = first.values().map(Vec::len).sum();
        prop_assert_eq!(total, fields.len());
    }
}
