//! Deterministic slug generation for heading anchors.
//!
//! ASCII slugification is delegated to the `slug` crate. Chinese text is first
//! transliterated with `pinyin` so a heading like “基线对齐” still yields a
//! readable anchor (`ji-xian-dui-qi`) instead of an empty one. Other non-ASCII
//! letters are transliterated; non-ASCII symbols are separators.
//!
//! Every function here is pure and total: the same input always produces the
//! same output and nothing is counted between calls. Two headings with the same
//! text therefore share an anchor.

use pinyin::{Pinyin, ToPinyin};
use slug::slugify as ascii_slugify;

/// Map arbitrary text to a URL-safe identifier.
///
/// Lower-cases the input, collapses every run of non-alphanumeric characters
/// into a single `-` and trims separators from both ends. Empty or
/// punctuation-only input yields an empty string.
pub fn slugify(text: &str) -> String {
    ascii_slugify(transliterate_to_ascii(text))
}

/// Anchor id for a heading, derived from the literal text of its first child span.
///
/// The block renderer and the table-of-contents extractor both go through this
/// function; emitted heading ids and TOC link targets must never diverge.
pub fn heading_anchor(first_child_text: &str) -> String {
    slugify(first_child_text)
}

fn transliterate_to_ascii(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for ch in input.chars() {
        if ch.is_ascii() {
            output.push(ch);
            continue;
        }

        match ch.to_pinyin() {
            Some(py) => append_pinyin(&mut output, py),
            // accented and non-Latin letters are transliterated by `slug`
            None if ch.is_alphabetic() => output.push(ch),
            // symbols, emoji and numeric forms separate words like punctuation
            None => output.push(' '),
        }
    }

    output
}

fn append_pinyin(buffer: &mut String, pinyin: Pinyin) {
    if !buffer.is_empty() && !buffer.ends_with(' ') {
        buffer.push(' ');
    }
    buffer.push_str(pinyin.plain());
    buffer.push(' ');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_joins_words() {
        assert_eq!(slugify("Getting Started"), "getting-started");
    }

    #[test]
    fn slugify_collapses_punctuation_runs() {
        assert_eq!(slugify("  What's new -- in 2.0?!  "), "what-s-new-in-2-0");
        assert_eq!(slugify("snake_case__heading"), "snake-case-heading");
    }

    #[test]
    fn slugify_is_idempotent_on_normalized_input() {
        assert_eq!(slugify("hello-world"), "hello-world");
        let once = slugify("Hello, World!");
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn slugify_is_deterministic() {
        let input = "Deterministic Anchors & You";
        let first = slugify(input);
        for _ in 0..8 {
            assert_eq!(slugify(input), first);
        }
    }

    #[test]
    fn slugify_empty_and_symbol_only_input_yields_empty_string() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("!!! ---"), "");
    }

    #[test]
    fn slugify_transliterates_chinese() {
        assert_eq!(slugify("Rust 基础教程"), "rust-ji-chu-jiao-cheng");
    }

    #[test]
    fn duplicate_heading_text_shares_an_anchor() {
        assert_eq!(heading_anchor("Overview"), heading_anchor("Overview"));
    }

    #[test]
    fn slugify_treats_symbols_as_separators() {
        assert_eq!(slugify("Rust™ Guide"), "rust-guide");
        assert_eq!(slugify("Price in €"), "price-in");
        assert_eq!(slugify("½ done"), "done");
        assert_eq!(slugify("a→b"), "a-b");
    }

    #[test]
    fn slugify_drops_emoji() {
        assert_eq!(slugify("🚀 Launch"), "launch");
        assert_eq!(slugify("Ship it 🎉🎉"), "ship-it");
        assert_eq!(slugify("🦀"), "");
    }

    #[test]
    fn slugify_transliterates_accented_letters() {
        assert_eq!(slugify("Café Über"), "cafe-uber");
    }
}
