// Copyplus Text Transformer
// Single-pass newline merging and whitespace removal

use std::borrow::Cow;

/// Private-use pair that CAJViewer appends when copying text.
///
/// Removed by exact match before the pass begins.
pub const CAJ_MARKER: &str = "\u{E5D2}\u{E5CF}";

/// The pair of toggles the transformer honors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformOptions {
    pub merge_newlines: bool,
    pub remove_spaces: bool,
}

impl TransformOptions {
    pub fn new(merge_newlines: bool, remove_spaces: bool) -> Self {
        Self {
            merge_newlines,
            remove_spaces,
        }
    }

    /// Apply [`transform`] with these toggles.
    pub fn apply(self, text: &str) -> String {
        transform(text, self.merge_newlines, self.remove_spaces)
    }
}

/// Space, tab, no-break space, ideographic space.
pub fn is_removable_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\u{00A0}' | '\u{3000}')
}

/// ASCII letter, digit, underscore, or hyphen.
pub fn is_ascii_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

/// First character of `rest` that is not a line break.
///
/// A removable space is returned like any other character: it blocks the
/// merge separator instead of being looked through.
fn peek_next_non_newline(rest: &str) -> Option<char> {
    rest.chars().find(|ch| *ch != '\r' && *ch != '\n')
}

/// Rewrite `text` according to the two toggles.
///
/// CRLF and lone CR become `\n`. With `remove_spaces`, every removable
/// space is dropped. With `merge_newlines`, every line break is dropped;
/// when spaces are kept, a single space is inserted where the break
/// separated two ASCII word characters so words are not glued together.
pub fn transform(text: &str, merge_newlines: bool, remove_spaces: bool) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned: Cow<'_, str> = if text.contains(CAJ_MARKER) {
        Cow::Owned(text.replace(CAJ_MARKER, ""))
    } else {
        Cow::Borrowed(text)
    };

    let mut out = String::with_capacity(cleaned.len());
    let mut chars = cleaned.char_indices().peekable();

    while let Some((idx, mut ch)) = chars.next() {
        let mut end = idx + ch.len_utf8();

        if ch == '\r' {
            if let Some(&(_, '\n')) = chars.peek() {
                chars.next();
                end += 1;
            }
            ch = '\n';
        }

        if remove_spaces && is_removable_space(ch) {
            continue;
        }

        if merge_newlines && ch == '\n' {
            if !remove_spaces {
                let prev = out.chars().next_back();
                let next = peek_next_non_newline(&cleaned[end..]);
                if prev.is_some_and(is_ascii_word_char) && next.is_some_and(is_ascii_word_char) {
                    out.push(' ');
                }
            }
            continue;
        }

        out.push(ch);
    }

    out
}

/// [`transform`] for possibly-absent input; `None` stays `None`.
pub fn transform_opt(text: Option<&str>, merge_newlines: bool, remove_spaces: bool) -> Option<String> {
    text.map(|t| transform(t, merge_newlines, remove_spaces))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_absent() {
        assert_eq!(transform("", true, true), "");
        assert_eq!(transform_opt(None, true, true), None);
        assert_eq!(transform_opt(Some(""), false, false), Some(String::new()));
    }

    #[test]
    fn test_no_flags_normalizes_line_endings_only() {
        assert_eq!(transform("a\r\nb\rc\nd", false, false), "a\nb\nc\nd");
        assert_eq!(transform("tab\there  x\u{3000}y", false, false), "tab\there  x\u{3000}y");
        assert_eq!(transform("\r\n\r\n", false, false), "\n\n");
        assert_eq!(transform("\r\r\n", false, false), "\n\n");
    }

    #[test]
    fn test_merge_inserts_space_between_words() {
        assert_eq!(transform("a\r\nb", true, false), "a b");
        assert_eq!(transform("a\nb", true, false), "a b");
        assert_eq!(transform("a\rb", true, false), "a b");
        assert_eq!(transform("foo_\n-bar", true, false), "foo_ -bar");
    }

    #[test]
    fn test_merge_without_space_after_punctuation() {
        assert_eq!(transform("a.\nb", true, false), "a.b");
        assert_eq!(transform("a\n.b", true, false), "a.b");
    }

    #[test]
    fn test_merge_collapses_consecutive_breaks() {
        assert_eq!(transform("a\n\n\nb", true, false), "a b");
        assert_eq!(transform("a\r\n\r\nb", true, false), "a b");
        assert_eq!(transform("\n\nstart", true, false), "start");
        assert_eq!(transform("end\n\n", true, false), "end");
    }

    #[test]
    fn test_merge_non_ascii_neighbours_get_no_space() {
        assert_eq!(transform("中文\n段落", true, false), "中文段落");
        assert_eq!(transform("é\nb", true, false), "éb");
    }

    #[test]
    fn test_merge_space_after_break_blocks_separator() {
        // The space is the real next character, so no separator is added;
        // the space itself is kept.
        assert_eq!(transform("a\n b", true, false), "a b");
        assert_eq!(transform("a\n\tb", true, false), "a\tb");
        assert_eq!(transform("a\n\n b", true, false), "a b");
    }

    #[test]
    fn test_merge_space_before_break() {
        assert_eq!(transform("a \nb", true, false), "a b");
    }

    #[test]
    fn test_remove_spaces() {
        assert_eq!(transform("a  b", false, true), "ab");
        assert_eq!(transform("a\tb\u{00A0}c\u{3000}d", false, true), "abcd");
        assert_eq!(transform("a\nb", false, true), "a\nb");
    }

    #[test]
    fn test_merge_and_remove_skip_separator() {
        assert_eq!(transform("a\nb", true, true), "ab");
        assert_eq!(transform("one two\r\nthree", true, true), "onetwothree");
    }

    #[test]
    fn test_caj_marker_stripped() {
        let input = format!("ab{}cd", CAJ_MARKER);
        assert_eq!(transform(&input, false, false), "abcd");
        // Only the exact pair is removed
        assert_eq!(transform("\u{E5D2}x\u{E5CF}", false, false), "\u{E5D2}x\u{E5CF}");
    }

    #[test]
    fn test_caj_marker_between_words_then_merge() {
        let input = format!("a{}\nb", CAJ_MARKER);
        assert_eq!(transform(&input, true, false), "a b");
    }

    #[test]
    fn test_options_apply() {
        let opts = TransformOptions::new(true, false);
        assert_eq!(opts.apply("x\ny"), "x y");
        assert_eq!(TransformOptions::default().apply("x\r\ny"), "x\ny");
    }

    #[test]
    fn test_char_classes() {
        for ch in [' ', '\t', '\u{00A0}', '\u{3000}'] {
            assert!(is_removable_space(ch));
        }
        assert!(!is_removable_space('\n'));
        assert!(!is_removable_space('\u{2003}'));

        for ch in ['a', 'Z', '0', '_', '-'] {
            assert!(is_ascii_word_char(ch));
        }
        assert!(!is_ascii_word_char('.'));
        assert!(!is_ascii_word_char('é'));
        assert!(!is_ascii_word_char('１'));
    }
}
