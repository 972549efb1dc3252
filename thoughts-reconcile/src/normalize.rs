//! Text normalization for matching and for opt-in content tidying.

/// Collapse every whitespace run to one space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The first `len` characters of `text` after [`collapse_whitespace`].
///
/// Counted in `char`s, so multi-byte text is never split mid-character.
pub fn content_prefix(text: &str, len: usize) -> String {
    collapse_whitespace(text).chars().take(len).collect()
}

/// Tidy a body of text while keeping its paragraph structure.
///
/// Spaces and tabs inside a line collapse to one space, every line is
/// trimmed, runs of blank lines become a single blank line, and leading and
/// trailing blank lines are removed.
pub fn tidy_content(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut pending_blank = false;
    for raw in text.lines() {
        let line = raw
            .split([' ', '\t'])
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let line = line.trim();
        if line.is_empty() {
            pending_blank = !lines.is_empty();
            continue;
        }
        if pending_blank {
            lines.push(String::new());
            pending_blank = false;
        }
        lines.push(line.to_owned());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_ignores_cosmetic_whitespace() {
        let a = content_prefix("hello   world\n\nagain", 100);
        let b = content_prefix("  hello world again ", 100);
        assert_eq!(a, b);
    }

    #[test]
    fn prefix_counts_characters_not_bytes() {
        assert_eq!(content_prefix("少女时代的淤青", 3), "少女时");
    }

    #[test]
    fn tidy_keeps_single_paragraph_breaks() {
        let tidy = tidy_content("\n  first \t line\n\n\n\nsecond  line  \n\n");
        assert_eq!(tidy, "first line\n\nsecond line");
    }

    #[test]
    fn tidy_is_idempotent() {
        let once = tidy_content("a  b\n \n\n c\r\nd");
        assert_eq!(tidy_content(&once), once);
    }
}
