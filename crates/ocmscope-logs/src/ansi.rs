use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// CSI sequences, OSC strings (BEL or ST terminated) and two-byte escapes
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b(?:\[[0-?]*[ -/]*[@-~]|\][^\x07\x1b]*(?:\x07|\x1b\\)|[@-Z\\-_])")
        .expect("ANSI escape pattern is valid")
});

/// Remove terminal escape sequences, leaving only printable content
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    ANSI_ESCAPE.replace_all(s, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_borrowed() {
        assert!(matches!(strip_ansi("plain text"), Cow::Borrowed("plain text")));
    }

    #[test]
    fn test_strips_color_codes() {
        assert_eq!(strip_ansi("\x1b[31mred\x1b[0m text"), "red text");
        assert_eq!(strip_ansi("\x1b[1;38;5;208mbold\x1b[m"), "bold");
    }

    #[test]
    fn test_strips_osc_hyperlinks() {
        let line = "\x1b]8;;https://example.com\x07link\x1b]8;;\x07 done";
        assert_eq!(strip_ansi(line), "link done");
    }

    #[test]
    fn test_strips_cursor_movement() {
        assert_eq!(strip_ansi("\x1b[2Kprogress 50%\x1b[1G"), "progress 50%");
    }
}
