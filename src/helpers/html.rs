//! HTML text helpers

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG_RE: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref BREAK_RE: Regex = Regex::new(r"(?i)<\s*(br|/p|/div|/li|/h[1-6])\s*/?\s*>").unwrap();
}

/// Default suffix appended to truncated text
pub const ELLIPSIS: &str = "...";

/// Strip HTML tags from a string
///
/// Block-level closing tags and `<br>` become spaces so adjacent
/// paragraphs don't run together.
pub fn strip_html(s: &str) -> String {
    let spaced = BREAK_RE.replace_all(s, " ");
    let text = TAG_RE.replace_all(&spaced, "");
    decode_entities(&text)
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Keep the first `words` words of some HTML, as plain text
///
/// # Examples
/// ```ignore
/// truncate_words("<p>one two three</p>", 2) // -> "one two..."
/// ```
pub fn truncate_words(html: &str, words: usize) -> String {
    let text = strip_html(html);
    let all: Vec<&str> = text.split_whitespace().collect();

    if all.len() <= words {
        all.join(" ")
    } else {
        format!("{}{}", all[..words].join(" "), ELLIPSIS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>World</b></p>"), "Hello World ");
        assert_eq!(strip_html("Rock &amp; Roll"), "Rock & Roll");
        assert_eq!(
            strip_html("<p>first</p><p>second</p>").split_whitespace().count(),
            2
        );
    }

    #[test]
    fn test_truncate_words() {
        let bio = "<p>We are a <em>loud</em> band from the coast.</p>";
        assert_eq!(truncate_words(bio, 4), "We are a loud...");
        assert_eq!(truncate_words(bio, 50), "We are a loud band from the coast.");
        assert_eq!(truncate_words("", 3), "");
    }

    #[test]
    fn test_truncate_multiline_tags() {
        let html = "<a\n href=\"/x\">link</a> text after";
        assert_eq!(truncate_words(html, 2), "link text...");
    }
}
