//! Small text helpers shared by the model client and the validator.

/// Return at most `max_chars` characters of `text`, appending an ellipsis
/// when the text was cut.
///
/// Cuts on a `char` boundary, so multi-byte input never panics.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_short_text_unchanged() {
        assert_eq!(excerpt("hello", 10), "hello");
        assert_eq!(excerpt("", 10), "");
    }

    #[test]
    fn test_excerpt_truncates_with_ellipsis() {
        assert_eq!(excerpt("abcdefgh", 3), "abc…");
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let text = "ééééé";
        assert_eq!(excerpt(text, 2), "éé…");
    }
}
