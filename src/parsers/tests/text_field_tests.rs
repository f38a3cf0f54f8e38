use crate::parsers::text;
use regex::Regex;

#[cfg(test)]
mod comment_tests {
    use super::*;

    #[test]
    fn test_translation_notice_is_dropped() {
        let result = text::comment_text("Translated from Spanish\nGreat pool");
        assert_eq!(result, "Great pool");
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(text::comment_text(""), "");
    }

    #[test]
    fn test_single_line_is_trimmed() {
        assert_eq!(text::comment_text("  Breakfast was cold  "), "Breakfast was cold");
    }

    #[test]
    fn test_trailing_blank_line_wins() {
        // the last line is kept even when it is blank
        assert_eq!(text::comment_text("Notice\nComment\n   "), "");
    }
}

#[cfg(test)]
mod rating_tests {
    use super::*;

    fn label() -> Regex {
        Regex::new(r"Puntuación:\s*").unwrap()
    }

    #[test]
    fn test_label_is_stripped() {
        assert_eq!(text::rating_text("Puntuación: 9.2", &label()), "9.2");
    }

    #[test]
    fn test_without_label() {
        assert_eq!(text::rating_text(" 7,5 ", &label()), "7,5");
    }

    #[test]
    fn test_empty_rating() {
        assert_eq!(text::rating_text("", &label()), "");
    }
}

#[cfg(test)]
mod whitespace_tests {
    use super::*;

    #[test]
    fn test_normalize_lines() {
        let input = "  Line   1  \n\n \t \n  Line 2 ";
        assert_eq!(text::normalize_lines(input), "Line 1\nLine 2");
    }

    #[test]
    fn test_normalize_whitespace_in_segment() {
        assert_eq!(
            text::normalize_whitespace_in_segment("Hello    world!   "),
            "Hello world!"
        );
    }
}
