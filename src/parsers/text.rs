use regex::Regex;

/// Keeps only the last line of a comment block.
///
/// Comment blocks may carry a translation notice above the actual comment;
/// only the final line is the comment itself. Empty input yields an empty
/// string.
pub fn comment_text(raw: &str) -> String {
    raw.lines()
        .last()
        .map(|line| line.trim().to_string())
        .unwrap_or_default()
}

/// Removes every match of the rating label pattern and trims the rest
pub fn rating_text(raw: &str, label: &Regex) -> String {
    label.replace_all(raw, "").trim().to_string()
}

/// Collapses runs of whitespace within each line and drops empty lines
pub fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(normalize_whitespace_in_segment)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalizes whitespace within a single line
pub fn normalize_whitespace_in_segment(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}
