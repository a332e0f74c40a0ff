//! Utility functions for mapping operations.

/// Normalizes text for comparison by lowercasing and replacing separators with spaces.
pub fn normalize_text(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['_', '-', '.', '/', '\\'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Loose resemblance: normalized substring containment in either direction.
pub fn resembles(header: &str, pattern: &str) -> bool {
    let header = normalize_text(header);
    let pattern = normalize_text(pattern);
    if header.is_empty() || pattern.is_empty() {
        return false;
    }
    header.contains(&pattern) || pattern.contains(&header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize_text("  Student_ID "), "student id");
        assert_eq!(normalize_text("math-score/2"), "math score 2");
    }

    #[test]
    fn resemblance_is_symmetric_containment() {
        assert!(resembles("班级名称", "班级"));
        assert!(resembles("id", "Student-ID"));
        assert!(!resembles("语文", "数学"));
        assert!(!resembles("", "班级"));
    }
}
