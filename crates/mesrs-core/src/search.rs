//! Case-insensitive substring filters.
//!
//! The term is lowercased here and compared with `lower(column) LIKE
//! '%term%' ESCAPE '\'`, so the wildcard characters a user types must be
//! escaped to match literally. Accented capitals (É, Â) fold in `lower()`
//! only when the database has a UTF-8 `LC_CTYPE`.

/// Lowercases the term, escapes `%`, `_` and `\` and wraps it in `%` for a
/// substring match. Whitespace is part of the term. Returns `None` for
/// empty input so callers can skip the filter.
pub fn like_pattern(term: &str) -> Option<String> {
    if term.is_empty() {
        return None;
    }
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars().flat_map(char::to_lowercase) {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    Some(escaped)
}

/// Builds `(lower(a) LIKE $n ESCAPE '\' OR lower(b) LIKE $n ESCAPE '\' ...)`
/// for one bound [`like_pattern`].
pub fn contains_any(columns: &[&str], param_index: usize) -> String {
    let clauses: Vec<String> = columns
        .iter()
        .map(|column| format!("lower({column}) LIKE ${param_index} ESCAPE '\\'"))
        .collect();
    format!("({})", clauses.join(" OR "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_and_lowercases_term() {
        assert_eq!(like_pattern("ahmed"), Some("%ahmed%".to_string()));
        assert_eq!(like_pattern("Élise"), Some("%élise%".to_string()));
    }

    #[test]
    fn whitespace_is_kept() {
        assert_eq!(like_pattern("Ould "), Some("%ould %".to_string()));
        assert_eq!(like_pattern("  Sidi "), Some("%  sidi %".to_string()));
        assert_eq!(like_pattern(" "), Some("% %".to_string()));
    }

    #[test]
    fn empty_is_none() {
        assert_eq!(like_pattern(""), None);
    }

    #[test]
    fn escapes_wildcards() {
        assert_eq!(like_pattern("50%"), Some("%50\\%%".to_string()));
        assert_eq!(like_pattern("a_b"), Some("%a\\_b%".to_string()));
        assert_eq!(like_pattern("c\\d"), Some("%c\\\\d%".to_string()));
    }

    #[test]
    fn builds_or_clause() {
        assert_eq!(
            contains_any(&["p.first_name", "p.email"], 3),
            "(lower(p.first_name) LIKE $3 ESCAPE '\\' OR lower(p.email) LIKE $3 ESCAPE '\\')"
        );
    }
}
