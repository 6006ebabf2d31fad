//! Caller-supplied BTQL text
//!
//! Custom queries are passed through verbatim apart from two clauses the
//! backend requires: a source and a limit.

use std::sync::OnceLock;

use regex::Regex;

use super::builder::source_clause;

fn from_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^\s*from\s*:").expect("from pattern is valid"))
}

fn limit_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^\s*limit\s*:").expect("limit pattern is valid"))
}

pub fn has_from_clause(query: &str) -> bool {
    from_clause_re().is_match(query)
}

pub fn has_limit_clause(query: &str) -> bool {
    limit_clause_re().is_match(query)
}

/// Add `from:` for the project when missing, then `limit:` when missing
pub fn prepare_custom_query(project_id: &str, query: &str, limit: usize) -> String {
    let mut prepared = query.trim().to_string();

    if !has_from_clause(&prepared) {
        prepared = if prepared.is_empty() {
            source_clause(project_id)
        } else {
            format!("{}\n{}", source_clause(project_id), prepared)
        };
    }

    if !has_limit_clause(&prepared) {
        prepared.push_str(&format!("\nlimit: {}", limit));
    }

    prepared
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = "proj-1";

    #[test]
    fn test_injects_source_and_limit() {
        let query = prepare_custom_query(PROJECT, "select: id\nfilter: scores IS NOT NULL", 100);
        assert_eq!(
            query,
            "from: project_logs('proj-1')\nselect: id\nfilter: scores IS NOT NULL\nlimit: 100"
        );
    }

    #[test]
    fn test_keeps_existing_clauses() {
        let original = "from: project_logs('other')\nselect: id\nlimit: 5";
        assert_eq!(prepare_custom_query(PROJECT, original, 100), original);
    }

    #[test]
    fn test_clause_detection_is_case_insensitive() {
        let original = "FROM: project_logs('other')\nSELECT: id\nLIMIT: 7";
        assert_eq!(prepare_custom_query(PROJECT, original, 100), original);
    }

    #[test]
    fn test_field_names_are_not_clauses() {
        // `from_user` and `rate_limit` are fields, not clauses
        let query = prepare_custom_query(PROJECT, "select: from_user, rate_limit", 10);
        assert!(query.starts_with("from: project_logs('proj-1')\n"));
        assert!(query.ends_with("\nlimit: 10"));
    }

    #[test]
    fn test_clause_keywords_inside_literals_ignored() {
        let query = prepare_custom_query(
            PROJECT,
            "select: id\nfilter: output LIKE '%rate limit: exceeded%' AND input LIKE '%sent from: mars%'",
            10,
        );
        assert_eq!(
            query,
            "from: project_logs('proj-1')\nselect: id\nfilter: output LIKE '%rate limit: exceeded%' AND input LIKE '%sent from: mars%'\nlimit: 10"
        );
    }

    #[test]
    fn test_indented_clauses_detected() {
        let original = "  from: project_logs('other')\nselect: id\n  limit: 5";
        assert!(has_from_clause(original));
        assert!(has_limit_clause(original));
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(
            prepare_custom_query(PROJECT, "   ", 3),
            "from: project_logs('proj-1')\nlimit: 3"
        );
    }
}
