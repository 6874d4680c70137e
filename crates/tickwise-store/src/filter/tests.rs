//! Tests for the filter parser.

use super::*;

fn cond(field: &str, comparator: Comparator, value: &str) -> Filter {
    Filter::condition(field, comparator, value)
}

// ==================== Condition Tests ====================

#[test]
fn test_parse_colon_condition() {
    let filter = FilterParser::parse("priority:p1").unwrap();
    assert_eq!(filter, cond("priority", Comparator::Colon, "p1"));
}

#[test]
fn test_parse_field_is_lowercased() {
    let filter = FilterParser::parse("Status:Active").unwrap();
    assert_eq!(filter, cond("status", Comparator::Colon, "Active"));
}

#[test]
fn test_parse_comparators() {
    let cases = [
        ("comments=3", Comparator::Eq),
        ("comments!=3", Comparator::Ne),
        ("comments<3", Comparator::Lt),
        ("comments>3", Comparator::Gt),
        ("comments<=3", Comparator::Le),
        ("comments>=3", Comparator::Ge),
    ];
    for (query, comparator) in cases {
        assert_eq!(
            FilterParser::parse(query).unwrap(),
            cond("comments", comparator, "3"),
            "query: {query}"
        );
    }
}

#[test]
fn test_parse_whitespace_around_comparator() {
    assert_eq!(
        FilterParser::parse("  comments >= 5 ").unwrap(),
        cond("comments", Comparator::Ge, "5")
    );
    assert_eq!(
        FilterParser::parse("due : today").unwrap(),
        cond("due", Comparator::Colon, "today")
    );
}

#[test]
fn test_parse_quoted_value_is_unquoted() {
    let filter = FilterParser::parse("search:\"buy milk\"").unwrap();
    assert_eq!(filter, cond("search", Comparator::Colon, "buy milk"));
}

#[test]
fn test_parse_quoted_keyword_is_a_value() {
    let filter = FilterParser::parse("search:\"and\"").unwrap();
    assert_eq!(filter, cond("search", Comparator::Colon, "and"));
}

// ==================== Range Tests ====================

#[test]
fn test_parse_range_form() {
    let filter = FilterParser::parse("due:2025-01-01 2025-12-31").unwrap();
    assert_eq!(
        filter,
        Filter::Condition(Condition::between("due", "2025-01-01", "2025-12-31"))
    );
}

#[test]
fn test_parse_range_not_taken_before_operator() {
    let filter = FilterParser::parse("due:today AND priority:p1").unwrap();
    assert_eq!(
        filter,
        Filter::and(
            cond("due", Comparator::Colon, "today"),
            cond("priority", Comparator::Colon, "p1")
        )
    );
}

#[test]
fn test_parse_range_not_taken_when_next_word_starts_condition() {
    // `status:active` is left over as trailing tokens
    let filter = FilterParser::parse("priority:p1 status:active").unwrap();
    assert_eq!(filter, cond("priority", Comparator::Colon, "p1"));
}

#[test]
fn test_parse_range_only_after_colon() {
    // `4` after `>=` is not a range bound, it is a trailing token
    let filter = FilterParser::parse("comments>=1 4").unwrap();
    assert_eq!(filter, cond("comments", Comparator::Ge, "1"));
}

// ==================== Boolean Operator Tests ====================

#[test]
fn test_parse_and() {
    let filter = FilterParser::parse("priority:p1 AND status:active").unwrap();
    assert_eq!(
        filter,
        Filter::and(
            cond("priority", Comparator::Colon, "p1"),
            cond("status", Comparator::Colon, "active")
        )
    );
}

#[test]
fn test_parse_operators_case_insensitive() {
    let upper = FilterParser::parse("priority:p1 OR NOT status:done").unwrap();
    let lower = FilterParser::parse("priority:p1 or not status:done").unwrap();
    let mixed = FilterParser::parse("priority:p1 Or NoT status:done").unwrap();
    assert_eq!(upper, lower);
    assert_eq!(upper, mixed);
}

#[test]
fn test_parse_and_binds_tighter_than_or() {
    let filter = FilterParser::parse("a:1 OR b:2 AND c:3").unwrap();
    assert_eq!(
        filter,
        Filter::or(
            cond("a", Comparator::Colon, "1"),
            Filter::and(
                cond("b", Comparator::Colon, "2"),
                cond("c", Comparator::Colon, "3")
            )
        )
    );
}

#[test]
fn test_parse_not_binds_tighter_than_and() {
    let filter = FilterParser::parse("NOT a:1 AND b:2").unwrap();
    assert_eq!(
        filter,
        Filter::and(
            Filter::negate(cond("a", Comparator::Colon, "1")),
            cond("b", Comparator::Colon, "2")
        )
    );
}

#[test]
fn test_parse_double_not() {
    let filter = FilterParser::parse("not not a:1").unwrap();
    assert_eq!(
        filter,
        Filter::negate(Filter::negate(cond("a", Comparator::Colon, "1")))
    );
}

#[test]
fn test_parse_left_associative() {
    let filter = FilterParser::parse("a:1 AND b:2 AND c:3").unwrap();
    assert_eq!(
        filter,
        Filter::and(
            Filter::and(
                cond("a", Comparator::Colon, "1"),
                cond("b", Comparator::Colon, "2")
            ),
            cond("c", Comparator::Colon, "3")
        )
    );
}

// ==================== Grouping Tests ====================

#[test]
fn test_parse_parentheses_change_grouping() {
    let filter = FilterParser::parse("(priority:p1 OR priority:p2) AND status:active").unwrap();
    assert_eq!(
        filter,
        Filter::and(
            Filter::or(
                cond("priority", Comparator::Colon, "p1"),
                cond("priority", Comparator::Colon, "p2")
            ),
            cond("status", Comparator::Colon, "active")
        )
    );
}

#[test]
fn test_parse_nested_parentheses() {
    let filter = FilterParser::parse("((a:1))").unwrap();
    assert_eq!(filter, cond("a", Comparator::Colon, "1"));
}

#[test]
fn test_parse_missing_close_paren_is_tolerated() {
    let filter = FilterParser::parse("(a:1 OR b:2").unwrap();
    assert_eq!(
        filter,
        Filter::or(
            cond("a", Comparator::Colon, "1"),
            cond("b", Comparator::Colon, "2")
        )
    );
}

// ==================== Error Tests ====================

#[test]
fn test_parse_empty() {
    assert_eq!(FilterParser::parse(""), Err(FilterError::EmptyExpression));
    assert_eq!(FilterParser::parse("   "), Err(FilterError::EmptyExpression));
}

#[test]
fn test_parse_dangling_operator() {
    assert_eq!(
        FilterParser::parse("priority:p1 AND"),
        Err(FilterError::UnexpectedEndOfInput)
    );
    assert_eq!(FilterParser::parse("NOT"), Err(FilterError::UnexpectedEndOfInput));
}

#[test]
fn test_parse_leading_operator() {
    let err = FilterParser::parse("OR priority:p1").unwrap_err();
    assert_eq!(err, FilterError::unexpected_token("OR", 0));
}

#[test]
fn test_parse_missing_comparator() {
    assert_eq!(
        FilterParser::parse("bogus"),
        Err(FilterError::missing_comparator("bogus"))
    );
}

#[test]
fn test_parse_missing_value() {
    assert_eq!(
        FilterParser::parse("priority:"),
        Err(FilterError::UnexpectedEndOfInput)
    );
    assert_eq!(
        FilterParser::parse("priority:)"),
        Err(FilterError::unexpected_token(")", 9))
    );
}

#[test]
fn test_parse_stray_close_paren() {
    let err = FilterParser::parse(")").unwrap_err();
    assert_eq!(err, FilterError::unexpected_token(")", 0));
}

#[test]
fn test_parse_garbage_never_panics() {
    for query in ["bogus$$field", "::", "((((", "!=!=", "\"", "a:b:c", ")(", "NOT NOT"] {
        let _ = FilterParser::parse(query);
        let _ = FilterParser::parse_strict(query);
    }
}

// ==================== Strict Mode Tests ====================

#[test]
fn test_parse_strict_accepts_valid_query() {
    let strict = FilterParser::parse_strict("(priority:p1 OR due:today) AND NOT status:done");
    let lenient = FilterParser::parse("(priority:p1 OR due:today) AND NOT status:done");
    assert_eq!(strict, lenient);
}

#[test]
fn test_parse_strict_rejects_unclosed_paren() {
    assert_eq!(
        FilterParser::parse_strict("(priority:p1"),
        Err(FilterError::UnclosedParenthesis)
    );
}

#[test]
fn test_parse_strict_rejects_trailing_tokens() {
    assert_eq!(
        FilterParser::parse_strict("priority:p1 status:active"),
        Err(FilterError::unexpected_token("status", 12))
    );
}

#[test]
fn test_parse_strict_rejects_unknown_field_with_suggestion() {
    assert_eq!(
        FilterParser::parse_strict("prority:p1"),
        Err(FilterError::unknown_field("prority", Some("priority".to_string())))
    );
}

#[test]
fn test_parse_strict_unknown_field_without_suggestion() {
    assert_eq!(
        FilterParser::parse_strict("zzzzzzzzzz:1"),
        Err(FilterError::unknown_field("zzzzzzzzzz", None))
    );
}

#[test]
fn test_unknown_field_message() {
    let err = FilterError::unknown_field("lable", Some("label".to_string()));
    assert_eq!(
        err.to_string(),
        "unknown filter field 'lable'. Did you mean 'label'?"
    );
}

// ==================== AST Helper Tests ====================

#[test]
fn test_filter_conditions_in_order() {
    let filter = FilterParser::parse("a:1 AND (NOT b:2 OR c:3)").unwrap();
    let fields: Vec<&str> = filter
        .conditions()
        .iter()
        .map(|c| c.field.as_str())
        .collect();
    assert_eq!(fields, vec!["a", "b", "c"]);
}
