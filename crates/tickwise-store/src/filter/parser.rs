//! Recursive descent parser for filter expressions.

use super::ast::{Comparator, Condition, Filter};
use super::error::{FilterError, FilterResult};
use super::evaluator::FieldRegistry;
use super::lexer::{FilterToken, Keyword, Lexer, PositionedToken};

/// Parser for filter query expressions.
///
/// # Grammar
///
/// ```text
/// expression ::= or_expr
/// or_expr    ::= and_expr ("OR" and_expr)*
/// and_expr   ::= unary_expr ("AND" unary_expr)*
/// unary_expr ::= "NOT" unary_expr | primary
/// primary    ::= "(" expression ")" | condition
/// condition  ::= FIELD (":" | "=" | "!=" | "<" | ">" | "<=" | ">=") VALUE [VALUE2]
/// ```
///
/// `AND`, `OR` and `NOT` are matched case-insensitively. `VALUE2` is only
/// read after `:` when the next word is not an operator and does not itself
/// start a condition; it turns the condition into an inclusive range.
///
/// # Operator Precedence (highest to lowest)
///
/// 1. `NOT` - unary
/// 2. `AND` - binary, left-associative
/// 3. `OR` - binary, left-associative
///
/// # Example
///
/// ```
/// use tickwise_store::filter::{Filter, FilterParser};
///
/// let filter = FilterParser::parse("priority:p1 OR priority:p2").unwrap();
/// assert!(matches!(filter, Filter::Or(_, _)));
/// ```
pub struct FilterParser {
    tokens: Vec<PositionedToken>,
    position: usize,
    strict: bool,
}

impl FilterParser {
    /// Parses a filter expression leniently.
    ///
    /// A missing `)` closes the group at end of input, and tokens left over
    /// after a complete expression are ignored.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::EmptyExpression` if the input has no tokens,
    /// `FilterError::UnexpectedEndOfInput` for a dangling operator, and
    /// `FilterError::UnexpectedToken` / `FilterError::MissingComparator`
    /// for malformed conditions.
    pub fn parse(input: &str) -> FilterResult<Filter> {
        Self::parse_with(input, false)
    }

    /// Parses a filter expression, rejecting anything [`parse`](Self::parse)
    /// would tolerate.
    ///
    /// On top of the lenient checks this rejects unclosed parentheses,
    /// trailing tokens and field names unknown to the built-in
    /// [`FieldRegistry`].
    pub fn parse_strict(input: &str) -> FilterResult<Filter> {
        let filter = Self::parse_with(input, true)?;
        FieldRegistry::builtins().check_fields(&filter)?;
        Ok(filter)
    }

    fn parse_with(input: &str, strict: bool) -> FilterResult<Filter> {
        let tokens = Lexer::new(input).tokenize();
        if tokens.is_empty() {
            return Err(FilterError::EmptyExpression);
        }

        let mut parser = Self {
            tokens,
            position: 0,
            strict,
        };
        let filter = parser.parse_expression()?;

        if let Some(remaining) = parser.peek() {
            if strict {
                return Err(FilterError::unexpected_token(
                    remaining.token.text(),
                    remaining.position,
                ));
            }
            tracing::debug!(
                position = remaining.position,
                token = %remaining.token.text(),
                "ignoring trailing filter tokens"
            );
        }

        Ok(filter)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&PositionedToken> {
        self.tokens.get(self.position)
    }

    /// Returns the token after the current one.
    fn peek_second(&self) -> Option<&PositionedToken> {
        self.tokens.get(self.position + 1)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<PositionedToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Checks if the current token matches the expected token.
    fn check(&self, expected: &FilterToken) -> bool {
        self.peek().is_some_and(|pt| &pt.token == expected)
    }

    /// Checks if the current token is the given operator keyword.
    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_some_and(|pt| pt.token.keyword() == Some(keyword))
    }

    /// Parses the top-level expression (OR expression).
    fn parse_expression(&mut self) -> FilterResult<Filter> {
        self.parse_or_expr()
    }

    /// Parses OR expressions: `and_expr ("OR" and_expr)*`
    fn parse_or_expr(&mut self) -> FilterResult<Filter> {
        let mut left = self.parse_and_expr()?;

        while self.check_keyword(Keyword::Or) {
            self.advance();
            let right = self.parse_and_expr()?;
            left = Filter::or(left, right);
        }

        Ok(left)
    }

    /// Parses AND expressions: `unary_expr ("AND" unary_expr)*`
    fn parse_and_expr(&mut self) -> FilterResult<Filter> {
        let mut left = self.parse_unary_expr()?;

        while self.check_keyword(Keyword::And) {
            self.advance();
            let right = self.parse_unary_expr()?;
            left = Filter::and(left, right);
        }

        Ok(left)
    }

    /// Parses unary expressions: `"NOT" unary_expr | primary`
    fn parse_unary_expr(&mut self) -> FilterResult<Filter> {
        if self.check_keyword(Keyword::Not) {
            self.advance();
            let inner = self.parse_unary_expr()?;
            return Ok(Filter::negate(inner));
        }

        self.parse_primary()
    }

    /// Parses primary expressions: `"(" expression ")" | condition`
    fn parse_primary(&mut self) -> FilterResult<Filter> {
        let current = self.advance().ok_or(FilterError::UnexpectedEndOfInput)?;

        match current.token {
            FilterToken::OpenParen => {
                let inner = self.parse_expression()?;
                if self.check(&FilterToken::CloseParen) {
                    self.advance();
                } else if self.strict {
                    return Err(FilterError::UnclosedParenthesis);
                } else {
                    tracing::debug!("closing unterminated filter group");
                }
                Ok(inner)
            }
            FilterToken::Word(ref word) if current.token.keyword().is_none() => {
                self.parse_condition(word)
            }
            other => Err(FilterError::unexpected_token(
                other.text(),
                current.position,
            )),
        }
    }

    /// Parses the rest of a condition after its field name.
    fn parse_condition(&mut self, field: &str) -> FilterResult<Filter> {
        let comparator = match self.peek().map(|pt| &pt.token) {
            Some(FilterToken::Colon) => Comparator::Colon,
            Some(FilterToken::Comparator(op)) => *op,
            _ => return Err(FilterError::missing_comparator(field)),
        };
        self.advance();

        let value = match self.advance() {
            Some(PositionedToken {
                token: FilterToken::Word(word),
                ..
            }) => unquote(&word),
            Some(other) => {
                return Err(FilterError::unexpected_token(
                    other.token.text(),
                    other.position,
                ))
            }
            None => return Err(FilterError::UnexpectedEndOfInput),
        };

        let mut condition = Condition::new(field, comparator, value);
        if comparator == Comparator::Colon {
            if let Some(upper) = self.take_range_bound() {
                condition.comparator = Comparator::Between;
                condition.value2 = Some(upper);
            }
        }

        Ok(Filter::Condition(condition))
    }

    /// Consumes a second value for `field:from to` if one follows.
    fn take_range_bound(&mut self) -> Option<String> {
        let candidate = self.peek()?;
        let FilterToken::Word(word) = &candidate.token else {
            return None;
        };
        if candidate.token.keyword().is_some() {
            return None;
        }
        let starts_condition = matches!(
            self.peek_second().map(|pt| &pt.token),
            Some(FilterToken::Colon | FilterToken::Comparator(_))
        );
        if starts_condition {
            return None;
        }
        let upper = unquote(word);
        self.advance();
        Some(upper)
    }
}

/// Strips one pair of matching surrounding quotes.
fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' || first == b'\'') && (last == b'"' || last == b'\'') {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"buy milk\""), "buy milk");
        assert_eq!(unquote("'single'"), "single");
        assert_eq!(unquote("\"\""), "");
        assert_eq!(unquote("\"open"), "\"open");
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("\""), "\"");
    }
}
