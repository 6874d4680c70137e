//! Lexer (tokenizer) for filter expressions.
//!
//! The lexer never fails. Whitespace, parentheses and `:` separate tokens;
//! `<`, `>`, `=`, `<=`, `>=` and `!=` are comparison tokens; everything else
//! is a word. A double quote toggles quoting, and quoted text (quotes
//! included) stays inside the current word. An unterminated quote runs to
//! the end of the input.

use std::iter::Peekable;
use std::str::Chars;

use super::ast::Comparator;

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken {
    /// The token.
    pub token: FilterToken,
    /// The byte position where the token starts (0-indexed).
    pub position: usize,
}

/// A token in a filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterToken {
    /// A bare or quoted word. Quotes are preserved.
    Word(String),

    /// The `:` separator.
    Colon,

    /// One of `=`, `!=`, `<`, `>`, `<=`, `>=`.
    Comparator(Comparator),

    /// Opening parenthesis `(`.
    OpenParen,

    /// Closing parenthesis `)`.
    CloseParen,
}

impl FilterToken {
    /// Returns the token as it would be written in a query.
    pub fn text(&self) -> String {
        match self {
            FilterToken::Word(word) => word.clone(),
            FilterToken::Colon => ":".to_string(),
            FilterToken::Comparator(op) => op.symbol().to_string(),
            FilterToken::OpenParen => "(".to_string(),
            FilterToken::CloseParen => ")".to_string(),
        }
    }

    /// Returns the keyword (`and`, `or`, `not`) if this is an unquoted
    /// boolean operator word.
    pub fn keyword(&self) -> Option<Keyword> {
        let FilterToken::Word(word) = self else {
            return None;
        };
        if word.eq_ignore_ascii_case("and") {
            Some(Keyword::And)
        } else if word.eq_ignore_ascii_case("or") {
            Some(Keyword::Or)
        } else if word.eq_ignore_ascii_case("not") {
            Some(Keyword::Not)
        } else {
            None
        }
    }
}

/// Boolean operator words, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    And,
    Or,
    Not,
}

/// Lexer for tokenizing filter expressions.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Current byte position in the input string.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if let Some(ch) = c {
            self.position += ch.len_utf8();
        }
        c
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Returns true if `c` ends an unquoted word.
    fn is_separator(c: char) -> bool {
        c.is_whitespace() || matches!(c, '(' | ')' | ':' | '<' | '>' | '=')
    }

    /// Reads a word, honouring double-quoted runs.
    fn read_word(&mut self) -> String {
        let mut word = String::new();
        let mut in_quotes = false;

        while let Some(&c) = self.peek() {
            if c == '"' {
                in_quotes = !in_quotes;
            } else if !in_quotes {
                if Self::is_separator(c) {
                    break;
                }
                // `!=` belongs to the next token
                if c == '!' && self.next_is_equals_after_bang() {
                    break;
                }
            }
            word.push(c);
            self.next_char();
        }
        word
    }

    /// Looks one character past a `!` without consuming anything.
    fn next_is_equals_after_bang(&self) -> bool {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.next() == Some('=')
    }

    /// Reads a comparator starting at `first`, consuming a trailing `=`.
    fn read_comparator(&mut self, first: char) -> Comparator {
        self.next_char();
        let has_equals = self.peek() == Some(&'=');
        let op = match (first, has_equals) {
            ('<', true) => Comparator::Le,
            ('>', true) => Comparator::Ge,
            ('!', true) => Comparator::Ne,
            ('<', false) => Comparator::Lt,
            ('>', false) => Comparator::Gt,
            _ => Comparator::Eq,
        };
        if has_equals && first != '=' {
            self.next_char();
        }
        op
    }

    /// Returns the next token with its position, or None if at end of input.
    pub fn next_token(&mut self) -> Option<PositionedToken> {
        self.skip_whitespace();

        let c = *self.peek()?;
        let position = self.position;

        let token = match c {
            '(' => {
                self.next_char();
                FilterToken::OpenParen
            }
            ')' => {
                self.next_char();
                FilterToken::CloseParen
            }
            ':' => {
                self.next_char();
                FilterToken::Colon
            }
            '<' | '>' | '=' => FilterToken::Comparator(self.read_comparator(c)),
            '!' if self.next_is_equals_after_bang() => {
                FilterToken::Comparator(self.read_comparator(c))
            }
            _ => FilterToken::Word(self.read_word()),
        };

        Some(PositionedToken { token, position })
    }

    /// Collects all tokens into a vector (without positions).
    #[cfg(test)]
    pub fn kinds(self) -> Vec<FilterToken> {
        self.tokenize().into_iter().map(|pt| pt.token).collect()
    }

    /// Collects all tokens with their positions.
    pub fn tokenize(mut self) -> Vec<PositionedToken> {
        let mut tokens = Vec::new();
        while let Some(positioned_token) = self.next_token() {
            tokens.push(positioned_token);
        }
        tokens
    }
}
