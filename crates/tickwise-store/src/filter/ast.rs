//! Abstract Syntax Tree (AST) for filter expressions.

use std::fmt;

/// Represents a parsed filter expression.
///
/// Leaves are [`Condition`]s; inner nodes combine them with boolean
/// operators. `And` and `Or` are built pairwise and left-associative, so
/// `a AND b AND c` becomes `And(And(a, b), c)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// A single `field <comparator> value` test.
    Condition(Condition),

    /// Logical AND of two filters.
    And(Box<Filter>, Box<Filter>),

    /// Logical OR of two filters.
    Or(Box<Filter>, Box<Filter>),

    /// Logical NOT of a filter.
    Not(Box<Filter>),
}

impl Filter {
    /// Creates an AND filter from two filters.
    ///
    /// # Example
    ///
    /// ```
    /// use tickwise_store::filter::{Comparator, Condition, Filter};
    ///
    /// let filter = Filter::and(
    ///     Filter::Condition(Condition::new("priority", Comparator::Colon, "p1")),
    ///     Filter::Condition(Condition::new("status", Comparator::Colon, "active")),
    /// );
    /// assert!(matches!(filter, Filter::And(_, _)));
    /// ```
    pub fn and(left: Filter, right: Filter) -> Self {
        Filter::And(Box::new(left), Box::new(right))
    }

    /// Creates an OR filter from two filters.
    pub fn or(left: Filter, right: Filter) -> Self {
        Filter::Or(Box::new(left), Box::new(right))
    }

    /// Creates a NOT filter from another filter.
    pub fn negate(inner: Filter) -> Self {
        Filter::Not(Box::new(inner))
    }

    /// Shorthand for a leaf condition.
    pub fn condition(
        field: impl Into<String>,
        comparator: Comparator,
        value: impl Into<String>,
    ) -> Self {
        Filter::Condition(Condition::new(field, comparator, value))
    }

    /// Visits every condition in the tree, left to right.
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        match self {
            Filter::Condition(condition) => out.push(condition),
            Filter::And(left, right) | Filter::Or(left, right) => {
                left.collect_conditions(out);
                right.collect_conditions(out);
            }
            Filter::Not(inner) => inner.collect_conditions(out),
        }
    }
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// `:`
    Colon,
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `field:value value2` (inclusive range).
    Between,
}

impl Comparator {
    /// Returns the operator as written in a query.
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Colon => ":",
            Comparator::Eq => "=",
            Comparator::Ne => "!=",
            Comparator::Lt => "<",
            Comparator::Gt => ">",
            Comparator::Le => "<=",
            Comparator::Ge => ">=",
            Comparator::Between => "between",
        }
    }

    /// Returns true for `<`, `>`, `<=` and `>=`.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Comparator::Lt | Comparator::Gt | Comparator::Le | Comparator::Ge
        )
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A leaf test against one task field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Lower-cased field name.
    pub field: String,
    /// How the value is compared.
    pub comparator: Comparator,
    /// The value, with surrounding quotes removed.
    pub value: String,
    /// Upper bound for [`Comparator::Between`].
    pub value2: Option<String>,
}

impl Condition {
    /// Creates a condition; the field name is lower-cased.
    pub fn new(field: impl Into<String>, comparator: Comparator, value: impl Into<String>) -> Self {
        Self {
            field: field.into().to_lowercase(),
            comparator,
            value: value.into(),
            value2: None,
        }
    }

    /// Creates a `field:from to` range condition.
    pub fn between(field: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            value2: Some(to.into()),
            ..Self::new(field, Comparator::Between, from)
        }
    }

    /// Returns the value lower-cased, for keyword comparisons.
    pub fn keyword(&self) -> String {
        self.value.to_lowercase()
    }
}
