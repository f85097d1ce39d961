use crate::value::Value;
use std::cmp::Ordering;
use std::fmt;

/// Comparison operators available to conditional blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    GreaterThanOrEqual,
    SmallerThanOrEqual,
    GreaterThan,
    SmallerThan,
    Equal,
    NotEqual,
    /// Anything else found in the graph. Always evaluates to false.
    Unknown(String),
}

impl Operator {
    pub fn parse(symbol: &str) -> Self {
        match symbol.trim() {
            ">=" => Operator::GreaterThanOrEqual,
            "<=" => Operator::SmallerThanOrEqual,
            ">" => Operator::GreaterThan,
            "<" => Operator::SmallerThan,
            "==" => Operator::Equal,
            "!=" => Operator::NotEqual,
            _ => Operator::Unknown(symbol.to_string()),
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Operator::GreaterThanOrEqual => ordering != Ordering::Less,
            Operator::SmallerThanOrEqual => ordering != Ordering::Greater,
            Operator::GreaterThan => ordering == Ordering::Greater,
            Operator::SmallerThan => ordering == Ordering::Less,
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::Unknown(_) => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::GreaterThanOrEqual => ">=",
            Operator::SmallerThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::SmallerThan => "<",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Unknown(raw) => raw.as_str(),
        };
        f.write_str(symbol)
    }
}

/// Applies `operator` to a stored variable and a comparand.
///
/// Both sides are compared as numbers when both have a numeric reading.
/// Otherwise text is compared with text and booleans with booleans; values of
/// different kinds are unequal and unordered. An unset variable fails every
/// operator.
pub fn evaluate(stored: Option<&Value>, operator: &Operator, comparand: &Value) -> bool {
    let Some(stored) = stored else {
        return false;
    };

    if let (Some(left), Some(right)) = (stored.as_number(), comparand.as_number()) {
        return left
            .partial_cmp(&right)
            .is_some_and(|ordering| operator.accepts(ordering));
    }

    let ordering = match (stored, comparand) {
        (Value::Text(left), Value::Text(right)) => Some(left.cmp(right)),
        (Value::Bool(left), Value::Bool(right)) => Some(left.cmp(right)),
        _ => None,
    };

    match ordering {
        Some(ordering) => operator.accepts(ordering),
        None => *operator == Operator::NotEqual,
    }
}
