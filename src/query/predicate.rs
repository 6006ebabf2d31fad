//! Typed BTQL filter predicates
//!
//! Filters are assembled as [`Predicate`] values and rendered in one place, so
//! every caller-supplied string reaches the query text through [`quote_literal`].

use std::fmt;
use std::sync::OnceLock;

use serde_json::Value;

use super::QueryError;

/// A dotted field path such as `metadata.userID`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field(String);

impl Field {
    /// Validate a caller-supplied field path
    pub fn parse(name: &str) -> Result<Self, QueryError> {
        static FIELD_RE: OnceLock<regex::Regex> = OnceLock::new();
        let re = FIELD_RE.get_or_init(|| {
            regex::Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
                .expect("field pattern is valid")
        });

        let trimmed = name.trim();
        if re.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(QueryError::InvalidField(name.to_string()))
        }
    }

    /// Field path known at compile time
    pub(crate) fn known(name: &'static str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    NotEq,
    Lt,
    Gt,
    Like,
    NotLike,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::NotEq => "!=",
            FilterOperator::Lt => "<",
            FilterOperator::Gt => ">",
            FilterOperator::Like => "LIKE",
            FilterOperator::NotLike => "NOT LIKE",
        }
    }
}

/// Scalar literal on the right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Int64(i64),
    Float64(f64),
    Bool(bool),
}

impl Literal {
    /// Convert a JSON filter value. `Ok(None)` means the value was `null`.
    pub fn from_json(field: &str, value: &Value) -> Result<Option<Self>, QueryError> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(Literal::Bool(*b))),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Some(Literal::Int64(i)))
                } else if let Some(f) = n.as_f64() {
                    Ok(Some(Literal::Float64(f)))
                } else {
                    Err(QueryError::UnsupportedFilterValue {
                        field: field.to_string(),
                        kind: "out-of-range number",
                    })
                }
            }
            Value::String(s) => Ok(Some(Literal::String(s.clone()))),
            Value::Array(_) => Err(QueryError::UnsupportedFilterValue {
                field: field.to_string(),
                kind: "array",
            }),
            Value::Object(_) => Err(QueryError::UnsupportedFilterValue {
                field: field.to_string(),
                kind: "object",
            }),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => f.write_str(&quote_literal(s)),
            Literal::Int64(i) => write!(f, "{}", i),
            Literal::Float64(v) => write!(f, "{}", v),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Literal),
    /// `now() - interval N hour`
    HoursAgo(u32),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(lit) => write!(f, "{}", lit),
            Operand::HoursAgo(hours) => write!(f, "now() - interval {} hour", hours),
        }
    }
}

/// One condition of a `filter:` clause
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        field: Field,
        operator: FilterOperator,
        operand: Operand,
    },
    IsNull(Field),
    IsNotNull(Field),
}

impl Predicate {
    pub fn compare(field: Field, operator: FilterOperator, operand: Operand) -> Self {
        Predicate::Compare {
            field,
            operator,
            operand,
        }
    }

    /// `field LIKE '%needle%'`
    pub fn contains(field: Field, needle: &str) -> Self {
        Self::compare(
            field,
            FilterOperator::Like,
            Operand::Literal(Literal::String(format!("%{}%", needle))),
        )
    }

    /// `field NOT LIKE '%needle%'`
    pub fn not_contains(field: Field, needle: &str) -> Self {
        Self::compare(
            field,
            FilterOperator::NotLike,
            Operand::Literal(Literal::String(format!("%{}%", needle))),
        )
    }

    pub fn eq(field: Field, literal: Literal) -> Self {
        Self::compare(field, FilterOperator::Eq, Operand::Literal(literal))
    }

    pub fn not_eq(field: Field, literal: Literal) -> Self {
        Self::compare(field, FilterOperator::NotEq, Operand::Literal(literal))
    }

    /// Equality against a JSON value; `null` renders as `IS NULL`
    pub fn eq_json(field: &str, value: &Value) -> Result<Self, QueryError> {
        let parsed = Field::parse(field)?;
        Ok(match Literal::from_json(field, value)? {
            Some(literal) => Self::eq(parsed, literal),
            None => Predicate::IsNull(parsed),
        })
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare {
                field,
                operator,
                operand,
            } => write!(f, "{} {} {}", field, operator.as_str(), operand),
            Predicate::IsNull(field) => write!(f, "{} IS NULL", field),
            Predicate::IsNotNull(field) => write!(f, "{} IS NOT NULL", field),
        }
    }
}

/// Join predicates with `AND`
pub fn render_conjunction(predicates: &[Predicate]) -> String {
    predicates
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Quote a string literal, doubling backslashes and single quotes
pub fn quote_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('\'');
    for ch in raw.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}
