//! Choice rules: comparisons on the state input plus And / Or / Not combinators.
//!
//! A rule is checked when it is added to a Choice state (`State::add_choice`):
//! variables must be paths, and the literal must have the type the operator
//! compares (string, number, boolean, timestamp string, or a path for `*Path`
//! operators).

use serde_json::{Map, Value};

use crate::error::GraphError;

/// Comparison operators of the States language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    StringEquals,
    StringEqualsPath,
    StringLessThan,
    StringLessThanPath,
    StringGreaterThan,
    StringGreaterThanPath,
    StringLessThanEquals,
    StringLessThanEqualsPath,
    StringGreaterThanEquals,
    StringGreaterThanEqualsPath,
    StringMatches,
    NumericEquals,
    NumericEqualsPath,
    NumericLessThan,
    NumericLessThanPath,
    NumericGreaterThan,
    NumericGreaterThanPath,
    NumericLessThanEquals,
    NumericLessThanEqualsPath,
    NumericGreaterThanEquals,
    NumericGreaterThanEqualsPath,
    BooleanEquals,
    BooleanEqualsPath,
    TimestampEquals,
    TimestampEqualsPath,
    TimestampLessThan,
    TimestampLessThanPath,
    TimestampGreaterThan,
    TimestampGreaterThanPath,
    TimestampLessThanEquals,
    TimestampLessThanEqualsPath,
    TimestampGreaterThanEquals,
    TimestampGreaterThanEqualsPath,
    IsNull,
    IsPresent,
    IsNumeric,
    IsString,
    IsBoolean,
    IsTimestamp,
}

/// Type of literal an operator compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    String,
    Number,
    Boolean,
    Timestamp,
    /// Another path into the input (`*Path` operators).
    Path,
}

impl ComparisonOperator {
    /// Field name used in the rendered rule, e.g. `"BooleanEquals"`.
    pub fn as_str(&self) -> &'static str {
        use ComparisonOperator::*;
        match self {
            StringEquals => "StringEquals",
            StringEqualsPath => "StringEqualsPath",
            StringLessThan => "StringLessThan",
            StringLessThanPath => "StringLessThanPath",
            StringGreaterThan => "StringGreaterThan",
            StringGreaterThanPath => "StringGreaterThanPath",
            StringLessThanEquals => "StringLessThanEquals",
            StringLessThanEqualsPath => "StringLessThanEqualsPath",
            StringGreaterThanEquals => "StringGreaterThanEquals",
            StringGreaterThanEqualsPath => "StringGreaterThanEqualsPath",
            StringMatches => "StringMatches",
            NumericEquals => "NumericEquals",
            NumericEqualsPath => "NumericEqualsPath",
            NumericLessThan => "NumericLessThan",
            NumericLessThanPath => "NumericLessThanPath",
            NumericGreaterThan => "NumericGreaterThan",
            NumericGreaterThanPath => "NumericGreaterThanPath",
            NumericLessThanEquals => "NumericLessThanEquals",
            NumericLessThanEqualsPath => "NumericLessThanEqualsPath",
            NumericGreaterThanEquals => "NumericGreaterThanEquals",
            NumericGreaterThanEqualsPath => "NumericGreaterThanEqualsPath",
            BooleanEquals => "BooleanEquals",
            BooleanEqualsPath => "BooleanEqualsPath",
            TimestampEquals => "TimestampEquals",
            TimestampEqualsPath => "TimestampEqualsPath",
            TimestampLessThan => "TimestampLessThan",
            TimestampLessThanPath => "TimestampLessThanPath",
            TimestampGreaterThan => "TimestampGreaterThan",
            TimestampGreaterThanPath => "TimestampGreaterThanPath",
            TimestampLessThanEquals => "TimestampLessThanEquals",
            TimestampLessThanEqualsPath => "TimestampLessThanEqualsPath",
            TimestampGreaterThanEquals => "TimestampGreaterThanEquals",
            TimestampGreaterThanEqualsPath => "TimestampGreaterThanEqualsPath",
            IsNull => "IsNull",
            IsPresent => "IsPresent",
            IsNumeric => "IsNumeric",
            IsString => "IsString",
            IsBoolean => "IsBoolean",
            IsTimestamp => "IsTimestamp",
        }
    }

    /// Literal type this operator expects.
    pub fn operand(&self) -> Operand {
        use ComparisonOperator::*;
        let name = self.as_str();
        if name.ends_with("Path") {
            return Operand::Path;
        }
        match self {
            IsNull | IsPresent | IsNumeric | IsString | IsBoolean | IsTimestamp | BooleanEquals => {
                Operand::Boolean
            }
            _ if name.starts_with("String") => Operand::String,
            _ if name.starts_with("Numeric") => Operand::Number,
            _ => Operand::Timestamp,
        }
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single comparison: `Variable` compared to a literal with `operator`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub variable: String,
    pub operator: ComparisonOperator,
    pub value: Value,
}

/// Choice rule: a comparison or a boolean combination of rules.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceRule {
    Comparison(Comparison),
    And(Vec<ChoiceRule>),
    Or(Vec<ChoiceRule>),
    Not(Box<ChoiceRule>),
}

impl ChoiceRule {
    /// Generic constructor; operand type is checked by [`ChoiceRule::validate`].
    pub fn compare(
        variable: impl Into<String>,
        operator: ComparisonOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self::Comparison(Comparison {
            variable: variable.into(),
            operator,
            value: value.into(),
        })
    }

    pub fn string_equals(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Self::compare(variable, ComparisonOperator::StringEquals, value.into())
    }

    pub fn string_matches(variable: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::compare(variable, ComparisonOperator::StringMatches, pattern.into())
    }

    pub fn numeric_equals(variable: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(variable, ComparisonOperator::NumericEquals, value)
    }

    pub fn numeric_less_than(variable: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(variable, ComparisonOperator::NumericLessThan, value)
    }

    pub fn numeric_greater_than(variable: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(variable, ComparisonOperator::NumericGreaterThan, value)
    }

    pub fn boolean_equals(variable: impl Into<String>, value: bool) -> Self {
        Self::compare(variable, ComparisonOperator::BooleanEquals, value)
    }

    pub fn timestamp_equals(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Self::compare(variable, ComparisonOperator::TimestampEquals, value.into())
    }

    pub fn is_present(variable: impl Into<String>, present: bool) -> Self {
        Self::compare(variable, ComparisonOperator::IsPresent, present)
    }

    pub fn is_null(variable: impl Into<String>, null: bool) -> Self {
        Self::compare(variable, ComparisonOperator::IsNull, null)
    }

    pub fn and(rules: Vec<ChoiceRule>) -> Self {
        Self::And(rules)
    }

    pub fn or(rules: Vec<ChoiceRule>) -> Self {
        Self::Or(rules)
    }

    pub fn not(rule: ChoiceRule) -> Self {
        Self::Not(Box::new(rule))
    }

    /// Checks variable paths, operand types and that combinators are non-empty.
    ///
    /// Returns `GraphError::Configuration` describing the first offending comparison.
    pub fn validate(&self) -> Result<(), GraphError> {
        match self {
            Self::Comparison(c) => c.validate(),
            Self::And(rules) | Self::Or(rules) => {
                if rules.is_empty() {
                    return Err(GraphError::configuration(
                        "And/Or choice rule must contain at least one rule",
                    ));
                }
                rules.iter().try_for_each(ChoiceRule::validate)
            }
            Self::Not(rule) => rule.validate(),
        }
    }

    /// Renders the rule body without `Next`.
    pub(crate) fn to_map(&self) -> Map<String, Value> {
        let mut node = Map::new();
        match self {
            Self::Comparison(c) => {
                node.insert("Variable".into(), Value::String(c.variable.clone()));
                node.insert(c.operator.as_str().into(), c.value.clone());
            }
            Self::And(rules) => {
                node.insert("And".into(), render_rules(rules));
            }
            Self::Or(rules) => {
                node.insert("Or".into(), render_rules(rules));
            }
            Self::Not(rule) => {
                node.insert("Not".into(), Value::Object(rule.to_map()));
            }
        }
        node
    }
}

fn render_rules(rules: &[ChoiceRule]) -> Value {
    Value::Array(rules.iter().map(|r| Value::Object(r.to_map())).collect())
}

impl Comparison {
    fn validate(&self) -> Result<(), GraphError> {
        if !self.variable.starts_with('$') {
            return Err(GraphError::configuration(format!(
                "choice rule variable must be a path starting with '$': {}",
                self.variable
            )));
        }
        let ok = match self.operator.operand() {
            Operand::String | Operand::Timestamp => self.value.is_string(),
            Operand::Number => self.value.is_number(),
            Operand::Boolean => self.value.is_boolean(),
            Operand::Path => self
                .value
                .as_str()
                .map(|p| p.starts_with('$'))
                .unwrap_or(false),
        };
        if !ok {
            return Err(GraphError::configuration(format!(
                "choice rule {} on {} expects a {:?} operand, got {}",
                self.operator, self.variable, self.operator.operand(), self.value
            )));
        }
        Ok(())
    }
}
