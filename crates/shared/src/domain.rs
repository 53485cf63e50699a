use std::fmt;

use serde::{Deserialize, Serialize};

/// Fields of the calculator form, named by their DOM ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    FirstNumber,
    Operator,
    SecondNumber,
    Result,
}

impl FormField {
    pub const INPUTS: [FormField; 3] = [
        FormField::FirstNumber,
        FormField::Operator,
        FormField::SecondNumber,
    ];

    pub const ALL: [FormField; 4] = [
        FormField::FirstNumber,
        FormField::Operator,
        FormField::SecondNumber,
        FormField::Result,
    ];

    pub fn id(self) -> &'static str {
        match self {
            FormField::FirstNumber => "firstNumber",
            FormField::Operator => "operator",
            FormField::SecondNumber => "secondNumber",
            FormField::Result => "result",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Raw input values read from the form at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub first_number: String,
    pub operator: String,
    pub second_number: String,
}

impl FormValues {
    pub fn new(
        first_number: impl Into<String>,
        operator: impl Into<String>,
        second_number: impl Into<String>,
    ) -> Self {
        Self {
            first_number: first_number.into(),
            operator: operator.into(),
            second_number: second_number.into(),
        }
    }

    /// Plain string concatenation; no trimming, delimiters or escaping.
    pub fn expression(&self) -> Expression {
        let mut raw = String::with_capacity(
            self.first_number.len() + self.operator.len() + self.second_number.len(),
        );
        raw.push_str(&self.first_number);
        raw.push_str(&self.operator);
        raw.push_str(&self.second_number);
        Expression(raw)
    }
}

/// The literal string posted to the calculation service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Expression(pub String);

impl Expression {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parity color the service attaches when asked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultColor {
    Red,
    Green,
}
