use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Expression, ResultColor},
    error::WireError,
};

pub const CALCULATE_PATH: &str = "api/calculate";
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub expression: Expression,
    #[serde(default, skip_serializing_if = "is_false")]
    pub color: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl CalculationRequest {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn to_body(&self) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(self).map_err(WireError::Encode)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResponse {
    pub result: ResultValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ResultColor>,
}

impl CalculationResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, WireError> {
        serde_json::from_slice(body).map_err(WireError::MalformedResult)
    }
}

/// `result` as sent by the service, kept as whatever JSON scalar it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for ResultValue {
    /// Renders the value the way a browser assigns it to a text input:
    /// `null` becomes empty, numbers follow JavaScript's number-to-string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultValue::Null => Ok(()),
            ResultValue::Bool(value) => write!(f, "{value}"),
            ResultValue::Text(text) => f.write_str(text),
            ResultValue::Number(number) => match number.as_f64() {
                Some(value) => f.write_str(&js_number_to_string(value)),
                None => write!(f, "{number}"),
            },
        }
    }
}

/// ECMAScript `Number::toString`: shortest round-trip
/// digits, plain notation for 1e-7 < |v| < 1e21, exponent form otherwise.
pub fn js_number_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".into();
    }
    if value == 0.0 {
        return "0".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.into();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    // `{:e}` yields the shortest round-trip digits, e.g. `9.9999999998e21`.
    let sci = format!("{:e}", value.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        format!("{int_part}.{frac_part}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let e = n - 1;
        let exp_sign = if e >= 0 { '+' } else { '-' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{lead}e{exp_sign}{}", e.abs())
        } else {
            format!("{lead}.{rest}e{exp_sign}{}", e.abs())
        }
    };
    format!("{sign}{body}")
}
