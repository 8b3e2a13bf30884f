//! Value enum for dynamic cell values

use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;

/// A single cell of the dataset.
///
/// Payload cells arrive as arbitrary JSON scalars, so the enum is untagged and
/// decodes directly from the widget data array.
///
/// # Example
///
/// ```
/// use lumina::model::CellValue;
///
/// let name = CellValue::from("Contoso");
/// let revenue = CellValue::from(2.0);
/// assert_eq!(revenue.display(), "2");
/// assert_eq!(CellValue::Null.display(), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text value, possibly pre-rendered markup in HTML columns.
    Text(String),
    /// Fallback for nested JSON (arrays, objects).
    Json(serde_json::Value),
}

impl CellValue {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Stringifies the value the way it is shown to the user.
    ///
    /// Integral numbers print without a fractional part and `Null` prints as
    /// the empty string.
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Json(v) => v.to_string(),
        }
    }

    /// Parses the value as a finite number.
    ///
    /// Numbers pass through, text is trimmed and parsed. Empty text, booleans
    /// and non-finite results yield `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Converts the value to JSON for the host.
    ///
    /// Integral numbers become JSON integers (`2`, not `2.0`); non-finite
    /// numbers become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                Value::from(*n as i64)
            }
            CellValue::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Json(v) => v.clone(),
        }
    }
}

/// Largest integer an f64 holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Formats a number like the host language prints it.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        // f64 Display already omits ".0" for integral values
        n.to_string()
    }
}

/// Parses trimmed text as a finite number.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Compares two strings with a locale-style collation.
///
/// Letters compare case-insensitively first; at equal primary weight the
/// lowercase form sorts before the uppercase one (`"a" < "A" < "b"`).
pub fn collate(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    primary.then_with(|| b.cmp(a))
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<Option<CellValue>> for CellValue {
    fn from(value: Option<CellValue>) -> Self {
        value.unwrap_or(CellValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_numbers() {
        assert_eq!(CellValue::from(2.0).display(), "2");
        assert_eq!(CellValue::from(2.5).display(), "2.5");
        assert_eq!(CellValue::from(-3).display(), "-3");
        assert_eq!(CellValue::Number(f64::INFINITY).display(), "Infinity");
    }

    #[test]
    fn test_as_number() {
        assert_eq!(CellValue::from(" 12.5 ").as_number(), Some(12.5));
        assert_eq!(CellValue::from("").as_number(), None);
        assert_eq!(CellValue::from("abc").as_number(), None);
        assert_eq!(CellValue::from("inf").as_number(), None);
        assert_eq!(CellValue::Bool(true).as_number(), None);
        assert_eq!(CellValue::Null.as_number(), None);
    }

    #[test]
    fn test_collate_case_insensitive_primary() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("Banana", "apple"), Ordering::Greater);
        assert_eq!(collate("a", "A"), Ordering::Less);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_integral_numbers_stay_integers_in_json() {
        assert_eq!(CellValue::Number(2.0).to_json(), serde_json::json!(2));
        assert!(CellValue::Number(2.0).to_json().is_i64());
        assert_eq!(CellValue::Number(-7.0).to_json(), serde_json::json!(-7));
        assert_eq!(CellValue::Number(2.5).to_json(), serde_json::json!(2.5));
        assert_eq!(CellValue::Number(f64::NAN).to_json(), serde_json::Value::Null);
        assert_eq!(CellValue::from("2").to_json(), serde_json::json!("2"));
    }

    #[test]
    fn test_decode_untagged() {
        let cells: Vec<CellValue> = serde_json::from_str(r#"[null, true, 3, "x", [1]]"#).unwrap();
        assert_eq!(cells[0], CellValue::Null);
        assert_eq!(cells[1], CellValue::Bool(true));
        assert_eq!(cells[2], CellValue::Number(3.0));
        assert_eq!(cells[3], CellValue::from("x"));
        assert!(matches!(cells[4], CellValue::Json(_)));
    }
}
