#![deny(unsafe_code)]

use std::cmp::Ordering;

/// A scalar cell value.
///
/// Loaded export data only produces `Text` and `Missing`; `Number` appears in
/// typed projections where the schema catalog declares a numeric column.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    Text(String),
    Number(f64),
    Missing,
}

impl Value {
    /// Build a value from a raw export cell. Whitespace-only cells are missing.
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Value::Missing
        } else {
            Value::Text(trimmed.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Numeric view of the value, parsing text cells when they carry a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(value) => Some(*value),
            Value::Text(value) => value.trim().parse::<f64>().ok(),
            Value::Missing => None,
        }
    }

    /// Display text for keys and messages. Missing renders empty.
    pub fn display_text(&self) -> String {
        match self {
            Value::Text(value) => value.clone(),
            Value::Number(value) => format_numeric(*value),
            Value::Missing => String::new(),
        }
    }

    /// Total ordering for sort keys: missing first, then numeric when both
    /// sides parse as numbers, otherwise lexicographic on the text form.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self.is_missing(), other.is_missing()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        }
        self.display_text().cmp(&other.display_text())
    }
}

/// Render a float the way the export writes integers when it can.
pub fn format_numeric(value: f64) -> String {
    if value.is_nan() {
        return String::new();
    }
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        return format!("{}", value as i64);
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cell_trims_and_detects_missing() {
        assert_eq!(Value::from_cell("  "), Value::Missing);
        assert_eq!(Value::from_cell(" x "), Value::Text("x".to_string()));
    }

    #[test]
    fn compare_is_numeric_aware() {
        let a = Value::Text("9".to_string());
        let b = Value::Text("10".to_string());
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(Value::Missing.compare(&a), Ordering::Less);
    }

    #[test]
    fn format_numeric_drops_integral_fraction() {
        assert_eq!(format_numeric(62.0), "62");
        assert_eq!(format_numeric(0.5), "0.5");
    }
}
