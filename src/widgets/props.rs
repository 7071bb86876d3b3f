//! Read access to an effective property bag during rendering.
//!
//! Lookups follow the builder's fallback rules: a missing value, `null`,
//! `""`, `0` and `false` all yield the caller's fallback.

use crate::ids::to_identifier;
use crate::models::{PropertyBag, RESERVED_ID_KEY};
use serde_json::Value;

#[derive(Debug, Clone, Copy)]
pub struct WidgetProps<'a> {
    bag: &'a PropertyBag,
}

impl<'a> WidgetProps<'a> {
    pub fn new(bag: &'a PropertyBag) -> Self {
        Self { bag }
    }

    pub fn bag(&self) -> &'a PropertyBag {
        self.bag
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.bag.get(key)
    }

    pub fn id(&self) -> &'a str {
        self.bag
            .get(RESERVED_ID_KEY)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Instance id normalized for use inside behaviour identifiers.
    pub fn ident(&self) -> String {
        to_identifier(self.id())
    }

    /// Instance id for element ids in markup.
    pub fn dom_id(&self) -> String {
        escape_html(self.id())
    }

    /// Instance id for element-id string literals in behaviour code.
    pub fn js_id(&self) -> String {
        escape_js(self.id())
    }

    /// Raw text value with fallback.
    pub fn text(&self, key: &str, fallback: &str) -> String {
        match self.bag.get(key) {
            Some(Value::String(value)) if !value.is_empty() => value.clone(),
            Some(Value::Number(number)) if number.as_f64().is_some_and(|n| n != 0.0) => number.to_string(),
            Some(Value::Bool(true)) => "true".to_string(),
            Some(Value::Array(items)) if !items.is_empty() => items
                .iter()
                .map(|item| match item {
                    Value::String(value) => value.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            _ => fallback.to_string(),
        }
    }

    /// Text escaped for markup.
    pub fn html(&self, key: &str, fallback: &str) -> String {
        escape_html(&self.text(key, fallback))
    }

    /// Text escaped for a single-quoted behaviour string literal.
    pub fn js(&self, key: &str, fallback: &str) -> String {
        escape_js(&self.text(key, fallback))
    }

    pub fn number(&self, key: &str, fallback: f64) -> f64 {
        let parsed = match self.bag.get(key) {
            Some(Value::Number(number)) => number.as_f64(),
            Some(Value::String(raw)) => raw.trim().parse::<f64>().ok(),
            Some(Value::Bool(true)) => Some(1.0),
            _ => None,
        };
        match parsed {
            Some(value) if value.is_finite() && value != 0.0 => value,
            _ => fallback,
        }
    }

    /// `refreshInterval` seconds as a millisecond period.
    pub fn interval_ms(&self, fallback_secs: f64) -> String {
        format_number(self.number("refreshInterval", fallback_secs) * 1000.0)
    }

    pub fn flag(&self, key: &str) -> bool {
        is_truthy(self.bag.get(key))
    }

    /// On unless explicitly `false`.
    pub fn enabled(&self, key: &str) -> bool {
        !matches!(self.bag.get(key), Some(Value::Bool(false)))
    }

    pub fn list(&self, key: &str) -> &'a [Value] {
        match self.bag.get(key) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        }
    }
}

pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Prints integral values without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn escape_js(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '<' => escaped.push_str("\\x3C"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape_html, escape_js, format_number, WidgetProps};
    use crate::models::PropertyBag;
    use serde_json::json;

    fn bag(value: serde_json::Value) -> PropertyBag {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn falsy_values_use_fallback() {
        let bag = bag(json!({ "a": "", "b": 0, "c": false, "d": null, "e": "set" }));
        let props = WidgetProps::new(&bag);
        for key in ["a", "b", "c", "d", "missing"] {
            assert_eq!(props.text(key, "fb"), "fb", "key {}", key);
        }
        assert_eq!(props.text("e", "fb"), "set");
    }

    #[test]
    fn numbers_parse_from_strings_and_fall_back_on_zero() {
        let bag = bag(json!({ "refreshInterval": "15", "zero": 0, "max": 2.5 }));
        let props = WidgetProps::new(&bag);
        assert_eq!(props.interval_ms(600.0), "15000");
        assert_eq!(props.number("zero", 30.0), 30.0);
        assert_eq!(props.number("max", 1.0), 2.5);
    }

    #[test]
    fn enabled_is_only_off_when_false() {
        let bag = bag(json!({ "off": false, "zero": 0 }));
        let props = WidgetProps::new(&bag);
        assert!(!props.enabled("off"));
        assert!(props.enabled("zero"));
        assert!(props.enabled("missing"));
        assert!(!props.flag("zero"));
    }

    #[test]
    fn ident_normalizes_instance_id() {
        let bag = bag(json!({ "id": "w-1a" }));
        assert_eq!(WidgetProps::new(&bag).ident(), "w_1a");
    }

    #[test]
    fn escapes_markup_and_script_text() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
        assert_eq!(escape_js("it's\n</script>"), "it\\'s\\n\\x3C/script>");
    }

    #[test]
    fn formats_integral_numbers_without_fraction() {
        assert_eq!(format_number(600000.0), "600000");
        assert_eq!(format_number(0.5), "0.5");
    }
}
