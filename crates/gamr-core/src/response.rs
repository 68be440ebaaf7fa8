//! Questionnaire response values.

use serde::{Deserialize, Serialize};

/// The value recorded for a single question.
///
/// Serialized with an explicit discriminator:
/// `{"type": "boolean", "value": true}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ResponseValue {
    /// Yes/no answer
    Boolean(bool),
    /// Free-text answer
    Text(String),
    /// Numeric rating
    Number(f64),
}

impl ResponseValue {
    /// Returns the value used in weighted roll-ups.
    ///
    /// `true` counts as 1.0 and `false` as 0.0. Text answers are not
    /// scorable, nor are non-finite numbers.
    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            ResponseValue::Boolean(true) => Some(1.0),
            ResponseValue::Boolean(false) => Some(0.0),
            ResponseValue::Number(n) if n.is_finite() => Some(*n),
            ResponseValue::Number(_) => None,
            ResponseValue::Text(_) => None,
        }
    }

    /// Returns the text of a text answer.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Discriminator name.
    pub fn kind(&self) -> &'static str {
        match self {
            ResponseValue::Boolean(_) => "boolean",
            ResponseValue::Text(_) => "text",
            ResponseValue::Number(_) => "number",
        }
    }
}

/// An answer to one question of an evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub question_id: String,
    pub value: ResponseValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Response {
    pub fn new(question_id: impl Into<String>, value: ResponseValue) -> Self {
        Self {
            question_id: question_id.into(),
            value,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_value() {
        assert_eq!(ResponseValue::Boolean(true).numeric_value(), Some(1.0));
        assert_eq!(ResponseValue::Boolean(false).numeric_value(), Some(0.0));
        assert_eq!(ResponseValue::Number(3.5).numeric_value(), Some(3.5));
        assert_eq!(ResponseValue::Number(f64::NAN).numeric_value(), None);
        assert_eq!(
            ResponseValue::Text("firewall in place".to_string()).numeric_value(),
            None
        );
    }

    #[test]
    fn test_tagged_serialization() {
        let json = serde_json::to_string(&ResponseValue::Boolean(true)).unwrap();
        assert_eq!(json, r#"{"type":"boolean","value":true}"#);

        let value: ResponseValue =
            serde_json::from_str(r#"{"type":"text","value":"no backups"}"#).unwrap();
        assert_eq!(value.as_text(), Some("no backups"));
        assert_eq!(value.kind(), "text");

        let value: ResponseValue = serde_json::from_str(r#"{"type":"number","value":4}"#).unwrap();
        assert_eq!(value, ResponseValue::Number(4.0));
    }

    #[test]
    fn test_mismatched_payload_rejected() {
        let result: Result<ResponseValue, _> =
            serde_json::from_str(r#"{"type":"boolean","value":"yes"}"#);
        assert!(result.is_err());

        let result: Result<ResponseValue, _> = serde_json::from_str(r#"{"type":"date","value":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_response_with_comment() {
        let response =
            Response::new("q1", ResponseValue::Boolean(false)).with_comment("Planned for Q3");
        assert_eq!(response.question_id, "q1");
        assert_eq!(response.comment.as_deref(), Some("Planned for Q3"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["value"]["type"], "boolean");
    }
}
