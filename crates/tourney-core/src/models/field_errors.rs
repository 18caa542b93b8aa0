use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::AppError;

/// Field-keyed validation errors collected over a whole request.
///
/// Insertion ordered. The first message recorded for a field wins, later ones
/// for the same field are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field`. Returns false when the field already has one.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> bool {
        let field = field.into();
        if self.contains(&field) {
            return false;
        }
        self.entries.push((field, message.into()));
        true
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.iter().any(|(f, _)| f == field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// Fold another accumulator into this one, keeping existing messages.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.entries {
            self.add(field, message);
        }
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error carrying the map.
    pub fn into_result(self, message: impl Into<String>) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation {
                message: message.into(),
                errors: self,
            })
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(f, m)| (f.clone(), serde_json::Value::String(m.clone())))
                .collect(),
        )
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, message) in &self.entries {
            map.serialize_entry(field, message)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_per_field_wins() {
        let mut errors = FieldErrors::new();
        assert!(errors.add("flagIcon", "Flag Icon file is empty."));
        assert!(!errors.add("flagIcon", "File too large"));
        assert_eq!(errors.get("flagIcon"), Some("Flag Icon file is empty."));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_independent_fields_are_aggregated_in_order() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Name is a required field");
        errors.add("flagIcon", "File too large");
        let fields: Vec<&str> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["name", "flagIcon"]);
    }

    #[test]
    fn test_into_result() {
        assert!(FieldErrors::new().into_result("Validation failed").is_ok());

        let mut errors = FieldErrors::new();
        errors.add("avatar", "Avatar file is empty.");
        match errors.into_result("Validation failed") {
            Err(AppError::Validation { message, errors }) => {
                assert_eq!(message, "Validation failed");
                assert_eq!(errors.get("avatar"), Some("Avatar file is empty."));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_merge_keeps_existing_messages() {
        let mut first = FieldErrors::new();
        first.add("flagIcon", "File too large");
        let mut second = FieldErrors::new();
        second.add("flagIcon", "Flag Icon file is empty.");
        second.add("avatar", "Avatar is a required field");
        first.merge(second);
        assert_eq!(first.get("flagIcon"), Some("File too large"));
        assert_eq!(first.get("avatar"), Some("Avatar is a required field"));
    }

    #[test]
    fn test_serializes_as_object() {
        let mut errors = FieldErrors::new();
        errors.add("flagIcon", "File too large");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "flagIcon": "File too large" }));
        assert_eq!(errors.to_json(), json);
    }
}
