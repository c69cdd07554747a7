//! Declarative submission form.

use std::collections::HashMap;
use std::fmt;

use crate::{DocumentKind, PersonDetails, PersonRecord, Status};

pub const KEY_FULL_NAME: &str = "vollstaendiger_name";
pub const KEY_BIRTH_DATE: &str = "geburtsdatum";
pub const KEY_BIRTH_PLACE: &str = "geburtsort_nationalitaet";
pub const KEY_HEIGHT: &str = "groesse";
pub const KEY_GENDER: &str = "geschlecht";

/// One input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Record field the value is stored under.
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub required: bool,
    /// Limit in characters.
    pub max_len: Option<usize>,
}

/// A titled list of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    pub title: &'static str,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    TooLong { max_len: usize },
}

/// Validation failure for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub key: &'static str,
    pub label: &'static str,
    pub problem: FieldProblem,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.problem {
            FieldProblem::Missing => write!(f, "{}: required", self.label),
            FieldProblem::TooLong { max_len } => {
                write!(f, "{}: at most {} characters", self.label, max_len)
            }
        }
    }
}

impl FormSchema {
    /// The five-field identity document form.
    pub fn document(kind: DocumentKind) -> Self {
        let field = |key: &'static str, label: &'static str, placeholder: &'static str, max_len: usize| FieldSpec {
            key,
            label,
            placeholder,
            required: true,
            max_len: Some(max_len),
        };

        Self {
            title: if kind.is_forged() {
                "Gefälschte Ausweisdaten"
            } else {
                "Persönliche Daten"
            },
            fields: vec![
                field(KEY_FULL_NAME, "Vorname & Nachname", "Max Mustermann", 100),
                field(KEY_BIRTH_DATE, "Geburtsdatum", "01.01.2000", 32),
                field(KEY_BIRTH_PLACE, "Geburtsort / Nationalität", "Berlin / Deutsch", 100),
                field(KEY_HEIGHT, "Größe", "180cm", 16),
                field(KEY_GENDER, "Geschlecht", "Männlich / Weiblich", 32),
            ],
        }
    }

    /// Check `values` (keyed by field key) against the schema.
    ///
    /// Values are trimmed; keys not in the schema are ignored. All problems
    /// are reported, in field order.
    pub fn validate(&self, values: &HashMap<String, String>) -> Result<ValidatedForm, Vec<FieldError>> {
        let mut accepted = HashMap::new();
        let mut errors = Vec::new();

        for spec in &self.fields {
            let value = values.get(spec.key).map(|v| v.trim()).unwrap_or("");

            if value.is_empty() {
                if spec.required {
                    errors.push(FieldError {
                        key: spec.key,
                        label: spec.label,
                        problem: FieldProblem::Missing,
                    });
                }
                continue;
            }

            if let Some(max_len) = spec.max_len {
                if value.chars().count() > max_len {
                    errors.push(FieldError {
                        key: spec.key,
                        label: spec.label,
                        problem: FieldProblem::TooLong { max_len },
                    });
                    continue;
                }
            }

            accepted.insert(spec.key, value.to_string());
        }

        if errors.is_empty() {
            Ok(ValidatedForm { values: accepted })
        } else {
            Err(errors)
        }
    }
}

/// Values that passed [`FormSchema::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    values: HashMap<&'static str, String>,
}

impl ValidatedForm {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Build a pending record of the given kind.
    pub fn into_record(mut self, kind: DocumentKind) -> PersonRecord {
        let mut take = |key: &str| self.values.remove(key).unwrap_or_default();
        let details = PersonDetails {
            full_name: take(KEY_FULL_NAME),
            birth_date: take(KEY_BIRTH_DATE),
            birth_place: take(KEY_BIRTH_PLACE),
            height: take(KEY_HEIGHT),
            gender: take(KEY_GENDER),
        };
        PersonRecord::new(details, Status::Ausstehend).with_kind(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> HashMap<String, String> {
        [
            (KEY_FULL_NAME, "Max Mustermann"),
            (KEY_BIRTH_DATE, "01.01.2000"),
            (KEY_BIRTH_PLACE, "Berlin / Deutsch"),
            (KEY_HEIGHT, " 180cm "),
            (KEY_GENDER, "Männlich"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn document_form_has_five_required_fields() {
        let schema = FormSchema::document(DocumentKind::Official);
        assert_eq!(schema.fields.len(), 5);
        assert!(schema.fields.iter().all(|f| f.required));
        assert_eq!(schema.title, "Persönliche Daten");
        assert_eq!(FormSchema::document(DocumentKind::Forged).title, "Gefälschte Ausweisdaten");
    }

    #[test]
    fn valid_form_builds_pending_record() {
        let form = FormSchema::document(DocumentKind::Forged).validate(&filled()).unwrap();
        assert_eq!(form.get(KEY_HEIGHT), Some("180cm"));

        let record = form.into_record(DocumentKind::Forged);
        assert_eq!(record.vollstaendiger_name, "Max Mustermann");
        assert_eq!(record.groesse, "180cm");
        assert_eq!(record.status, Status::Ausstehend);
        assert_eq!(record.typ, Some(DocumentKind::Forged));
    }

    #[test]
    fn missing_and_blank_fields_are_reported() {
        let mut values = filled();
        values.remove(KEY_BIRTH_DATE);
        values.insert(KEY_GENDER.to_string(), "   ".to_string());

        let errors = FormSchema::document(DocumentKind::Official)
            .validate(&values)
            .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].key, KEY_BIRTH_DATE);
        assert_eq!(errors[0].problem, FieldProblem::Missing);
        assert_eq!(errors[1].key, KEY_GENDER);
        assert_eq!(errors[1].to_string(), "Geschlecht: required");
    }

    #[test]
    fn length_is_counted_in_characters() {
        let mut values = filled();
        // 16 multi-byte characters fit, 17 do not.
        values.insert(KEY_HEIGHT.to_string(), "ö".repeat(16));
        assert!(FormSchema::document(DocumentKind::Official).validate(&values).is_ok());

        values.insert(KEY_HEIGHT.to_string(), "ö".repeat(17));
        let errors = FormSchema::document(DocumentKind::Official)
            .validate(&values)
            .unwrap_err();
        assert_eq!(errors[0].problem, FieldProblem::TooLong { max_len: 16 });
    }

    #[test]
    fn optional_fields_may_be_empty() {
        let schema = FormSchema {
            title: "t",
            fields: vec![FieldSpec {
                key: "note",
                label: "Notiz",
                placeholder: "",
                required: false,
                max_len: None,
            }],
        };
        let form = schema.validate(&HashMap::new()).unwrap();
        assert_eq!(form.get("note"), None);
    }
}
