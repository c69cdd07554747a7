//! Identity-document records as stored on disk.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::StoreResult;

/// Creation timestamp format, UTC.
pub const TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Review state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Ausstehend,
    Angenommen,
    Bearbeitung,
    Abgelehnt,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ausstehend => "ausstehend",
            Status::Angenommen => "angenommen",
            Status::Bearbeitung => "bearbeitung",
            Status::Abgelehnt => "abgelehnt",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ausstehend" => Ok(Status::Ausstehend),
            "angenommen" => Ok(Status::Angenommen),
            "bearbeitung" => Ok(Status::Bearbeitung),
            "abgelehnt" => Ok(Status::Abgelehnt),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// Whether the requested document is genuine or forged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DocumentKind {
    #[default]
    #[serde(rename = "O")]
    Official,
    #[serde(rename = "G")]
    Forged,
}

impl DocumentKind {
    pub fn code(&self) -> &'static str {
        match self {
            DocumentKind::Official => "O",
            DocumentKind::Forged => "G",
        }
    }

    pub fn is_forged(&self) -> bool {
        matches!(self, DocumentKind::Forged)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

/// The five user-supplied fields of a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonDetails {
    pub full_name: String,
    pub birth_date: String,
    pub birth_place: String,
    pub height: String,
    pub gender: String,
}

/// One stored request.
///
/// Fields this type does not know about are kept in `extra` and written
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub nick: String,
    pub vollstaendiger_name: String,
    pub geburtsdatum: String,
    pub geburtsort_nationalitaet: String,
    pub groesse: String,
    pub geschlecht: String,
    pub status: Status,
    #[serde(default)]
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<DocumentKind>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PersonRecord {
    /// New record with a fresh uuid, the current time and `nick == uuid`.
    pub fn new(details: PersonDetails, status: Status) -> Self {
        let uuid = uuid::Uuid::new_v4().to_string();
        Self {
            nick: uuid.clone(),
            uuid,
            vollstaendiger_name: details.full_name,
            geburtsdatum: details.birth_date,
            geburtsort_nationalitaet: details.birth_place,
            groesse: details.height,
            geschlecht: details.gender,
            status,
            time: Utc::now().format(TIME_FORMAT).to_string(),
            typ: None,
            extra: Map::new(),
        }
    }

    pub fn with_kind(mut self, kind: DocumentKind) -> Self {
        self.typ = Some(kind);
        self
    }

    /// Parse a stored object, filling in a missing uuid, nick or time.
    pub fn from_value(value: Value) -> StoreResult<Self> {
        let mut record: PersonRecord = serde_json::from_value(value)?;
        if record.uuid.is_empty() {
            record.uuid = uuid::Uuid::new_v4().to_string();
        }
        if record.nick.is_empty() {
            record.nick = record.uuid.clone();
        }
        if record.time.is_empty() {
            record.time = Utc::now().format(TIME_FORMAT).to_string();
        }
        Ok(record)
    }

    pub fn to_value(&self) -> StoreResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Document kind, treating a missing `typ` as official.
    pub fn kind(&self) -> DocumentKind {
        self.typ.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use serde_json::json;

    fn details() -> PersonDetails {
        PersonDetails {
            full_name: "Max Mustermann".into(),
            birth_date: "01.01.2000".into(),
            birth_place: "Berlin / Deutsch".into(),
            height: "180cm".into(),
            gender: "Männlich".into(),
        }
    }

    #[test]
    fn new_record_defaults() {
        let record = PersonRecord::new(details(), Status::Ausstehend);

        assert!(uuid::Uuid::parse_str(&record.uuid).is_ok());
        assert_eq!(record.nick, record.uuid);
        assert_eq!(record.status, Status::Ausstehend);
        assert!(NaiveDateTime::parse_from_str(&record.time, TIME_FORMAT).is_ok());
        assert_eq!(record.typ, None);
        assert_eq!(record.kind(), DocumentKind::Official);
    }

    #[test]
    fn serializes_with_stored_field_names() {
        let record = PersonRecord::new(details(), Status::Angenommen).with_kind(DocumentKind::Forged);
        let value = record.to_value().unwrap();

        assert_eq!(value["vollstaendiger_name"], json!("Max Mustermann"));
        assert_eq!(value["geburtsort_nationalitaet"], json!("Berlin / Deutsch"));
        assert_eq!(value["status"], json!("angenommen"));
        assert_eq!(value["typ"], json!("G"));
    }

    #[test]
    fn typ_omitted_when_unset() {
        let value = PersonRecord::new(details(), Status::Ausstehend).to_value().unwrap();
        assert!(value.get("typ").is_none());
    }

    #[test]
    fn from_value_fills_missing_identity_fields() {
        let record = PersonRecord::from_value(json!({
            "vollstaendiger_name": "Erika Musterfrau",
            "geburtsdatum": "02.02.1990",
            "geburtsort_nationalitaet": "Hamburg / Deutsch",
            "groesse": "170cm",
            "geschlecht": "Weiblich",
            "status": "bearbeitung"
        }))
        .unwrap();

        assert!(!record.uuid.is_empty());
        assert_eq!(record.nick, record.uuid);
        assert!(!record.time.is_empty());
        assert_eq!(record.status, Status::Bearbeitung);
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let stored = json!({
            "uuid": "u-1",
            "nick": "Erika",
            "vollstaendiger_name": "Erika Musterfrau",
            "geburtsdatum": "02.02.1990",
            "geburtsort_nationalitaet": "Hamburg / Deutsch",
            "groesse": "170cm",
            "geschlecht": "Weiblich",
            "status": "ausstehend",
            "time": "01.03.2024 12:00",
            "reviewer": "99"
        });

        let record = PersonRecord::from_value(stored.clone()).unwrap();
        assert_eq!(record.extra.get("reviewer"), Some(&json!("99")));
        assert_eq!(record.to_value().unwrap(), stored);
    }

    #[test]
    fn missing_required_field_is_error() {
        assert!(PersonRecord::from_value(json!({"status": "ausstehend"})).is_err());
    }

    #[test]
    fn status_parsing() {
        assert_eq!("Angenommen".parse::<Status>().unwrap(), Status::Angenommen);
        assert_eq!(" abgelehnt ".parse::<Status>().unwrap(), Status::Abgelehnt);
        assert!("approved".parse::<Status>().is_err());
        assert_eq!(Status::Bearbeitung.to_string(), "bearbeitung");
    }
}
