//! Field cleaning: raw strings in, typed values or per-field errors out.

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::schema::{FieldKind, FieldSpec};
use super::{messages, FieldErrors, FormData};
use crate::models::Money;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"];

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern compiles")
    })
}

/// A cleaned field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    /// Persisted value of a choice field
    Choice(&'static str),
    Date(NaiveDate),
    Time(NaiveTime),
    Decimal(Money),
    Boolean(bool),
    Reference(i64),
}

/// Typed values for the fields that were present and valid.
#[derive(Debug, Clone, Default)]
pub struct CleanedData {
    values: BTreeMap<&'static str, FieldValue>,
}

/// Clean every field in `fields`, collecting all errors before returning.
///
/// Keys in `form` that are not in the table are ignored.
pub fn clean(form: &FormData, fields: &[FieldSpec]) -> Result<CleanedData, FieldErrors> {
    let mut cleaned = CleanedData::default();
    let mut errors = FieldErrors::new();

    for spec in fields {
        let raw = form
            .get(spec.name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty());

        let Some(raw) = raw else {
            if spec.required {
                errors.add(spec.name, messages::REQUIRED);
            }
            continue;
        };

        match clean_value(spec, raw) {
            Ok(value) => {
                cleaned.values.insert(spec.name, value);
            }
            Err(message) => errors.add(spec.name, message),
        }
    }

    if errors.is_empty() {
        Ok(cleaned)
    } else {
        Err(errors)
    }
}

fn clean_value(spec: &FieldSpec, raw: &str) -> Result<FieldValue, String> {
    if let Some(max) = spec.max_length {
        let len = raw.chars().count();
        if len > max {
            return Err(format!(
                "Ensure this value has at most {} characters (it has {}).",
                max, len
            ));
        }
    }

    match spec.kind {
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::Email => {
            if email_regex().is_match(raw) {
                Ok(FieldValue::Text(raw.to_string()))
            } else {
                Err(messages::INVALID_EMAIL.to_string())
            }
        }
        FieldKind::Integer { min, max } => {
            let value: i64 = raw
                .parse()
                .map_err(|_| messages::INVALID_INTEGER.to_string())?;
            if value < min {
                return Err(format!(
                    "Ensure this value is greater than or equal to {}.",
                    min
                ));
            }
            if value > max {
                return Err(format!("Ensure this value is less than or equal to {}.", max));
            }
            Ok(FieldValue::Integer(value))
        }
        FieldKind::Choice(set) => set
            .normalize(raw)
            .map(FieldValue::Choice)
            .ok_or_else(|| messages::invalid_choice(raw)),
        FieldKind::Date => DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
            .map(FieldValue::Date)
            .ok_or_else(|| messages::INVALID_DATE.to_string()),
        FieldKind::Time => TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
            .map(FieldValue::Time)
            .ok_or_else(|| messages::INVALID_TIME.to_string()),
        FieldKind::Decimal => raw
            .parse::<Money>()
            .map(FieldValue::Decimal)
            .map_err(|e| e.to_string()),
        FieldKind::Boolean => parse_bool(raw)
            .map(FieldValue::Boolean)
            .ok_or_else(|| messages::INVALID_BOOLEAN.to_string()),
        FieldKind::Reference(_) => match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(FieldValue::Reference(id)),
            _ => Err(messages::INVALID_REFERENCE.to_string()),
        },
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn missing(field: &str) -> FieldErrors {
    FieldErrors::single(field, messages::REQUIRED)
}

impl CleanedData {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn text(&self, field: &str) -> Result<String, FieldErrors> {
        self.optional_text(field).ok_or_else(|| missing(field))
    }

    pub fn optional_text(&self, field: &str) -> Option<String> {
        match self.values.get(field) {
            Some(FieldValue::Text(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Optional free text, empty when absent.
    pub fn text_or_empty(&self, field: &str) -> String {
        self.optional_text(field).unwrap_or_default()
    }

    pub fn integer(&self, field: &str) -> Result<i64, FieldErrors> {
        match self.values.get(field) {
            Some(FieldValue::Integer(v)) => Ok(*v),
            _ => Err(missing(field)),
        }
    }

    /// Read a choice field through the enum's own parser.
    pub fn choice<T>(&self, field: &str, parse: fn(&str) -> Option<T>) -> Result<T, FieldErrors> {
        self.optional_choice(field, parse)
            .ok_or_else(|| missing(field))
    }

    pub fn optional_choice<T>(&self, field: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
        match self.values.get(field) {
            Some(FieldValue::Choice(v)) => parse(v),
            _ => None,
        }
    }

    pub fn date(&self, field: &str) -> Result<NaiveDate, FieldErrors> {
        self.optional_date(field).ok_or_else(|| missing(field))
    }

    pub fn optional_date(&self, field: &str) -> Option<NaiveDate> {
        match self.values.get(field) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn time(&self, field: &str) -> Result<NaiveTime, FieldErrors> {
        match self.values.get(field) {
            Some(FieldValue::Time(t)) => Ok(*t),
            _ => Err(missing(field)),
        }
    }

    pub fn decimal(&self, field: &str) -> Result<Money, FieldErrors> {
        match self.values.get(field) {
            Some(FieldValue::Decimal(m)) => Ok(*m),
            _ => Err(missing(field)),
        }
    }

    /// Unchecked boxes are absent from form input, so absent means false.
    pub fn flag(&self, field: &str) -> bool {
        matches!(self.values.get(field), Some(FieldValue::Boolean(true)))
    }

    pub fn optional_flag(&self, field: &str) -> Option<bool> {
        match self.values.get(field) {
            Some(FieldValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn reference(&self, field: &str) -> Result<i64, FieldErrors> {
        match self.values.get(field) {
            Some(FieldValue::Reference(id)) => Ok(*id),
            _ => Err(missing(field)),
        }
    }
}
