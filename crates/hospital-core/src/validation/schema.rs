//! Static per-entity field tables.
//!
//! Validation walks these tables for every create and update. Each spec also
//! names the column it lands in, and the schema tests check that every column
//! exists in the SQL layout.

use crate::models::{AppointmentStatus, BloodGroup, Entity, Gender, PaymentMethod};

/// Closed value sets used by choice fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceSet {
    Gender,
    BloodGroup,
    AppointmentStatus,
    PaymentMethod,
}

impl ChoiceSet {
    /// Map user input onto the persisted value, if it is a member.
    pub fn normalize(&self, value: &str) -> Option<&'static str> {
        match self {
            ChoiceSet::Gender => Gender::parse(value).map(|g| g.as_str()),
            ChoiceSet::BloodGroup => BloodGroup::parse(value).map(|b| b.as_str()),
            ChoiceSet::AppointmentStatus => AppointmentStatus::parse(value).map(|s| s.as_str()),
            ChoiceSet::PaymentMethod => PaymentMethod::parse(value).map(|m| m.as_str()),
        }
    }

    /// Persisted values, in declaration order.
    pub fn values(&self) -> Vec<&'static str> {
        match self {
            ChoiceSet::Gender => Gender::ALL.iter().map(|g| g.as_str()).collect(),
            ChoiceSet::BloodGroup => BloodGroup::ALL.iter().map(|b| b.as_str()).collect(),
            ChoiceSet::AppointmentStatus => {
                AppointmentStatus::ALL.iter().map(|s| s.as_str()).collect()
            }
            ChoiceSet::PaymentMethod => PaymentMethod::ALL.iter().map(|m| m.as_str()).collect(),
        }
    }
}

/// What a field holds and how raw input is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer { min: i64, max: i64 },
    Choice(ChoiceSet),
    Email,
    /// `YYYY-MM-DD` (also `MM/DD/YYYY`)
    Date,
    /// `HH:MM` or `HH:MM:SS`
    Time,
    /// Non-negative, 10 digits with 2 decimal places
    Decimal,
    Boolean,
    /// Row ID of another entity
    Reference(Entity),
}

/// One accepted input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_length: Option<usize>,
}

impl FieldSpec {
    pub const fn required(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            kind,
            required: true,
            max_length: None,
        }
    }

    pub const fn optional(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            kind,
            required: false,
            max_length: None,
        }
    }

    pub const fn max_length(self, max: usize) -> Self {
        Self {
            max_length: Some(max),
            ..self
        }
    }
}

/// Largest value a positive integer column accepts.
pub const MAX_POSITIVE_INT: i64 = 2_147_483_647;

const EMAIL_MAX_LENGTH: usize = 254;

pub const PATIENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", "name", FieldKind::Text).max_length(200),
    FieldSpec::required(
        "age",
        "age",
        FieldKind::Integer {
            min: 0,
            max: MAX_POSITIVE_INT,
        },
    ),
    FieldSpec::required("gender", "gender", FieldKind::Choice(ChoiceSet::Gender)),
    FieldSpec::required(
        "blood_group",
        "blood_group",
        FieldKind::Choice(ChoiceSet::BloodGroup),
    ),
    FieldSpec::required("phone", "phone", FieldKind::Text).max_length(20),
    FieldSpec::optional("email", "email", FieldKind::Email).max_length(EMAIL_MAX_LENGTH),
    FieldSpec::optional("address", "address", FieldKind::Text),
    FieldSpec::optional("date_registered", "date_registered", FieldKind::Date),
];

pub const DOCTOR_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", "name", FieldKind::Text).max_length(200),
    FieldSpec::required("specialization", "specialization", FieldKind::Text).max_length(200),
    FieldSpec::required("phone", "phone", FieldKind::Text).max_length(20),
    FieldSpec::optional("email", "email", FieldKind::Email).max_length(EMAIL_MAX_LENGTH),
    FieldSpec::required("available_days", "available_days", FieldKind::Text).max_length(200),
    FieldSpec::required("available_time", "available_time", FieldKind::Text).max_length(100),
];

pub const APPOINTMENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("patient", "patient_id", FieldKind::Reference(Entity::Patient)),
    FieldSpec::required("doctor", "doctor_id", FieldKind::Reference(Entity::Doctor)),
    FieldSpec::required("date", "date", FieldKind::Date),
    FieldSpec::required("time", "time", FieldKind::Time),
    FieldSpec::optional(
        "status",
        "status",
        FieldKind::Choice(ChoiceSet::AppointmentStatus),
    ),
    FieldSpec::optional("notes", "notes", FieldKind::Text),
];

pub const TREATMENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required(
        "appointment",
        "appointment_id",
        FieldKind::Reference(Entity::Appointment),
    ),
    FieldSpec::required("diagnosis", "diagnosis", FieldKind::Text).max_length(500),
    FieldSpec::required("prescription", "prescription", FieldKind::Text),
    FieldSpec::optional("notes", "notes", FieldKind::Text),
    FieldSpec::optional("treatment_date", "treatment_date", FieldKind::Date),
];

pub const BILL_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("patient", "patient_id", FieldKind::Reference(Entity::Patient)),
    FieldSpec::required(
        "appointment",
        "appointment_id",
        FieldKind::Reference(Entity::Appointment),
    ),
    FieldSpec::required("amount", "amount_cents", FieldKind::Decimal),
    FieldSpec::optional("paid", "paid", FieldKind::Boolean),
    FieldSpec::optional("date_issued", "date_issued", FieldKind::Date),
    FieldSpec::optional(
        "payment_method",
        "payment_method",
        FieldKind::Choice(ChoiceSet::PaymentMethod),
    )
    .max_length(20),
];

/// Field table for an entity.
pub fn fields_for(entity: Entity) -> &'static [FieldSpec] {
    match entity {
        Entity::Patient => PATIENT_FIELDS,
        Entity::Doctor => DOCTOR_FIELDS,
        Entity::Appointment => APPOINTMENT_FIELDS,
        Entity::Treatment => TREATMENT_FIELDS,
        Entity::Bill => BILL_FIELDS,
    }
}
