//! Entity kinds, used for error reporting and reference fields.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Entity {
    Patient,
    Doctor,
    Appointment,
    Treatment,
    Bill,
}

impl Entity {
    pub const ALL: [Entity; 5] = [
        Entity::Patient,
        Entity::Doctor,
        Entity::Appointment,
        Entity::Treatment,
        Entity::Bill,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Entity::Patient => "Patient",
            Entity::Doctor => "Doctor",
            Entity::Appointment => "Appointment",
            Entity::Treatment => "Treatment",
            Entity::Bill => "Bill",
        }
    }

    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            Entity::Patient => "patients",
            Entity::Doctor => "doctors",
            Entity::Appointment => "appointments",
            Entity::Treatment => "treatments",
            Entity::Bill => "bills",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
