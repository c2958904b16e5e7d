//! Domain models for the hospital records system.

mod appointment;
mod bill;
mod choices;
mod doctor;
mod entity;
mod money;
mod patient;
mod treatment;

pub use appointment::*;
pub use bill::*;
pub use choices::*;
pub use doctor::*;
pub use entity::*;
pub use money::*;
pub use patient::*;
pub use treatment::*;
