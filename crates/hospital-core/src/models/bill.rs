//! Bill models and the paid/unpaid state machine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::appointment::Appointment;
use super::choices::PaymentMethod;
use super::money::Money;
use super::patient::Patient;

/// A charge raised against a patient for an appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bill {
    pub id: i64,
    pub patient_id: i64,
    pub appointment_id: i64,
    pub amount: Money,
    pub paid: bool,
    pub date_issued: NaiveDate,
    /// Blank until the bill is settled or a method is chosen up front
    pub payment_method: Option<PaymentMethod>,
}

/// Validated bill fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillData {
    pub patient_id: i64,
    pub appointment_id: i64,
    pub amount: Money,
    pub paid: bool,
    pub date_issued: NaiveDate,
    pub payment_method: Option<PaymentMethod>,
}

/// Payment state. The only transition is Unpaid -> Paid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentState {
    Unpaid,
    Paid,
}

impl Bill {
    pub fn new(id: i64, data: BillData) -> Self {
        Self {
            id,
            patient_id: data.patient_id,
            appointment_id: data.appointment_id,
            amount: data.amount,
            paid: data.paid,
            date_issued: data.date_issued,
            payment_method: data.payment_method,
        }
    }

    pub fn state(&self) -> PaymentState {
        if self.paid {
            PaymentState::Paid
        } else {
            PaymentState::Unpaid
        }
    }

    /// Settle the bill.
    ///
    /// A method already on the bill is never replaced; otherwise the supplied
    /// method is used, falling back to cash. Returns `true` if anything changed.
    pub fn mark_paid(&mut self, method: Option<PaymentMethod>) -> bool {
        let was_paid = self.paid;
        self.paid = true;

        let filled = self.payment_method.is_none();
        if filled {
            self.payment_method = Some(method.unwrap_or_default());
        }

        !was_paid || filled
    }
}

impl From<&Bill> for BillData {
    fn from(b: &Bill) -> Self {
        Self {
            patient_id: b.patient_id,
            appointment_id: b.appointment_id,
            amount: b.amount,
            paid: b.paid,
            date_issued: b.date_issued,
            payment_method: b.payment_method,
        }
    }
}

/// A bill with its patient and appointment loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillDetail {
    #[serde(flatten)]
    pub bill: Bill,
    pub patient: Patient,
    pub appointment: Appointment,
}

impl fmt::Display for BillDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.bill.state() {
            PaymentState::Paid => "Paid",
            PaymentState::Unpaid => "Unpaid",
        };
        write!(
            f,
            "Bill #{} - {} - ${} ({})",
            self.bill.id, self.patient.name, self.bill.amount, status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unpaid_bill() -> Bill {
        Bill {
            id: 7,
            patient_id: 1,
            appointment_id: 1,
            amount: "150.00".parse().unwrap(),
            paid: false,
            date_issued: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            payment_method: None,
        }
    }

    #[test]
    fn test_mark_paid_defaults_to_cash() {
        let mut bill = unpaid_bill();
        assert!(bill.mark_paid(None));
        assert!(bill.paid);
        assert_eq!(bill.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(bill.state(), PaymentState::Paid);
    }

    #[test]
    fn test_mark_paid_uses_supplied_method() {
        let mut bill = unpaid_bill();
        bill.mark_paid(Some(PaymentMethod::Card));
        assert_eq!(bill.payment_method, Some(PaymentMethod::Card));
    }

    #[test]
    fn test_mark_paid_keeps_existing_method() {
        let mut bill = unpaid_bill();
        bill.payment_method = Some(PaymentMethod::Insurance);
        assert!(bill.mark_paid(Some(PaymentMethod::Online)));
        assert_eq!(bill.payment_method, Some(PaymentMethod::Insurance));
    }

    #[test]
    fn test_mark_paid_is_idempotent() {
        let mut bill = unpaid_bill();
        bill.mark_paid(Some(PaymentMethod::Card));
        let snapshot = bill.clone();
        assert!(!bill.mark_paid(Some(PaymentMethod::Card)));
        assert_eq!(bill, snapshot);
    }
}
