//! Bill database operations.

use rusqlite::types::Value;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::query::{Conditions, ListQuery};
use super::rows::{bill_detail_select, BillDetailRow};
use super::{CascadeSummary, Database, DbError, DbResult, Page};
use crate::models::{Bill, BillData, BillDetail, Entity, PaymentMethod};
use crate::validation::messages;

const BILL_ORDER: &str = "b.date_issued DESC, b.id DESC";

const BILL_FROM: &str = "bills b
     JOIN patients p ON p.id = b.patient_id
     JOIN appointments a ON a.id = b.appointment_id";

/// Bill list filters. Search matches patient name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillFilter {
    pub search: Option<String>,
    pub paid: Option<bool>,
    pub payment_method: Option<PaymentMethod>,
}

fn method_column(method: Option<PaymentMethod>) -> &'static str {
    method.map(|m| m.as_str()).unwrap_or("")
}

impl Database {
    /// Raise a bill. The appointment must belong to the billed patient.
    pub fn insert_bill(&self, data: &BillData) -> DbResult<Bill> {
        let tx = self.conn.unchecked_transaction()?;
        self.require_bill_links(data)?;

        tx.execute(
            r#"
            INSERT INTO bills (
                patient_id, appointment_id, amount_cents, paid, date_issued, payment_method
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.patient_id,
                data.appointment_id,
                data.amount.cents(),
                data.paid,
                data.date_issued,
                method_column(data.payment_method),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(id, patient_id = data.patient_id, amount = %data.amount, "bill created");
        Ok(Bill::new(id, data.clone()))
    }

    /// Rewrite a bill under the same link rules as `insert_bill`.
    pub fn update_bill(&self, id: i64, data: &BillData) -> DbResult<Bill> {
        let tx = self.conn.unchecked_transaction()?;
        if !self.exists(Entity::Bill, id)? {
            return Err(DbError::NotFound {
                entity: Entity::Bill,
                id,
            });
        }
        self.require_bill_links(data)?;

        tx.execute(
            r#"
            UPDATE bills SET
                patient_id = ?2,
                appointment_id = ?3,
                amount_cents = ?4,
                paid = ?5,
                date_issued = ?6,
                payment_method = ?7
            WHERE id = ?1
            "#,
            params![
                id,
                data.patient_id,
                data.appointment_id,
                data.amount.cents(),
                data.paid,
                data.date_issued,
                method_column(data.payment_method),
            ],
        )?;
        tx.commit()?;

        tracing::info!(id, paid = data.paid, "bill updated");
        Ok(Bill::new(id, data.clone()))
    }

    /// Persist the payment fields of a bill.
    pub fn set_bill_payment(
        &self,
        id: i64,
        paid: bool,
        method: Option<PaymentMethod>,
    ) -> DbResult<()> {
        let rows_affected = self.conn.execute(
            "UPDATE bills SET paid = ?2, payment_method = ?3 WHERE id = ?1",
            params![id, paid, method_column(method)],
        )?;
        if rows_affected == 0 {
            return Err(DbError::NotFound {
                entity: Entity::Bill,
                id,
            });
        }
        tracing::info!(id, paid, method = method_column(method), "bill payment recorded");
        Ok(())
    }

    /// Get a bill with its patient and appointment.
    pub fn get_bill(&self, id: i64) -> DbResult<Option<BillDetail>> {
        let sql = format!("{} WHERE b.id = ?", bill_detail_select());
        self.conn
            .query_row(&sql, [id], BillDetailRow::read_first)
            .optional()?
            .map(BillDetail::try_from)
            .transpose()
    }

    /// List bills, newest issue date first.
    pub fn list_bills(&self, filter: &BillFilter, page: u32) -> DbResult<Page<BillDetail>> {
        let mut conditions = Conditions::new();
        conditions
            .equals("b.paid", filter.paid.map(|p| Value::Integer(p as i64)))
            .equals(
                "b.payment_method",
                filter
                    .payment_method
                    .map(|m| Value::Text(m.as_str().into())),
            )
            .search(&["p.name"], filter.search.as_deref());

        let query = ListQuery {
            select: bill_detail_select(),
            count_from: BILL_FROM,
            order_by: BILL_ORDER,
            conditions,
        };
        self.fetch_page(&query, page, BillDetailRow::read_first)
    }

    /// Bills not yet settled.
    pub fn count_unpaid_bills(&self) -> DbResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM bills WHERE paid = 0", [], |row| {
                    row.get(0)
                })?;
        Ok(count.max(0) as u64)
    }

    /// Delete one bill.
    pub fn delete_bill(&self, id: i64) -> DbResult<CascadeSummary> {
        let bills = self.conn.execute("DELETE FROM bills WHERE id = ?1", [id])?;
        if bills == 0 {
            return Err(DbError::NotFound {
                entity: Entity::Bill,
                id,
            });
        }

        tracing::info!(id, "bill deleted");
        Ok(CascadeSummary {
            bills,
            ..Default::default()
        })
    }

    /// Patient and appointment must both exist, and the appointment must be
    /// the patient's.
    fn require_bill_links(&self, data: &BillData) -> DbResult<()> {
        self.require_reference("patient", Entity::Patient, data.patient_id)?;

        match self.appointment_owner(data.appointment_id)? {
            None => self.require_reference("appointment", Entity::Appointment, data.appointment_id),
            Some(owner) if owner != data.patient_id => {
                tracing::warn!(
                    appointment_id = data.appointment_id,
                    owner,
                    patient_id = data.patient_id,
                    "bill appointment belongs to another patient"
                );
                Err(DbError::Integrity {
                    field: "appointment",
                    message: messages::APPOINTMENT_PATIENT_MISMATCH.to_string(),
                })
            }
            Some(_) => Ok(()),
        }
    }
}
