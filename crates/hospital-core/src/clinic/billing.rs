//! Bills and the mark-paid workflow.

use super::{found, Clinic, ClinicResult, Outcome};
use crate::db::{BillFilter, CascadeSummary, Page};
use crate::models::{Bill, BillDetail, Entity};
use crate::validation::{validate_bill, validate_payment_method, FormData};

impl Clinic<'_> {
    pub fn create_bill(&self, form: &FormData) -> ClinicResult<Outcome<Bill>> {
        let data = validate_bill(form, self.today())?;
        let bill = self.db.insert_bill(&data)?;
        Ok(Outcome::new(bill, "Bill created successfully."))
    }

    pub fn get_bill(&self, id: i64) -> ClinicResult<BillDetail> {
        found(Entity::Bill, id, self.db.get_bill(id)?)
    }

    pub fn list_bills(&self, filter: &BillFilter, page: u32) -> ClinicResult<Page<BillDetail>> {
        Ok(self.db.list_bills(filter, page)?)
    }

    /// A blank issue date keeps the stored one.
    ///
    /// A paid bill stays paid, and keeps its payment method unless the edit
    /// names one.
    pub fn update_bill(&self, id: i64, form: &FormData) -> ClinicResult<Outcome<Bill>> {
        let existing = self.get_bill(id)?.bill;
        let mut data = validate_bill(form, existing.date_issued)?;
        if existing.paid {
            if !data.paid {
                tracing::debug!(id, "paid flag kept on edit");
            }
            data.paid = true;
            data.payment_method = data.payment_method.or(existing.payment_method);
        }
        let bill = self.db.update_bill(id, &data)?;
        Ok(Outcome::new(bill, "Bill updated successfully."))
    }

    pub fn delete_bill(&self, id: i64) -> ClinicResult<Outcome<CascadeSummary>> {
        let summary = self.db.delete_bill(id)?;
        Ok(Outcome::new(summary, "Bill deleted successfully."))
    }

    /// Settle a bill.
    ///
    /// The bill must exist and `method`, if given, must be a known payment
    /// method. A method already on the bill is kept; otherwise `method` is
    /// recorded, or cash when none is given. Settling a settled bill is a
    /// no-op write.
    pub fn mark_bill_paid(&self, id: i64, method: Option<&str>) -> ClinicResult<Outcome<Bill>> {
        let mut bill = self.get_bill(id)?.bill;
        let method = validate_payment_method(method)?;

        if bill.mark_paid(method) {
            self.db.set_bill_payment(bill.id, bill.paid, bill.payment_method)?;
        } else {
            tracing::debug!(id, "bill already settled");
        }

        Ok(Outcome::new(bill, format!("Bill #{} marked as paid.", id)))
    }
}
