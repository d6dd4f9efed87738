use crate::error::{LoanSimError, Result};
use crate::payment::Payment;
use crate::schema::{PaymentSchema, Payments};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::Deserialize;
use std::{collections::BTreeMap, io, path::Path};

#[derive(Debug, Deserialize)]
struct OverpaymentRecord {
    date: NaiveDate,
    amount: f64,
}

/// Overpayments already made, loaded once and kept in ascending date order.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct PastOverpayments {
    payments: Vec<Payment>,
}

impl PastOverpayments {
    /// Builds the schedule from `(date, amount)` pairs in any order. A repeated
    /// date keeps the last amount seen for it.
    pub fn from_payments<I>(payments: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut by_date = BTreeMap::new();
        for (date, amount) in payments {
            if let Some(previous) = by_date.insert(date, amount) {
                warn!(
                    "duplicate overpayment on {}: {} replaced by {}",
                    date, previous, amount
                );
            }
        }
        Self {
            payments: by_date
                .into_iter()
                .map(|(date, amount)| Payment::new(date, amount))
                .collect(),
        }
    }

    /// Reads CSV with a header row holding at least `date` and `amount` columns.
    pub fn from_reader<R: io::Read>(reader: R, source_name: &str) -> Result<Self> {
        let data_source_error = |reason: String| LoanSimError::DataSource {
            source_name: source_name.to_string(),
            reason,
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|e| data_source_error(e.to_string()))?;
        for column in ["date", "amount"] {
            if !headers.iter().any(|header| header == column) {
                return Err(data_source_error(format!("missing `{}` column", column)));
            }
        }

        let mut records = Vec::new();
        for result in reader.deserialize() {
            let record: OverpaymentRecord = result.map_err(|e| data_source_error(e.to_string()))?;
            records.push((record.date, record.amount));
        }
        debug!("loaded {} overpayments from {}", records.len(), source_name);

        Ok(Self::from_payments(records))
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| LoanSimError::DataSource {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_reader(file, &path.display().to_string())
    }

    pub fn first(&self) -> Option<&Payment> {
        self.payments.first()
    }

    pub fn last(&self) -> Option<&Payment> {
        self.payments.last()
    }
}

impl PaymentSchema for PastOverpayments {
    fn by_offset(&self, offset: usize) -> Result<Payment> {
        self.payments
            .get(offset)
            .copied()
            .ok_or(LoanSimError::OutOfRange {
                offset,
                len: self.payments.len(),
            })
    }

    fn for_date(&self, date: NaiveDate) -> Payment {
        match self
            .payments
            .binary_search_by(|payment| payment.date.cmp(&Some(date)))
        {
            Ok(index) => self.payments[index],
            Err(_) => Payment::nothing_on(date),
        }
    }

    fn len(&self) -> Result<usize> {
        Ok(self.payments.len())
    }

    fn iter(&self) -> Result<Payments<'_>> {
        Ok(Box::new(self.payments.iter().copied()))
    }
}
