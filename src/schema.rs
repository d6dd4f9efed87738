use crate::error::{LoanSimError, Result};
use crate::payment::Payment;
use chrono::{Datelike, Months, NaiveDate};
use std::ops::Range;

pub type Payments<'a> = Box<dyn Iterator<Item = Payment> + 'a>;

/// A source of dated payments, addressable by position or by calendar date.
pub trait PaymentSchema {
    /// Payment at position `offset` in the schedule's own order.
    fn by_offset(&self, offset: usize) -> Result<Payment>;

    /// Payment made on `date`; a zero-amount payment on `date` when nothing is scheduled.
    fn for_date(&self, date: NaiveDate) -> Payment;

    /// Number of payments. Fails with `Unbounded` for open-ended schedules.
    fn len(&self) -> Result<usize>;

    /// Every payment in offset order. Fails with `Unbounded` for open-ended schedules.
    fn iter(&self) -> Result<Payments<'_>>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Payments at `range`, stopping early at the end of the schedule.
    fn by_slice(&self, range: Range<usize>) -> Result<Vec<Payment>> {
        let mut payments = Vec::new();
        for offset in range {
            match self.by_offset(offset) {
                Ok(payment) => payments.push(payment),
                Err(LoanSimError::OutOfRange { .. }) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(payments)
    }
}

impl<T: PaymentSchema + ?Sized> PaymentSchema for &T {
    fn by_offset(&self, offset: usize) -> Result<Payment> {
        (**self).by_offset(offset)
    }

    fn for_date(&self, date: NaiveDate) -> Payment {
        (**self).for_date(date)
    }

    fn len(&self) -> Result<usize> {
        (**self).len()
    }

    fn iter(&self) -> Result<Payments<'_>> {
        (**self).iter()
    }

    fn by_slice(&self, range: Range<usize>) -> Result<Vec<Payment>> {
        (**self).by_slice(range)
    }
}

pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or(LoanSimError::DateOverflow { date, months })
}

/// Whole calendar months from `first` to `last`, negative when `last` is earlier.
///
/// A month only counts once `first` advanced by it does not pass `last`, with
/// month-end clamping (2020-01-31 to 2020-02-29 is one month).
pub fn months_diff(first: NaiveDate, last: NaiveDate) -> i64 {
    if last < first {
        return -months_diff(last, first);
    }
    let mut months = i64::from(last.year() - first.year()) * 12 + i64::from(last.month())
        - i64::from(first.month());
    while months > 0 {
        match first.checked_add_months(Months::new(months as u32)) {
            Some(date) if date <= last => break,
            _ => months -= 1,
        }
    }
    months
}
