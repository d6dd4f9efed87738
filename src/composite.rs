use crate::error::{LoanSimError, Result};
use crate::payment::Payment;
use crate::schema::{PaymentSchema, Payments};
use chrono::NaiveDate;
use log::debug;
use std::{collections::BTreeSet, fmt};

/// Several schedules merged into one.
///
/// Offsets address the children back to back: the first child's payments,
/// then the second's, and so on. Dates address all children at once and sum
/// whatever each of them pays on that day. The two views order payments
/// differently; `iter` follows offsets and `iter_by_date` follows dates.
///
/// Every child must have a finite length.
pub struct CompositePayments<'a> {
    children: Vec<Box<dyn PaymentSchema + 'a>>,
    // cumulative child lengths; `ends[i]` is one past the last offset of child `i`
    ends: Vec<usize>,
}

impl<'a> CompositePayments<'a> {
    pub fn new(children: Vec<Box<dyn PaymentSchema + 'a>>) -> Result<Self> {
        let mut ends = Vec::with_capacity(children.len());
        let mut total = 0;
        for child in &children {
            let len = child.len().map_err(|_| LoanSimError::Unbounded {
                operation: "composing",
            })?;
            total += len;
            ends.push(total);
        }
        debug!(
            "composite of {} schedules, {} payments",
            children.len(),
            total
        );
        Ok(Self { children, ends })
    }

    /// Ascending over every date any child pays on, with the amounts of that date summed.
    pub fn iter_by_date(&self) -> Result<Payments<'_>> {
        let mut dates = BTreeSet::new();
        for child in &self.children {
            dates.extend(child.iter()?.filter_map(|payment| payment.date));
        }
        Ok(Box::new(dates.into_iter().map(|date| self.for_date(date))))
    }

    fn total_len(&self) -> usize {
        self.ends.last().copied().unwrap_or(0)
    }
}

impl PaymentSchema for CompositePayments<'_> {
    fn by_offset(&self, offset: usize) -> Result<Payment> {
        let child = self.ends.partition_point(|&end| end <= offset);
        if child == self.children.len() {
            return Err(LoanSimError::OutOfRange {
                offset,
                len: self.total_len(),
            });
        }
        let start = if child == 0 { 0 } else { self.ends[child - 1] };
        self.children[child].by_offset(offset - start)
    }

    fn for_date(&self, date: NaiveDate) -> Payment {
        self.children
            .iter()
            .fold(Payment::nothing_on(date), |total, child| {
                total + child.for_date(date)
            })
    }

    fn len(&self) -> Result<usize> {
        Ok(self.total_len())
    }

    fn iter(&self) -> Result<Payments<'_>> {
        let children = self
            .children
            .iter()
            .map(|child| child.iter())
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(children.into_iter().flatten()))
    }
}

impl fmt::Debug for CompositePayments<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositePayments")
            .field("children", &self.children.len())
            .field("len", &self.total_len())
            .finish()
    }
}
