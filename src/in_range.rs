use crate::error::{LoanSimError, Result};
use crate::payment::Payment;
use crate::schema::{add_months, months_diff, PaymentSchema, Payments};
use chrono::{Datelike, Months, NaiveDate};

/// A fixed monthly payment from `start_date` until `end_date` (inclusive).
///
/// Without an end date the schedule is open-ended: it can be queried by date
/// and offset, but has no length and cannot be iterated in full.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PaymentsInRange {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub amount: f64,
}

impl PaymentsInRange {
    pub fn new(start_date: NaiveDate, end_date: Option<NaiveDate>, amount: f64) -> Self {
        Self {
            start_date,
            end_date,
            amount,
        }
    }

    pub fn unbounded(start_date: NaiveDate, amount: f64) -> Self {
        Self::new(start_date, None, amount)
    }

    pub fn is_bounded(&self) -> bool {
        self.end_date.is_some()
    }

    // Also checks that the last payment date is representable, so `iter`
    // yields exactly this many payments.
    fn count(&self, operation: &'static str) -> Result<usize> {
        let end_date = self.end_date.ok_or(LoanSimError::Unbounded { operation })?;
        let months = months_diff(self.start_date, end_date);
        if months < 0 {
            return Ok(0);
        }
        add_months(self.start_date, months as u32)?;
        Ok(months as usize + 1)
    }
}

impl PaymentSchema for PaymentsInRange {
    fn by_offset(&self, offset: usize) -> Result<Payment> {
        if self.is_bounded() {
            let len = self.count("offset access")?;
            if offset >= len {
                return Err(LoanSimError::OutOfRange { offset, len });
            }
        }
        let months = u32::try_from(offset).map_err(|_| LoanSimError::DateOverflow {
            date: self.start_date,
            months: u32::MAX,
        })?;
        Ok(Payment::new(add_months(self.start_date, months)?, self.amount))
    }

    fn for_date(&self, date: NaiveDate) -> Payment {
        let in_range = date >= self.start_date && self.end_date.map_or(true, |end| date <= end);
        if !in_range || date.day() != 1 {
            return Payment::nothing_on(date);
        }
        let months = months_diff(self.start_date, date) as u32;
        if self.start_date.checked_add_months(Months::new(months)) == Some(date) {
            Payment::new(date, self.amount)
        } else {
            Payment::nothing_on(date)
        }
    }

    fn len(&self) -> Result<usize> {
        self.count("length")
    }

    fn iter(&self) -> Result<Payments<'_>> {
        let len = self.count("full iteration")?;
        let (start_date, amount) = (self.start_date, self.amount);
        Ok(Box::new((0..len).filter_map(move |month| {
            start_date
                .checked_add_months(Months::new(month as u32))
                .map(|date| Payment::new(date, amount))
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::PaymentsInRange;
    use crate::error::LoanSimError;
    use crate::payment::Payment;
    use crate::schema::PaymentSchema;
    use chrono::{Datelike, NaiveDate};
    use test_log::test;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn first_half_2020() -> PaymentsInRange {
        PaymentsInRange::new(ymd(2020, 1, 1), Some(ymd(2020, 6, 1)), 1000.)
    }

    #[test]
    fn test_length() {
        assert_eq!(first_half_2020().len().unwrap(), 6);
        assert_eq!(
            PaymentsInRange::new(ymd(2020, 1, 1), Some(ymd(2020, 1, 1)), 5.)
                .len()
                .unwrap(),
            1
        );
        assert_eq!(
            PaymentsInRange::new(ymd(2020, 6, 1), Some(ymd(2020, 1, 1)), 5.)
                .len()
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_by_offset() {
        let pr = first_half_2020();
        assert_eq!(pr.by_offset(1).unwrap(), Payment::new(ymd(2020, 2, 1), 1000.));

        for offset in 0..pr.len().unwrap() {
            let payment = pr.by_offset(offset).unwrap();
            assert_eq!(payment.date, Some(ymd(2020, 1 + offset as u32, 1)));
            assert_eq!(payment.amount, 1000.);
        }
    }

    #[test]
    fn test_by_offset_beyond_last_value() {
        assert_eq!(
            first_half_2020().by_offset(6),
            Err(LoanSimError::OutOfRange { offset: 6, len: 6 })
        );
    }

    #[test]
    fn test_unbounded_by_offset() {
        let pr = PaymentsInRange::unbounded(ymd(2020, 1, 1), 1000.);
        assert_eq!(
            pr.by_offset(120).unwrap(),
            Payment::new(ymd(2030, 1, 1), 1000.)
        );
        assert_eq!(
            pr.by_slice(10..12).unwrap(),
            vec![
                Payment::new(ymd(2020, 11, 1), 1000.),
                Payment::new(ymd(2020, 12, 1), 1000.)
            ]
        );
    }

    #[test]
    fn test_for_date() {
        let pr = first_half_2020();
        assert_eq!(pr.for_date(ymd(2020, 5, 1)), Payment::new(ymd(2020, 5, 1), 1000.));
        assert_eq!(pr.for_date(ymd(2020, 6, 1)), Payment::new(ymd(2020, 6, 1), 1000.));
        assert_eq!(pr.for_date(ymd(2020, 5, 2)), Payment::nothing_on(ymd(2020, 5, 2)));
        assert_eq!(pr.for_date(ymd(2019, 12, 1)), Payment::nothing_on(ymd(2019, 12, 1)));
        assert_eq!(pr.for_date(ymd(2020, 7, 1)), Payment::nothing_on(ymd(2020, 7, 1)));

        let unbounded = PaymentsInRange::unbounded(ymd(2020, 1, 1), 1000.);
        assert_eq!(
            unbounded.for_date(ymd(2045, 7, 1)),
            Payment::new(ymd(2045, 7, 1), 1000.)
        );
    }

    #[test]
    fn test_for_date_mid_month_start() {
        // offsets land on the 15th, never on the first of a month
        let pr = PaymentsInRange::new(ymd(2020, 1, 15), Some(ymd(2020, 6, 15)), 1000.);
        assert!(pr.for_date(ymd(2020, 2, 1)).is_zero());
        assert!(pr.for_date(ymd(2020, 2, 15)).is_zero());
    }

    #[test]
    fn test_generates_all_individual_payments() {
        let expected = vec![
            Payment::new(ymd(2020, 1, 1), 1000.),
            Payment::new(ymd(2020, 2, 1), 1000.),
            Payment::new(ymd(2020, 3, 1), 1000.),
            Payment::new(ymd(2020, 4, 1), 1000.),
            Payment::new(ymd(2020, 5, 1), 1000.),
            Payment::new(ymd(2020, 6, 1), 1000.),
        ];
        assert_eq!(first_half_2020().iter().unwrap().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_range_ending_on_last_representable_date() {
        let start_date = NaiveDate::MAX.with_month(1).unwrap().with_day(1).unwrap();
        let pr = PaymentsInRange::new(start_date, Some(NaiveDate::MAX), 1000.);

        assert_eq!(pr.len().unwrap(), 12);
        let payments: Vec<Payment> = pr.iter().unwrap().collect();
        assert_eq!(payments.len(), 12);
        assert_eq!(payments[11].date, NaiveDate::MAX.with_day(1));
        assert_eq!(pr.by_offset(11).unwrap(), payments[11]);

        let unbounded = PaymentsInRange::unbounded(start_date, 1000.);
        assert!(matches!(
            unbounded.by_offset(12),
            Err(LoanSimError::DateOverflow { months: 12, .. })
        ));
    }

    #[test]
    fn test_unbounded_length_and_iteration_fail() {
        let pr = PaymentsInRange::unbounded(ymd(2020, 1, 1), 1000.);
        assert!(matches!(pr.len(), Err(LoanSimError::Unbounded { .. })));
        assert!(matches!(pr.iter(), Err(LoanSimError::Unbounded { .. })));
        assert!(matches!(pr.is_empty(), Err(LoanSimError::Unbounded { .. })));
    }
}
