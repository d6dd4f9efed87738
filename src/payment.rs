use chrono::NaiveDate;
use std::{cmp::Ordering, fmt, iter::Sum, ops::Add};

/// A single dated payment.
///
/// `date` is `None` only for aggregates of payments made on different dates
/// (and for the empty sum). Payments are ordered by date first, with `None`
/// before every concrete date, then by amount. Amounts compare with
/// `f64::total_cmp` after folding `-0.0` into `0.0`, so equality is total.
#[derive(Clone, Copy, Debug, Default)]
pub struct Payment {
    pub date: Option<NaiveDate>,
    pub amount: f64,
}

impl Payment {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self {
            date: Some(date),
            amount,
        }
    }

    /// Zero-amount payment on `date`, returned for dates a schedule does not pay on.
    pub fn nothing_on(date: NaiveDate) -> Self {
        Self::new(date, 0.)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0.
    }
}

impl Add for Payment {
    type Output = Payment;

    fn add(self, other: Payment) -> Payment {
        Payment {
            date: if self.date == other.date {
                self.date
            } else {
                None
            },
            amount: self.amount + other.amount,
        }
    }
}

// Folds from the first element rather than from `Payment::default()`, so that a
// sum of same-day payments keeps its date. An empty sum is the null-date zero.
impl Sum for Payment {
    fn sum<I: Iterator<Item = Payment>>(iter: I) -> Payment {
        iter.reduce(Add::add).unwrap_or_default()
    }
}

impl<'a> Sum<&'a Payment> for Payment {
    fn sum<I: Iterator<Item = &'a Payment>>(iter: I) -> Payment {
        iter.copied().sum()
    }
}

impl Ord for Payment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| (self.amount + 0.).total_cmp(&(other.amount + 0.)))
    }
}

impl PartialOrd for Payment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Payment {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Payment {}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date {
            Some(date) => write!(f, "{} ${:.2}", date, self.amount),
            None => write!(f, "mixed dates ${:.2}", self.amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Payment;
    use chrono::NaiveDate;
    use test_log::test;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_same_date_keeps_date() {
        let sum = Payment::new(ymd(2020, 3, 1), 1000.) + Payment::new(ymd(2020, 3, 1), 2000.);
        assert_eq!(sum, Payment::new(ymd(2020, 3, 1), 3000.));
    }

    #[test]
    fn test_add_different_dates_drops_date() {
        let sum = Payment::new(ymd(2020, 3, 1), 1000.) + Payment::new(ymd(2020, 4, 1), 2000.);
        assert_eq!(sum.date, None);
        assert_eq!(sum.amount, 3000.);

        // a null date never matches a concrete one
        let sum = Payment::default() + Payment::new(ymd(2020, 4, 1), 5.);
        assert_eq!(sum.date, None);
        assert_eq!(sum.amount, 5.);
    }

    #[test]
    fn test_add_is_commutative() {
        let a = Payment::new(ymd(2020, 1, 1), 10.);
        let b = Payment::new(ymd(2020, 2, 1), 32.5);
        assert_eq!(a + b, b + a);
    }

    #[test]
    fn test_sum() {
        let empty: Vec<Payment> = Vec::new();
        assert_eq!(empty.iter().sum::<Payment>(), Payment::default());

        let single = [Payment::new(ymd(2021, 5, 1), 250.)];
        assert_eq!(single.iter().sum::<Payment>(), single[0]);

        let same_day = [
            Payment::new(ymd(2021, 5, 1), 250.),
            Payment::new(ymd(2021, 5, 1), 0.),
            Payment::new(ymd(2021, 5, 1), 750.),
        ];
        assert_eq!(
            same_day.into_iter().sum::<Payment>(),
            Payment::new(ymd(2021, 5, 1), 1000.)
        );
    }

    #[test]
    fn test_ordering_null_date_first() {
        let mut payments = vec![
            Payment::new(ymd(2020, 5, 1), 3000.),
            Payment::new(ymd(2020, 3, 1), 2000.),
            Payment {
                date: None,
                amount: 9999.,
            },
            Payment::new(ymd(2020, 3, 1), 500.),
        ];
        payments.sort();

        assert_eq!(payments[0].date, None);
        assert_eq!(payments[1], Payment::new(ymd(2020, 3, 1), 500.));
        assert_eq!(payments[2], Payment::new(ymd(2020, 3, 1), 2000.));
        assert_eq!(payments[3], Payment::new(ymd(2020, 5, 1), 3000.));
        assert_eq!(payments.iter().max().unwrap().date, Some(ymd(2020, 5, 1)));
    }

    #[test]
    fn test_signed_zero_amounts_are_equal() {
        assert_eq!(Payment::new(ymd(2020, 1, 1), 0.), Payment::new(ymd(2020, 1, 1), -0.));
        assert!(Payment::new(ymd(2020, 1, 1), -0.5) < Payment::new(ymd(2020, 1, 1), -0.));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Payment::new(ymd(2020, 3, 1), 2000.).to_string(),
            "2020-03-01 $2000.00"
        );
        assert_eq!(
            (Payment::new(ymd(2020, 3, 1), 1.5) + Payment::nothing_on(ymd(2020, 4, 1)))
                .to_string(),
            "mixed dates $1.50"
        );
    }
}
