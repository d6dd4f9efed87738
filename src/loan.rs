use crate::error::{LoanSimError, Result};
use crate::payment::Payment;
use crate::schema::{add_months, PaymentSchema};
use chrono::NaiveDate;
use log::{trace, warn};
use std::fmt;

/// One simulated month of the loan.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Amortization {
    pub date: NaiveDate,
    pub amount: f64,
    pub interest: f64,
    pub principal: f64,
    pub outstanding: f64,
}

impl Amortization {
    pub fn new(
        date: NaiveDate,
        amount: f64,
        interest: f64,
        principal: f64,
        outstanding: f64,
    ) -> Self {
        Self {
            date,
            amount,
            interest,
            principal,
            outstanding,
        }
    }
}

impl fmt::Display for Amortization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "date {}, payment ${:.2}, interest paid ${:.2}, principal paid ${:.2}, outstanding ${:.2}",
            self.date, self.amount, self.interest, self.principal, self.outstanding
        )
    }
}

/// Lazy month-by-month run of a loan, created by [`simulate`].
///
/// Stops once the outstanding balance is no longer positive or the next
/// period would fall on or after the horizon date. The last record of a
/// paid-off loan can have a negative balance when the final payment overshoots.
pub struct Simulation<'a> {
    schedules: &'a [&'a dyn PaymentSchema],
    interest_rate: f64,
    outstanding: f64,
    last_date: Option<NaiveDate>,
    // `None` once the run is over
    payment_date: Option<Result<NaiveDate>>,
}

impl Iterator for Simulation<'_> {
    type Item = Result<Amortization>;

    fn next(&mut self) -> Option<Self::Item> {
        let paying = self.outstanding > 0.;
        let payment_date = match self.payment_date.take()? {
            Ok(date) if paying && self.last_date.map_or(true, |last_date| date < last_date) => {
                date
            }
            // an overflowed date lies past any horizon
            Err(e) if paying && self.last_date.is_none() => return Some(Err(e)),
            _ => return None,
        };

        let payment: Payment = self
            .schedules
            .iter()
            .map(|schedule| schedule.for_date(payment_date))
            .sum();
        let interest = self.outstanding * self.interest_rate / 12.;
        let principal = payment.amount - interest;
        self.outstanding -= principal;

        trace!(
            "{}: payment {}, interest {}, principal {}, outstanding {}",
            payment_date,
            payment.amount,
            interest,
            principal,
            self.outstanding
        );

        self.payment_date = Some(add_months(payment_date, 1));
        Some(Ok(Amortization::new(
            payment_date,
            payment.amount,
            interest,
            principal,
            self.outstanding,
        )))
    }
}

/// Runs the loan from `first_date`, one period per calendar month.
///
/// `interest_rate` is annual, as a decimal (0.03 for 3%), and applied
/// monthly. Each period pays the sum of what every schedule pays on that
/// date. Without `last_date` the run only ends at payoff.
pub fn simulate<'a>(
    first_date: NaiveDate,
    interest_rate: f64,
    outstanding: f64,
    last_date: Option<NaiveDate>,
    schedules: &'a [&'a dyn PaymentSchema],
) -> Simulation<'a> {
    Simulation {
        schedules,
        interest_rate,
        outstanding,
        last_date,
        payment_date: Some(Ok(first_date)),
    }
}

/// Balance still owed once every period before `date` has been paid.
pub fn outstanding(
    first_date: NaiveDate,
    date: NaiveDate,
    interest_rate: f64,
    principal: f64,
    schedules: &[&dyn PaymentSchema],
) -> Result<f64> {
    let mut last = None;
    for amortization in simulate(first_date, interest_rate, principal, Some(date), schedules) {
        last = Some(amortization?);
    }
    last.map(|amortization| amortization.outstanding)
        .ok_or(LoanSimError::NoPeriods { first_date, date })
}

/// Collects a whole run into a [`PaymentTable`].
///
/// Without `last_date` this only returns once the loan is paid off; see
/// [`payment_table_within`] for runs that may never get there.
pub fn payment_table(
    first_date: NaiveDate,
    interest_rate: f64,
    principal: f64,
    last_date: Option<NaiveDate>,
    schedules: &[&dyn PaymentSchema],
) -> Result<PaymentTable> {
    let rows = simulate(first_date, interest_rate, principal, last_date, schedules)
        .collect::<Result<Vec<_>>>()?;
    Ok(PaymentTable { rows })
}

/// Like [`payment_table`], but fails with `NoPayoff` when the run would go on
/// past `max_periods` periods.
pub fn payment_table_within(
    first_date: NaiveDate,
    interest_rate: f64,
    principal: f64,
    last_date: Option<NaiveDate>,
    schedules: &[&dyn PaymentSchema],
    max_periods: usize,
) -> Result<PaymentTable> {
    let mut rows = Vec::new();
    for amortization in simulate(first_date, interest_rate, principal, last_date, schedules) {
        if rows.len() == max_periods {
            warn!(
                "loan still running after {} periods, giving up",
                max_periods
            );
            return Err(LoanSimError::NoPayoff {
                periods: max_periods,
            });
        }
        rows.push(amortization?);
    }
    Ok(PaymentTable { rows })
}

/// Materialized simulation, one row per month in ascending date order.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct PaymentTable {
    rows: Vec<Amortization>,
}

impl PaymentTable {
    pub fn get(&self, date: NaiveDate) -> Option<&Amortization> {
        self.rows
            .binary_search_by_key(&date, |row| row.date)
            .ok()
            .map(|index| &self.rows[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Amortization> + '_ {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&Amortization> {
        self.rows.last()
    }

    /// Date of the payment that cleared the loan, if the table reaches it.
    pub fn payoff_date(&self) -> Option<NaiveDate> {
        self.rows
            .iter()
            .find(|row| row.outstanding <= 0.)
            .map(|row| row.date)
    }

    pub fn outstanding(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.rows.iter().map(|row| (row.date, row.outstanding))
    }

    pub fn total_interest(&self) -> f64 {
        self.rows.iter().map(|row| row.interest).sum()
    }
}

impl fmt::Display for PaymentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
