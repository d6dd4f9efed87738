use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoanSimError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoanSimError {
    #[error("offset {offset} out of range for schedule of length {len}")]
    OutOfRange { offset: usize, len: usize },

    /// Length or full traversal requested on a schedule without an end date.
    #[error("{operation} is undefined for an unbounded schedule")]
    Unbounded { operation: &'static str },

    #[error("cannot load payments from {source_name}: {reason}")]
    DataSource { source_name: String, reason: String },

    #[error("invalid loan configuration in {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("no period to simulate between {first_date} and {date}")]
    NoPeriods { first_date: NaiveDate, date: NaiveDate },

    #[error("loan not paid off after {periods} periods")]
    NoPayoff { periods: usize },

    #[error("{date} + {months} months is out of the supported date range")]
    DateOverflow { date: NaiveDate, months: u32 },
}
