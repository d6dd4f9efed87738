pub mod composite;
pub mod config;
pub mod error;
pub mod in_range;
pub mod loan;
pub mod past;
pub mod payment;
pub mod schema;

pub use composite::CompositePayments;
pub use config::LoanConfig;
pub use error::{LoanSimError, Result};
pub use in_range::PaymentsInRange;
pub use loan::{
    outstanding, payment_table, payment_table_within, simulate, Amortization, PaymentTable,
    Simulation,
};
pub use past::PastOverpayments;
pub use payment::Payment;
pub use schema::PaymentSchema;
