use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use loansim::schema::{add_months, months_diff};
use loansim::*;
use log::{error, info};
use simple_logger::SimpleLogger;

const INITIAL_CONDITIONS_FILE: &str = "./data/initial_conditions.json";
const PAST_OVERPAYMENTS_FILE: &str = "./data/past_overpayments.csv";

/// Loan payoff summary for the installments and overpayments made so far
#[derive(Parser, Debug)]
#[command(name = "loansim", version)]
struct Cli {
    /// Initial conditions of the loan (JSON)
    #[arg(default_value = INITIAL_CONDITIONS_FILE)]
    config: String,

    /// Overpayments already made (CSV with `date` and `amount` columns)
    #[arg(default_value = PAST_OVERPAYMENTS_FILE)]
    overpayments: String,

    /// Give up on a scenario that is still running after this many months
    #[arg(long, default_value_t = 1200)]
    max_periods: usize,

    /// Print every month of each scenario
    #[arg(long)]
    table: bool,
}

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .unwrap();

    let cli = Cli::parse();
    if let Err(e) = run(&cli, Local::now().date_naive()) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, today: NaiveDate) -> Result<()> {
    let config = LoanConfig::from_path(&cli.config)?;
    let past_overpayments = PastOverpayments::from_csv_path(&cli.overpayments)?;
    if let (Some(first), Some(last)) = (past_overpayments.first(), past_overpayments.last()) {
        info!(
            "{} past overpayments, {} to {}",
            past_overpayments.len()?,
            first,
            last
        );
    }

    let installments_to_date = config.installments_until(today);
    let paid_to_date = CompositePayments::new(vec![
        Box::new(&installments_to_date),
        Box::new(&past_overpayments),
    ])?;
    let current_outstanding = match outstanding(
        config.start_date,
        today,
        config.interest_rate,
        config.mortgage_amount,
        &[&paid_to_date],
    ) {
        Err(LoanSimError::NoPeriods { .. }) => config.mortgage_amount,
        result => result?,
    };

    let age = months_diff(config.start_date, today).max(0);
    println!("Outstanding: {:.2}", current_outstanding);
    println!(
        "Amortized: {:.2}",
        config.mortgage_amount - current_outstanding
    );
    println!(
        "Loan start date: {} ({} years and {} months ago)",
        config.start_date,
        age / 12,
        age % 12
    );

    // future overpayments are made on the first of every month from next month on
    let this_month = today.with_day(1).unwrap_or(today);
    let next_payment_date = if today.day() == 1 {
        today
    } else {
        add_months(this_month, 1)?
    };

    let installments = config.installments();
    for &amount in &config.future_overpayments {
        let future_overpayments = PaymentsInRange::unbounded(next_payment_date, amount);
        let table = match payment_table_within(
            config.start_date,
            config.interest_rate,
            config.mortgage_amount,
            None,
            &[&installments, &past_overpayments, &future_overpayments],
            cli.max_periods,
        ) {
            Ok(table) => table,
            Err(LoanSimError::NoPayoff { periods }) => {
                println!(
                    "monthly overpayment {:.0}: not paid off within {} months",
                    amount, periods
                );
                continue;
            }
            Err(e) => return Err(e),
        };

        let payments_left = table.iter().filter(|row| row.date >= today).count();
        if let Some(payoff_date) = table.payoff_date() {
            let remaining = months_diff(today, payoff_date).max(0);
            println!(
                "monthly overpayment {:.0}: last payment {} ({} of {} payments left), {} years and {} months remaining, interest paid {:.2}",
                amount,
                payoff_date,
                payments_left,
                table.len(),
                remaining / 12,
                remaining % 12,
                table.total_interest()
            );
        }
        if cli.table {
            print!("{}", table);
        }
    }
    Ok(())
}

// verifies that types can implement the gated traits below
#[allow(dead_code)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<Payment>();
    is_normal::<Amortization>();
    is_normal::<PaymentsInRange>();
    is_normal::<PastOverpayments>();
    is_normal::<PaymentTable>();
    is_normal::<LoanConfig>();
}

#[test]
fn parse_arguments() {
    let cli = Cli::parse_from(["loansim"]);
    assert_eq!(cli.config, INITIAL_CONDITIONS_FILE);
    assert_eq!(cli.overpayments, PAST_OVERPAYMENTS_FILE);
    assert_eq!(cli.max_periods, 1200);
    assert!(!cli.table);

    let cli = Cli::parse_from([
        "loansim",
        "loan.json",
        "extra.csv",
        "--max-periods",
        "600",
        "--table",
    ]);
    assert_eq!(cli.config, "loan.json");
    assert_eq!(cli.overpayments, "extra.csv");
    assert_eq!(cli.max_periods, 600);
    assert!(cli.table);
}

#[test]
fn run_with_bundled_data() {
    let today = NaiveDate::from_ymd_opt(2024, 6, 18).unwrap();
    run(&Cli::parse_from(["loansim", "--max-periods", "12"]), today).unwrap();
    run(&Cli::parse_from(["loansim", "--table"]), today).unwrap();

    assert!(matches!(
        run(
            &Cli::parse_from(["loansim", "./does/not/exist.json"]),
            today
        ),
        Err(LoanSimError::Config { .. })
    ));
}
