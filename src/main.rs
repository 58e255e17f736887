use anyhow::{anyhow, Result};
use rusqlite::Connection;
use std::env;
use std::path::{Path, PathBuf};

// Use library instead of local modules
use finance_tracker::{
    aggregate, amortization_schedule, compute_loan, count_transactions,
    get_transactions_for_user, insert_transactions, load_csv, setup_database, LoanRequest,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => {
            let csv_path = args
                .get(2)
                .ok_or_else(|| anyhow!("Usage: finance-tracker import <transactions.csv>"))?;
            run_import(Path::new(csv_path))
        }
        Some("summary") => {
            let username = args
                .get(2)
                .ok_or_else(|| anyhow!("Usage: finance-tracker summary <username>"))?;
            run_summary(username)
        }
        Some("loan") => {
            let request = parse_loan_args(&args[2..])?;
            run_loan(&request)
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("Finance Tracker {}", finance_tracker::VERSION);
    println!();
    println!("Usage:");
    println!("  finance-tracker import <transactions.csv>   Import transactions");
    println!("  finance-tracker summary <username>          Totals and savings tip");
    println!("  finance-tracker loan <principal> <rate%> <months>");
    println!();
    println!("Database path comes from FINTRACK_DB (default: finance.db)");
}

fn db_path() -> PathBuf {
    env::var("FINTRACK_DB")
        .unwrap_or_else(|_| "finance.db".to_string())
        .into()
}

fn open_database() -> Result<Connection> {
    let conn = Connection::open(db_path())?;
    setup_database(&conn)?;
    Ok(conn)
}

fn run_import(csv_path: &Path) -> Result<()> {
    println!("📂 Loading {}...", csv_path.display());
    let transactions = load_csv(csv_path)?;
    println!("✓ Loaded {} transactions from CSV", transactions.len());

    let conn = open_database()?;

    let (inserted, duplicates) = insert_transactions(&conn, &transactions)?;
    println!("✓ Inserted: {} transactions", inserted);
    println!("✓ Skipped duplicates: {}", duplicates);

    let count = count_transactions(&conn)?;
    println!("✓ Database contains {} transactions", count);

    Ok(())
}

fn run_summary(username: &str) -> Result<()> {
    let conn = open_database()?;

    let transactions = get_transactions_for_user(&conn, username)?;
    let summary = aggregate(&transactions).map_err(|errors| {
        anyhow!(
            "stored transactions failed validation: {}",
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        )
    })?;

    println!("Summary for {}", username);
    println!("  Transactions:   {}", summary.transaction_count);
    println!("  Total income:   {:.2}", summary.total_income);
    println!("  Total expenses: {:.2}", summary.total_expenses);
    println!("  Balance:        {:.2}", summary.balance);
    println!();
    println!("💡 {}", summary.suggestion);

    Ok(())
}

fn parse_loan_args(args: &[String]) -> Result<LoanRequest> {
    if args.len() != 3 {
        return Err(anyhow!(
            "Usage: finance-tracker loan <principal> <rate%> <months>"
        ));
    }

    Ok(LoanRequest {
        principal: args[0]
            .parse()
            .map_err(|_| anyhow!("Invalid principal '{}'", args[0]))?,
        annual_rate_percent: args[1]
            .parse()
            .map_err(|_| anyhow!("Invalid rate '{}'", args[1]))?,
        term_months: args[2]
            .parse()
            .map_err(|_| anyhow!("Invalid months '{}'", args[2]))?,
    })
}

fn run_loan(request: &LoanRequest) -> Result<()> {
    let result = compute_loan(request).map_err(format_validation_errors)?;

    println!(
        "Loan: {:.2} at {}% over {} months",
        request.principal, request.annual_rate_percent, request.term_months
    );
    println!("  Monthly payment: {:.2}", result.periodic_payment);
    println!("  Total payment:   {:.2}", result.total_payment);
    println!("  Total interest:  {:.2}", result.total_interest);
    println!();
    println!("💡 {}", result.advice);

    let schedule = amortization_schedule(request).map_err(format_validation_errors)?;
    println!();
    println!("  Month   Interest  Principal    Balance");
    for entry in &schedule {
        println!(
            "  {:>5}  {:>9.2}  {:>9.2}  {:>9.2}",
            entry.month, entry.interest, entry.principal_component, entry.balance
        );
    }

    Ok(())
}

fn format_validation_errors(errors: Vec<finance_tracker::ValidationError>) -> anyhow::Error {
    anyhow!(
        "invalid loan request: {}",
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    )
}
