// Finance Tracker - Core Library
// Exposes all modules for use in the CLI, API server, and tests

pub mod aggregate;
pub mod db;
pub mod loan;
pub mod validation;

// Re-export commonly used types
pub use aggregate::{
    aggregate, savings_suggestion, AggregateSummary, SUGGESTION_HEALTHY,
    SUGGESTION_INSUFFICIENT_DATA, SUGGESTION_OVERSPENDING, SUGGESTION_SAVE_MORE,
};
pub use db::{
    count_transactions, delete_transaction, get_transactions_for_user, insert_transaction,
    insert_transactions, list_users, load_csv, setup_database, Transaction, TxKind,
};
pub use loan::{
    amortization_schedule, compute_loan, loan_advice, LoanRequest, LoanResult, ScheduleEntry,
    ADVICE_HIGH_INTEREST, ADVICE_MANAGEABLE, ADVICE_SUSTAINABLE,
};
pub use validation::{
    validate_loan_request, validate_transaction, validate_transactions, ValidationError,
    ValidationResult, MAX_DESCRIPTION_LEN,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
