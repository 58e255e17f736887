// Input Validation - fail-fast checks for transactions and loan requests
// All errors are deterministic functions of the input; nothing is retried.

use crate::db::Transaction;
use crate::loan::LoanRequest;

/// Longest description accepted for a transaction
pub const MAX_DESCRIPTION_LEN: usize = 200;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl ValidationError {
    pub fn new(context: &str, field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
            context: context.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

// ============================================================================
// TRANSACTION VALIDATION
// ============================================================================

/// Validate a single transaction before it is stored or aggregated
pub fn validate_transaction(tx: &Transaction) -> ValidationResult {
    let mut errors = Vec::new();

    if tx.description.trim().is_empty() {
        errors.push(ValidationError::new(
            "Transaction",
            "description",
            "Required field is empty",
        ));
    }

    if tx.description.chars().count() > MAX_DESCRIPTION_LEN {
        errors.push(ValidationError::new(
            "Transaction",
            "description",
            format!("Must be at most {} characters", MAX_DESCRIPTION_LEN),
        ));
    }

    if !tx.amount.is_finite() {
        errors.push(ValidationError::new(
            "Transaction",
            "amount",
            "Must be a finite number",
        ));
    } else if tx.amount <= 0.0 {
        errors.push(ValidationError::new(
            "Transaction",
            "amount",
            format!("Must be greater than zero, got {}", tx.amount),
        ));
    }

    if tx.username.trim().is_empty() {
        errors.push(ValidationError::new(
            "Transaction",
            "username",
            "Required field is empty",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate every transaction in a batch, tagging errors with their position
pub fn validate_transactions(transactions: &[Transaction]) -> ValidationResult {
    let mut errors = Vec::new();

    for (i, tx) in transactions.iter().enumerate() {
        if let Err(mut tx_errors) = validate_transaction(tx) {
            for e in &mut tx_errors {
                e.context = format!("Transaction[{}]", i);
            }
            errors.append(&mut tx_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ============================================================================
// LOAN REQUEST VALIDATION
// ============================================================================

/// Validate a loan request before any arithmetic runs
pub fn validate_loan_request(req: &LoanRequest) -> ValidationResult {
    let mut errors = Vec::new();

    if !req.principal.is_finite() || req.principal <= 0.0 {
        errors.push(ValidationError::new(
            "LoanRequest",
            "principal",
            format!("Must be a positive number, got {}", req.principal),
        ));
    }

    if !req.annual_rate_percent.is_finite() || req.annual_rate_percent < 0.0 {
        errors.push(ValidationError::new(
            "LoanRequest",
            "annual_rate_percent",
            format!("Must be zero or positive, got {}", req.annual_rate_percent),
        ));
    }

    if req.term_months == 0 {
        errors.push(ValidationError::new(
            "LoanRequest",
            "term_months",
            "Must be at least 1 month",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Transaction, TxKind};

    fn create_test_transaction() -> Transaction {
        Transaction::new("alice", "Groceries", 45.99, TxKind::Expense, "food")
    }

    #[test]
    fn test_valid_transaction() {
        let tx = create_test_transaction();
        assert!(validate_transaction(&tx).is_ok());
    }

    #[test]
    fn test_empty_description_rejected() {
        let mut tx = create_test_transaction();
        tx.description = "   ".to_string();

        let errors = validate_transaction(&tx).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "description");
    }

    #[test]
    fn test_overlong_description_rejected() {
        let mut tx = create_test_transaction();
        tx.description = "x".repeat(MAX_DESCRIPTION_LEN + 1);

        let errors = validate_transaction(&tx).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "description"));
    }

    #[test]
    fn test_description_at_limit_accepted() {
        let mut tx = create_test_transaction();
        tx.description = "x".repeat(MAX_DESCRIPTION_LEN);

        assert!(validate_transaction(&tx).is_ok());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut tx = create_test_transaction();
        tx.amount = 0.0;

        let errors = validate_transaction(&tx).unwrap_err();
        assert_eq!(errors[0].field, "amount");
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut tx = create_test_transaction();
        tx.amount = -12.50;

        let errors = validate_transaction(&tx).unwrap_err();
        assert_eq!(errors[0].field, "amount");
    }

    #[test]
    fn test_nan_amount_rejected() {
        let mut tx = create_test_transaction();
        tx.amount = f64::NAN;

        let errors = validate_transaction(&tx).unwrap_err();
        assert_eq!(errors[0].field, "amount");
    }

    #[test]
    fn test_batch_errors_tagged_with_position() {
        let good = create_test_transaction();
        let mut bad = create_test_transaction();
        bad.amount = -1.0;

        let errors = validate_transactions(&[good, bad]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].context, "Transaction[1]");
    }

    #[test]
    fn test_loan_request_valid() {
        let req = LoanRequest {
            principal: 100000.0,
            annual_rate_percent: 10.0,
            term_months: 12,
        };
        assert!(validate_loan_request(&req).is_ok());
    }

    #[test]
    fn test_loan_request_negative_principal() {
        let req = LoanRequest {
            principal: -5.0,
            annual_rate_percent: 10.0,
            term_months: 12,
        };

        let errors = validate_loan_request(&req).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "principal");
    }

    #[test]
    fn test_loan_request_negative_rate() {
        let req = LoanRequest {
            principal: 1000.0,
            annual_rate_percent: -1.0,
            term_months: 12,
        };

        let errors = validate_loan_request(&req).unwrap_err();
        assert_eq!(errors[0].field, "annual_rate_percent");
    }

    #[test]
    fn test_loan_request_zero_term() {
        let req = LoanRequest {
            principal: 1000.0,
            annual_rate_percent: 5.0,
            term_months: 0,
        };

        let errors = validate_loan_request(&req).unwrap_err();
        assert_eq!(errors[0].field, "term_months");
    }

    #[test]
    fn test_loan_request_collects_all_errors() {
        let req = LoanRequest {
            principal: 0.0,
            annual_rate_percent: -2.0,
            term_months: 0,
        };

        let errors = validate_loan_request(&req).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
