// Aggregator - reduce a user's transactions into totals plus a savings tip
// Pure computation: validates, scans once, no I/O.

use crate::db::{Transaction, TxKind};
use crate::validation::{validate_transactions, ValidationError};
use serde::{Deserialize, Serialize};

// ============================================================================
// SUGGESTION MESSAGES
// ============================================================================

pub const SUGGESTION_INSUFFICIENT_DATA: &str = "Add more transactions for better suggestions.";
pub const SUGGESTION_OVERSPENDING: &str =
    "You are spending more than you earn. Review non-essential expenses.";
pub const SUGGESTION_SAVE_MORE: &str =
    "Try to save at least 20% of your income. Small spending cuts can help.";
pub const SUGGESTION_HEALTHY: &str = "Good job! You are saving a healthy portion of your income.";

/// Savings below this share of income trigger the "save more" tip
const HEALTHY_SAVINGS_RATIO: f64 = 0.20;

/// Fewer transactions than this and no tip is meaningful
const MIN_TRANSACTIONS_FOR_SUGGESTION: usize = 2;

// ============================================================================
// AGGREGATE SUMMARY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
    pub transaction_count: usize,
    pub suggestion: String,
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Reduce a transaction list to income/expense totals, balance, and a
/// savings suggestion. The input order never affects the totals.
pub fn aggregate(transactions: &[Transaction]) -> Result<AggregateSummary, Vec<ValidationError>> {
    validate_transactions(transactions)?;

    let mut total_income = 0.0;
    let mut total_expenses = 0.0;

    for tx in transactions {
        match tx.kind {
            TxKind::Income => total_income += tx.amount,
            TxKind::Expense => total_expenses += tx.amount,
        }
    }

    let suggestion = savings_suggestion(transactions.len(), total_income, total_expenses);

    Ok(AggregateSummary {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        transaction_count: transactions.len(),
        suggestion: suggestion.to_string(),
    })
}

/// Pick the savings tip. Rules are evaluated in priority order and the
/// first match wins.
pub fn savings_suggestion(count: usize, total_income: f64, total_expenses: f64) -> &'static str {
    if count < MIN_TRANSACTIONS_FOR_SUGGESTION {
        return SUGGESTION_INSUFFICIENT_DATA;
    }

    if total_expenses > total_income {
        return SUGGESTION_OVERSPENDING;
    }

    // Guard the savings ratio against zero income. Amounts are validated
    // positive, so reaching this branch means both totals are zero.
    if total_income == 0.0 {
        return SUGGESTION_HEALTHY;
    }

    let savings_ratio = (total_income - total_expenses) / total_income;
    if savings_ratio < HEALTHY_SAVINGS_RATIO {
        return SUGGESTION_SAVE_MORE;
    }

    SUGGESTION_HEALTHY
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn income(amount: f64) -> Transaction {
        Transaction::new("alice", "income entry", amount, TxKind::Income, "general")
    }

    fn expense(amount: f64) -> Transaction {
        Transaction::new("alice", "expense entry", amount, TxKind::Expense, "general")
    }

    #[test]
    fn test_income_only() {
        let summary = aggregate(&[income(1000.0), income(250.0)]).unwrap();

        assert_eq!(summary.total_income, 1250.0);
        assert_eq!(summary.total_expenses, 0.0);
        assert_eq!(summary.balance, 1250.0);
    }

    #[test]
    fn test_expense_only() {
        let summary = aggregate(&[expense(300.0), expense(200.0)]).unwrap();

        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expenses, 500.0);
        assert_eq!(summary.balance, -500.0);
        assert_eq!(summary.suggestion, SUGGESTION_OVERSPENDING);
    }

    #[test]
    fn test_totals_are_order_independent() {
        let txs = vec![income(1000.0), expense(250.5), income(75.25), expense(10.0)];
        let mut reversed = txs.clone();
        reversed.reverse();

        let a = aggregate(&txs).unwrap();
        let b = aggregate(&reversed).unwrap();

        assert_eq!(a.total_income, b.total_income);
        assert_eq!(a.total_expenses, b.total_expenses);
        assert_eq!(a.balance, b.balance);
        assert_eq!(a.suggestion, b.suggestion);
    }

    #[test]
    fn test_single_transaction_is_insufficient_data() {
        // The balance math still runs, but no rule after the count check does
        let summary = aggregate(&[income(1000.0)]).unwrap();

        assert_eq!(summary.balance, 1000.0);
        assert_eq!(summary.suggestion, SUGGESTION_INSUFFICIENT_DATA);
    }

    #[test]
    fn test_empty_list_is_insufficient_data() {
        let summary = aggregate(&[]).unwrap();

        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expenses, 0.0);
        assert_eq!(summary.balance, 0.0);
        assert_eq!(summary.suggestion, SUGGESTION_INSUFFICIENT_DATA);
    }

    #[test]
    fn test_overspending() {
        let summary = aggregate(&[income(500.0), expense(600.0)]).unwrap();

        assert_eq!(summary.total_income, 500.0);
        assert_eq!(summary.total_expenses, 600.0);
        assert_eq!(summary.balance, -100.0);
        assert_eq!(summary.suggestion, SUGGESTION_OVERSPENDING);
    }

    #[test]
    fn test_low_savings_ratio() {
        // Saving 100 of 1000 income = 10%, below the 20% bar
        let summary = aggregate(&[income(1000.0), expense(900.0)]).unwrap();

        assert_eq!(summary.suggestion, SUGGESTION_SAVE_MORE);
    }

    #[test]
    fn test_healthy_savings() {
        // Saving 500 of 1000 income = 50%
        let summary = aggregate(&[income(1000.0), expense(500.0)]).unwrap();

        assert_eq!(summary.suggestion, SUGGESTION_HEALTHY);
    }

    #[test]
    fn test_ratio_boundary_is_save_more() {
        // Exactly 20% is not below the bar
        let summary = aggregate(&[income(1000.0), expense(800.0)]).unwrap();
        assert_eq!(summary.suggestion, SUGGESTION_HEALTHY);

        let summary = aggregate(&[income(1000.0), expense(800.01)]).unwrap();
        assert_eq!(summary.suggestion, SUGGESTION_SAVE_MORE);
    }

    #[test]
    fn test_zero_income_guard() {
        // Unreachable through aggregate() with validated amounts, but the
        // guard must never divide by zero
        assert_eq!(savings_suggestion(2, 0.0, 0.0), SUGGESTION_HEALTHY);
        assert_eq!(savings_suggestion(2, 0.0, 10.0), SUGGESTION_OVERSPENDING);
    }

    #[test]
    fn test_invalid_transaction_rejected() {
        let mut bad = income(100.0);
        bad.amount = -100.0;

        let errors = aggregate(&[income(100.0), bad]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "amount");
        assert_eq!(errors[0].context, "Transaction[1]");
    }

    #[test]
    fn test_breakeven_is_save_more() {
        // Income equals expenses: ratio 0, not overspending
        let summary = aggregate(&[income(500.0), expense(500.0)]).unwrap();

        assert_eq!(summary.balance, 0.0);
        assert_eq!(summary.suggestion, SUGGESTION_SAVE_MORE);
    }
}
