// Loan Calculator - EMI (equated monthly installment) math plus advice
// Flat monthly compounding: monthly rate = annual percent / 12 / 100.

use crate::validation::{validate_loan_request, ValidationError};
use serde::{Deserialize, Serialize};

// ============================================================================
// ADVICE MESSAGES
// ============================================================================

pub const ADVICE_HIGH_INTEREST: &str =
    "The interest cost is high relative to the loan. Consider a shorter tenure or lower rate.";
pub const ADVICE_MANAGEABLE: &str =
    "Your EMI seems manageable. Ensure your monthly EMI is under 40% of your income.";
pub const ADVICE_SUSTAINABLE: &str =
    "This loan plan appears sustainable based on the provided values.";

/// Total repayment above this multiple of principal reads as costly
const HIGH_INTEREST_RATIO: f64 = 1.8;

/// Monthly payment above this share of principal reads as heavy
const HEAVY_PAYMENT_RATIO: f64 = 0.05;

// ============================================================================
// REQUEST / RESULT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: f64,

    /// Annual interest rate as a percentage, e.g. 12 means 12%
    pub annual_rate_percent: f64,

    pub term_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanResult {
    pub periodic_payment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub advice: String,
}

/// One month of the repayment curve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub month: u32,
    pub interest: f64,
    pub principal_component: f64,
    pub balance: f64,
}

// ============================================================================
// EMI COMPUTATION
// ============================================================================

/// Compute the fixed monthly installment for an amortizing loan.
///
/// Standard formula: EMI = P * r * (1+r)^n / ((1+r)^n - 1).
/// A zero rate degenerates to straight division, guarded explicitly so the
/// formula never divides by zero.
pub fn compute_loan(req: &LoanRequest) -> Result<LoanResult, Vec<ValidationError>> {
    validate_loan_request(req)?;

    let monthly_rate = monthly_rate(req.annual_rate_percent);
    let n = req.term_months as f64;

    let periodic_payment = if monthly_rate == 0.0 {
        req.principal / n
    } else {
        let growth = (1.0 + monthly_rate).powi(req.term_months as i32);
        req.principal * monthly_rate * growth / (growth - 1.0)
    };

    let total_payment = periodic_payment * n;
    let total_interest = total_payment - req.principal;

    // Degenerate inputs must surface as errors, never as NaN/Infinity
    if !periodic_payment.is_finite() || !total_payment.is_finite() {
        return Err(vec![ValidationError::new(
            "LoanRequest",
            "principal",
            "Computation did not produce a finite result",
        )]);
    }

    Ok(LoanResult {
        periodic_payment,
        total_payment,
        total_interest,
        advice: loan_advice(req.principal, periodic_payment, total_payment).to_string(),
    })
}

fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 12.0 / 100.0
}

/// Pick the affordability advice. Rules are evaluated in priority order and
/// the first match wins. An interest-free loan is sustainable by definition,
/// whatever its monthly payment.
pub fn loan_advice(principal: f64, periodic_payment: f64, total_payment: f64) -> &'static str {
    if total_payment <= principal {
        return ADVICE_SUSTAINABLE;
    }

    if total_payment / principal > HIGH_INTEREST_RATIO {
        return ADVICE_HIGH_INTEREST;
    }

    if periodic_payment / principal > HEAVY_PAYMENT_RATIO {
        return ADVICE_MANAGEABLE;
    }

    ADVICE_SUSTAINABLE
}

// ============================================================================
// AMORTIZATION SCHEDULE
// ============================================================================

/// Month-by-month breakdown of the repayment: interest accrued, principal
/// repaid, and the balance left after each installment. The final balance
/// lands at zero up to floating point noise.
pub fn amortization_schedule(req: &LoanRequest) -> Result<Vec<ScheduleEntry>, Vec<ValidationError>> {
    let result = compute_loan(req)?;

    let rate = monthly_rate(req.annual_rate_percent);
    let mut balance = req.principal;
    let mut schedule = Vec::with_capacity(req.term_months as usize);

    for month in 1..=req.term_months {
        let interest = balance * rate;
        let principal_component = result.periodic_payment - interest;
        balance -= principal_component;

        schedule.push(ScheduleEntry {
            month,
            interest,
            principal_component,
            balance,
        });
    }

    Ok(schedule)
}

// ============================================================================
// TESTS
// ============================================================================
