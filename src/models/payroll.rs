//! Payroll domain models
//!
//! Amounts are stored in minor currency units (cents).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payroll_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PayrollStatus {
    Draft,
    Paid,
}

/// Payroll record for one employee and one period
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PayrollRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    /// YYYY-MM
    pub period: String,
    pub gross_pay: i64,
    pub deductions: i64,
    pub net_pay: i64,
    pub status: PayrollStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_amounts"))]
pub struct CreatePayrollRequest {
    pub employee_id: Uuid,
    #[validate(custom(function = "validate_period"))]
    pub period: String,
    #[validate(range(min = 0))]
    pub gross_pay: i64,
    #[validate(range(min = 0))]
    pub deductions: i64,
}

impl CreatePayrollRequest {
    pub fn net_pay(&self) -> i64 {
        self.gross_pay - self.deductions
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayrollFilters {
    pub employee_id: Option<Uuid>,
    pub period: Option<String>,
    pub status: Option<PayrollStatus>,
}

impl PayrollFilters {
    pub fn matches(&self, record: &PayrollRecord) -> bool {
        self.employee_id.map_or(true, |id| id == record.employee_id)
            && self.period.as_deref().map_or(true, |p| p == record.period)
            && self.status.map_or(true, |s| s == record.status)
    }
}

/// Accepts `YYYY-MM` with a real month.
pub fn validate_period(period: &str) -> Result<(), ValidationError> {
    if period.len() != 7 {
        return Err(ValidationError::new("period_format"));
    }
    NaiveDate::parse_from_str(&format!("{}-01", period), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ValidationError::new("period_format"))
}

fn validate_amounts(req: &CreatePayrollRequest) -> Result<(), ValidationError> {
    if req.deductions > req.gross_pay {
        return Err(ValidationError::new("deductions_exceed_gross"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_validation() {
        assert!(validate_period("2025-01").is_ok());
        assert!(validate_period("2025-13").is_err());
        assert!(validate_period("2025-1").is_err());
        assert!(validate_period("January").is_err());
    }

    #[test]
    fn test_deductions_cannot_exceed_gross() {
        let req = CreatePayrollRequest {
            employee_id: Uuid::new_v4(),
            period: "2025-02".to_string(),
            gross_pay: 100_000,
            deductions: 150_000,
        };
        assert!(req.validate().is_err());

        let req = CreatePayrollRequest {
            deductions: 25_000,
            ..req
        };
        assert!(req.validate().is_ok());
        assert_eq!(req.net_pay(), 75_000);
    }
}
