//! Leave policy and leave request models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Leave policy (annual, sick, ...)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeavePolicy {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub days_per_year: i32,
    /// Upper bound on a single request
    pub max_consecutive_days: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLeavePolicyRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 366))]
    pub days_per_year: i32,
    #[validate(range(min = 1, max = 366))]
    pub max_consecutive_days: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLeavePolicyRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 366))]
    pub days_per_year: Option<i32>,
    #[validate(range(min = 1, max = 366))]
    pub max_consecutive_days: Option<i32>,
    pub is_active: Option<bool>,
}

/// Leave request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "leave_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    /// Pending and approved requests block policy deletion and overlap.
    pub fn is_active(&self) -> bool {
        matches!(self, LeaveStatus::Pending | LeaveStatus::Approved)
    }
}

/// Leave request
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_policy_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i32,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }
}

/// File a leave request. `employee_id` defaults to the caller's own record.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLeaveRequest {
    pub employee_id: Option<Uuid>,
    pub leave_policy_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// Resolved insert payload
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: Uuid,
    pub leave_policy_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i32,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReviewLeaveRequest {
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

/// Status transition applied by approve/reject/cancel
#[derive(Debug, Clone)]
pub struct LeaveTransition {
    pub status: LeaveStatus,
    pub reviewed_by: Option<Uuid>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaveRequestFilters {
    pub status: Option<LeaveStatus>,
    pub employee_id: Option<Uuid>,
    pub leave_policy_id: Option<Uuid>,
}

impl LeaveRequestFilters {
    pub fn matches(&self, request: &LeaveRequest) -> bool {
        self.status.map_or(true, |s| s == request.status)
            && self.employee_id.map_or(true, |id| id == request.employee_id)
            && self
                .leave_policy_id
                .map_or(true, |id| id == request.leave_policy_id)
    }
}

/// Inclusive calendar-day count, `None` when `end < start`.
pub fn leave_days(start: NaiveDate, end: NaiveDate) -> Option<i32> {
    if end < start {
        return None;
    }
    i32::try_from((end - start).num_days() + 1).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_leave_days_inclusive() {
        assert_eq!(leave_days(date(2025, 3, 3), date(2025, 3, 3)), Some(1));
        assert_eq!(leave_days(date(2025, 3, 3), date(2025, 3, 7)), Some(5));
        assert_eq!(leave_days(date(2025, 3, 7), date(2025, 3, 3)), None);
    }

    #[test]
    fn test_active_statuses() {
        assert!(LeaveStatus::Pending.is_active());
        assert!(LeaveStatus::Approved.is_active());
        assert!(!LeaveStatus::Rejected.is_active());
        assert!(!LeaveStatus::Cancelled.is_active());
    }

    #[test]
    fn test_overlap() {
        let req = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            leave_policy_id: Uuid::new_v4(),
            start_date: date(2025, 5, 10),
            end_date: date(2025, 5, 12),
            days: 3,
            reason: None,
            status: LeaveStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(req.overlaps(date(2025, 5, 12), date(2025, 5, 14)));
        assert!(req.overlaps(date(2025, 5, 1), date(2025, 5, 10)));
        assert!(!req.overlaps(date(2025, 5, 13), date(2025, 5, 14)));
    }
}
