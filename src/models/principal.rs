//! Authenticated caller and the data scope derived from it

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::role::Role;

/// The authenticated caller, resolved once per request from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    /// Employee record linked to the login account, if any
    pub employee_id: Option<Uuid>,
}

impl Principal {
    /// Whether `employee_id` is the caller's own linked record.
    pub fn is_self(&self, employee_id: Uuid) -> bool {
        self.employee_id == Some(employee_id)
    }
}

/// Row-level visibility for one request.
///
/// Detail checks use [`ScopeFilter::permits`] and list queries use
/// [`ScopeFilter::visible_ids`]; both read the same set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
    /// No restriction (ADMIN, HR)
    All,
    /// Only records owned by these employees
    Only(BTreeSet<Uuid>),
}

impl ScopeFilter {
    pub fn only<I: IntoIterator<Item = Uuid>>(ids: I) -> Self {
        ScopeFilter::Only(ids.into_iter().collect())
    }

    pub fn permits(&self, employee_id: Uuid) -> bool {
        match self {
            ScopeFilter::All => true,
            ScopeFilter::Only(ids) => ids.contains(&employee_id),
        }
    }

    /// `None` when unrestricted.
    pub fn visible_ids(&self) -> Option<Vec<Uuid>> {
        match self {
            ScopeFilter::All => None,
            ScopeFilter::Only(ids) => Some(ids.iter().copied().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_all_permits_everything() {
        let scope = ScopeFilter::All;
        assert!(scope.permits(Uuid::new_v4()));
        assert!(scope.visible_ids().is_none());
    }

    #[test]
    fn test_scope_only_agrees_with_visible_ids() {
        let inside = Uuid::new_v4();
        let outside = Uuid::new_v4();
        let scope = ScopeFilter::only([inside]);

        assert!(scope.permits(inside));
        assert!(!scope.permits(outside));
        assert_eq!(scope.visible_ids(), Some(vec![inside]));
    }

    #[test]
    fn test_empty_scope_permits_nothing() {
        let scope = ScopeFilter::only(Vec::new());
        assert!(!scope.permits(Uuid::new_v4()));
        assert_eq!(scope.visible_ids(), Some(vec![]));
    }
}
