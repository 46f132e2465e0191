use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role-scoped dashboard counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct DashboardStats {
    pub total_cases: i64,
    pub open_cases: i64,
    pub closed_cases: i64,
    pub total_clients: i64,
    pub upcoming_hearings: i64,
    pub total_documents: i64,
    pub unread_notifications: i64,
    /// Admin only: user count per role.
    #[cfg_attr(feature = "server", sqlx(skip))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users_by_role: Option<BTreeMap<String, i64>>,
}
