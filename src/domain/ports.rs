use crate::domain::model::{
    ManualParticipant, RallyRound, RawMemberResult, RawResult, TeamTotal, UserProfile,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read-only view of the backend's persisted rows. Implementations fetch;
/// they never interpret. Fetch failures propagate unchanged to the caller
/// and are never retried here.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Rallies of a championship with their round numbers, season order.
    async fn championship_rounds(&self, championship_id: i64) -> Result<Vec<RallyRound>>;

    /// All result rows for the given rallies, every class.
    async fn rally_results(&self, rally_ids: &[i64]) -> Result<Vec<RawResult>>;

    /// Registered-user records for display-name resolution.
    async fn user_profiles(&self, user_ids: &[i64]) -> Result<Vec<UserProfile>>;

    /// Linked manual-participant records.
    async fn manual_participants(&self, ids: &[i64]) -> Result<Vec<ManualParticipant>>;

    /// Precomputed team totals for one rally+class.
    async fn team_totals(&self, rally_id: i64, class_id: i64) -> Result<Vec<TeamTotal>>;

    /// Per-member point rows for one rally+class.
    async fn team_member_results(&self, rally_id: i64, class_id: i64)
        -> Result<Vec<RawMemberResult>>;
}

pub trait StoreConfig: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn request_timeout_secs(&self) -> u64;
}
