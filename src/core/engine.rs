use crate::core::championship::aggregate_championship;
use crate::core::resolver::resolve;
use crate::core::team::aggregate_team_rally;
use crate::domain::model::{
    ChampionshipStandings, ManualParticipant, TeamRallyResult, UserProfile,
};
use crate::domain::ports::ResultStore;
use crate::utils::error::Result;
use std::collections::{BTreeSet, HashMap};

/// Orchestrates one standings computation: fetch through the store port,
/// run the pure aggregation, return the ranked output. Every call recomputes
/// from the store's current snapshot; the engine holds no state of its own.
pub struct StandingsEngine<S: ResultStore> {
    store: S,
}

impl<S: ResultStore> StandingsEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn championship_standings(
        &self,
        championship_id: i64,
    ) -> Result<ChampionshipStandings> {
        tracing::info!(championship_id, "computing championship standings");

        let rounds = self.store.championship_rounds(championship_id).await?;
        if rounds.is_empty() {
            tracing::warn!(championship_id, "championship has no active rallies");
            return Ok(ChampionshipStandings::empty(
                championship_id,
                format!("championship {} has no active rallies", championship_id),
            ));
        }

        let rally_ids: Vec<i64> = rounds.iter().map(|round| round.rally_id).collect();
        let rows = self.store.rally_results(&rally_ids).await?;
        tracing::debug!(rallies = rounds.len(), rows = rows.len(), "fetched result rows");

        let user_ids: BTreeSet<i64> = rows.iter().filter_map(|row| row.user_id).collect();
        let manual_ids: BTreeSet<i64> =
            rows.iter().filter_map(|row| row.manual_participant_id).collect();

        let users = self.fetch_users(&user_ids).await?;
        let manual: HashMap<i64, ManualParticipant> = if manual_ids.is_empty() {
            HashMap::new()
        } else {
            let ids: Vec<i64> = manual_ids.into_iter().collect();
            self.store
                .manual_participants(&ids)
                .await?
                .into_iter()
                .map(|record| (record.id, record))
                .collect()
        };

        let resolution = resolve(&rows, &users, &manual);
        let standings = aggregate_championship(championship_id, &rounds, &rows, &resolution);
        tracing::info!(
            classes = standings.classes.len(),
            warnings = standings.warnings.len(),
            "championship standings ready"
        );
        Ok(standings)
    }

    pub async fn team_rally_results(
        &self,
        rally_id: i64,
        class_id: i64,
    ) -> Result<Vec<TeamRallyResult>> {
        tracing::info!(rally_id, class_id, "computing team rally results");

        let totals = self.store.team_totals(rally_id, class_id).await?;
        let mut members = self.store.team_member_results(rally_id, class_id).await?;

        // Fill display names the rows are missing from the account records.
        let unnamed: BTreeSet<i64> = members
            .iter()
            .filter(|row| row.display_name.is_none())
            .map(|row| row.user_id)
            .collect();
        if !unnamed.is_empty() {
            let users = self.fetch_users(&unnamed).await?;
            for row in members.iter_mut().filter(|row| row.display_name.is_none()) {
                if let Some(profile) = users.get(&row.user_id) {
                    row.display_name = Some(profile.display_name().to_string());
                }
            }
        }

        let results = aggregate_team_rally(rally_id, class_id, &totals, &members);
        tracing::info!(teams = results.len(), "team rally results ready");
        Ok(results)
    }

    async fn fetch_users(&self, ids: &BTreeSet<i64>) -> Result<HashMap<i64, UserProfile>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<i64> = ids.iter().copied().collect();
        let profiles = self.store.user_profiles(&ids).await?;
        Ok(profiles
            .into_iter()
            .map(|profile| (profile.id, profile))
            .collect())
    }
}
