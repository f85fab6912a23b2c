use crate::domain::model::{MemberContribution, RawMemberResult, TeamRallyResult, TeamTotal};
use std::collections::HashMap;

/// How many members count toward a team's rally score.
pub const CONTRIBUTING_MEMBERS: usize = 3;

/// Computes per-team rally results for one rally+class: best-3-of-N
/// contribution flags and a 1-based rank per class.
///
/// The published team total is the stored one; the best-3 sum is only
/// compared against it so stale totals show up in the logs.
pub fn aggregate_team_rally(
    rally_id: i64,
    class_id: i64,
    totals: &[TeamTotal],
    members: &[RawMemberResult],
) -> Vec<TeamRallyResult> {
    let mut members_by_team: HashMap<i64, Vec<&RawMemberResult>> = HashMap::new();
    for member in members {
        members_by_team.entry(member.team_id).or_default().push(member);
    }

    let known_teams: HashMap<i64, &TeamTotal> =
        totals.iter().map(|total| (total.team_id, total)).collect();
    for member in members {
        if !known_teams.contains_key(&member.team_id) {
            tracing::debug!(
                team_id = member.team_id,
                user_id = member.user_id,
                "dropping member row for a team with no stored total"
            );
        }
    }

    let mut results: Vec<TeamRallyResult> = totals
        .iter()
        .map(|total| {
            let mut contributions: Vec<MemberContribution> = members_by_team
                .get(&total.team_id)
                .map(|rows| {
                    rows.iter()
                        .map(|row| MemberContribution {
                            user_id: row.user_id,
                            display_name: row
                                .display_name
                                .clone()
                                .unwrap_or_else(|| format!("user {}", row.user_id)),
                            points: row.points,
                            contributed: false,
                        })
                        .collect()
                })
                .unwrap_or_default();

            contributions.sort_by(|a, b| {
                b.points
                    .cmp(&a.points)
                    .then_with(|| a.display_name.cmp(&b.display_name))
                    .then(a.user_id.cmp(&b.user_id))
            });
            for contribution in contributions.iter_mut().take(CONTRIBUTING_MEMBERS) {
                contribution.contributed = true;
            }

            let best_sum: i64 = contributions
                .iter()
                .filter(|c| c.contributed)
                .map(|c| c.points)
                .sum();
            if !contributions.is_empty() && best_sum != total.total_points {
                tracing::warn!(
                    team = %total.team_name,
                    rally_id,
                    stored = total.total_points,
                    best_sum,
                    "stored team total differs from best-3 member sum"
                );
            }

            TeamRallyResult {
                team_id: total.team_id,
                team_name: total.team_name.clone(),
                rally_id,
                class_id,
                class_name: total.class_name.clone(),
                members: contributions,
                total_points: total.total_points,
                rank: 0,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.team_name.cmp(&b.team_name))
            .then(a.team_id.cmp(&b.team_id))
    });
    for (index, result) in results.iter_mut().enumerate() {
        result.rank = index as u32 + 1;
    }

    results
}
