use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One result row as persisted by the backend: one participant, one rally,
/// one class. At most one of `user_id` / `manual_participant_id` is set;
/// rows with neither are matched by name+class only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResult {
    pub rally_id: i64,
    pub user_id: Option<i64>,
    pub manual_participant_id: Option<i64>,
    pub participant_name: String,
    pub class_name: String,
    pub total_points: i64,
    pub class_position: Option<u32>,
}

/// Stable participant key rendered from a resolved identity, e.g. `user:42`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantKey(String);

impl ParticipantKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a result row was tied to a participant. The identifying field lives
/// only in the matching variant, so "exactly one identifier" holds by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParticipantIdentity {
    Registered { user_id: i64 },
    ManualLinked { participant_id: i64 },
    ManualUnlinked { name: String, class_name: String },
}

impl ParticipantIdentity {
    /// Unlinked keys are byte-exact on name and class: near-duplicates stay
    /// separate participants and are surfaced as warnings instead.
    pub fn key(&self) -> ParticipantKey {
        let rendered = match self {
            Self::Registered { user_id } => format!("user:{}", user_id),
            Self::ManualLinked { participant_id } => format!("manual:{}", participant_id),
            Self::ManualUnlinked { name, class_name } => {
                format!("unlinked:{}:{}", name, class_name)
            }
        };
        ParticipantKey(rendered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub identity: ParticipantIdentity,
    pub display_name: String,
}

/// Registered-user record as fetched from the account collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub account_name: String,
    pub player_name: Option<String>,
}

impl UserProfile {
    /// Player name shown in standings, falling back to the account name.
    pub fn display_name(&self) -> &str {
        self.player_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.account_name)
    }
}

/// Stable record for a manually-entered participant that has been linked
/// across rallies by an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualParticipant {
    pub id: i64,
    pub display_name: Option<String>,
}

/// One rally of a championship, in season order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RallyRound {
    pub rally_id: i64,
    pub round_number: u32,
    pub date: Option<NaiveDate>,
}

/// Per-round cell of a class standing. Non-participation is zero-filled,
/// never omitted, so every standing has one entry per championship round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundScore {
    pub rally_id: i64,
    pub round_number: u32,
    pub points: i64,
    pub participated: bool,
    pub class_position: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStanding {
    pub participant: Participant,
    pub class_name: String,
    pub scores: Vec<RoundScore>,
    pub total_points: i64,
    pub rounds_participated: u32,
    /// 1-based rank within the class, contiguous after sorting.
    pub championship_position: u32,
}

/// Full season standings, grouped per class, each class pre-sorted and
/// pre-ranked so consumers never re-sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChampionshipStandings {
    pub championship_id: i64,
    pub rounds: Vec<RallyRound>,
    pub classes: BTreeMap<String, Vec<ClassStanding>>,
    pub warnings: Vec<String>,
    pub linked_rows: usize,
    pub unlinked_rows: usize,
    pub skipped_rows: usize,
}

impl ChampionshipStandings {
    pub fn empty(championship_id: i64, warning: impl Into<String>) -> Self {
        Self {
            championship_id,
            rounds: Vec::new(),
            classes: BTreeMap::new(),
            warnings: vec![warning.into()],
            linked_rows: 0,
            unlinked_rows: 0,
            skipped_rows: 0,
        }
    }
}

/// Precomputed team total for one rally+class, owned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTotal {
    pub team_id: i64,
    pub team_name: String,
    pub class_id: i64,
    pub class_name: String,
    pub total_points: i64,
}

/// One team member's individual points in a rally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMemberResult {
    pub team_id: i64,
    pub user_id: i64,
    pub points: i64,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberContribution {
    pub user_id: i64,
    pub display_name: String,
    pub points: i64,
    /// True for the top 3 scorers of the team in this rally.
    pub contributed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRallyResult {
    pub team_id: i64,
    pub team_name: String,
    pub rally_id: i64,
    pub class_id: i64,
    pub class_name: String,
    pub members: Vec<MemberContribution>,
    /// Taken verbatim from the stored team total, not re-derived from the
    /// contributing members.
    pub total_points: i64,
    pub rank: u32,
}
