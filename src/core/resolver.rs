use crate::domain::model::{
    ManualParticipant, Participant, ParticipantIdentity, ParticipantKey, RawResult, UserProfile,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Output of one resolution pass: canonical participants, a per-row key
/// assignment, and the data-quality warnings operators act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub participants: BTreeMap<ParticipantKey, Participant>,
    /// Parallel to the input rows; `None` marks a malformed row that was
    /// excluded from all standings.
    pub row_keys: Vec<Option<ParticipantKey>>,
    pub warnings: Vec<String>,
    pub linked_rows: usize,
    pub unlinked_rows: usize,
    pub skipped_rows: usize,
}

impl ResolutionReport {
    pub fn participant(&self, key: &ParticipantKey) -> Option<&Participant> {
        self.participants.get(key)
    }
}

/// Resolves raw result rows to canonical participants. Pure over the given
/// snapshot: identity is re-derived per call, never cached.
///
/// Priority per row: registered user id, then linked manual-participant id,
/// then byte-exact name+class. Rows with no identifier and an empty name are
/// skipped; an empty-name bucket would collide unrelated people.
pub fn resolve(
    rows: &[RawResult],
    users: &HashMap<i64, UserProfile>,
    manual: &HashMap<i64, ManualParticipant>,
) -> ResolutionReport {
    let mut participants = BTreeMap::new();
    let mut row_keys = Vec::with_capacity(rows.len());
    let mut warnings = Vec::new();
    let mut unlinked_seen = BTreeSet::new();
    let mut linked_rows = 0;
    let mut unlinked_rows = 0;
    let mut skipped_rows = 0;

    for (index, row) in rows.iter().enumerate() {
        let row_name = row.participant_name.trim();

        let resolved = if let Some(user_id) = row.user_id {
            let identity = ParticipantIdentity::Registered { user_id };
            let display_name = match users.get(&user_id) {
                Some(profile) => profile.display_name().to_string(),
                None if !row_name.is_empty() => row_name.to_string(),
                None => format!("user {}", user_id),
            };
            linked_rows += 1;
            Some((identity, display_name))
        } else if let Some(participant_id) = row.manual_participant_id {
            let identity = ParticipantIdentity::ManualLinked { participant_id };
            let linked_name = manual
                .get(&participant_id)
                .and_then(|record| record.display_name.as_deref())
                .filter(|name| !name.trim().is_empty());
            let display_name = match linked_name {
                Some(name) => name.to_string(),
                None => row_name.to_string(),
            };
            linked_rows += 1;
            Some((identity, display_name))
        } else if row_name.is_empty() {
            warnings.push(format!(
                "skipped result row {} in rally {}: no user id, no manual participant id, empty name",
                index, row.rally_id
            ));
            skipped_rows += 1;
            None
        } else {
            let identity = ParticipantIdentity::ManualUnlinked {
                name: row.participant_name.clone(),
                class_name: row.class_name.clone(),
            };
            if unlinked_seen.insert((row.participant_name.clone(), row.class_name.clone())) {
                warnings.push(format!(
                    "unlinked participant '{}' in class '{}': matched by exact name only, link manually for reliable cross-rally identity",
                    row.participant_name, row.class_name
                ));
            }
            unlinked_rows += 1;
            Some((identity, row.participant_name.clone()))
        };

        match resolved {
            Some((identity, display_name)) => {
                let key = identity.key();
                participants.entry(key.clone()).or_insert(Participant {
                    identity,
                    display_name,
                });
                row_keys.push(Some(key));
            }
            None => row_keys.push(None),
        }
    }

    tracing::debug!(
        participants = participants.len(),
        linked_rows,
        unlinked_rows,
        skipped_rows,
        "resolved participants"
    );

    ResolutionReport {
        participants,
        row_keys,
        warnings,
        linked_rows,
        unlinked_rows,
        skipped_rows,
    }
}
