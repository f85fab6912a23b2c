use crate::core::resolver::ResolutionReport;
use crate::domain::model::{
    ChampionshipStandings, ClassStanding, ParticipantKey, RallyRound, RawResult, RoundScore,
};
use std::collections::{BTreeMap, HashMap};

/// Builds season standings from resolved rows. Rankings are computed within
/// each class independently; a participant entered in two classes gets two
/// independent standings.
pub fn aggregate_championship(
    championship_id: i64,
    rounds: &[RallyRound],
    rows: &[RawResult],
    resolution: &ResolutionReport,
) -> ChampionshipStandings {
    let mut rounds = rounds.to_vec();
    rounds.sort_by_key(|round| round.round_number);

    let mut warnings = resolution.warnings.clone();

    // (key, class) -> (rally_id -> row), first row wins on duplicates.
    let mut cells: BTreeMap<(ParticipantKey, String), HashMap<i64, &RawResult>> = BTreeMap::new();
    for (row, key) in rows.iter().zip(&resolution.row_keys) {
        let Some(key) = key else { continue };
        let entry = cells
            .entry((key.clone(), row.class_name.clone()))
            .or_default();
        if entry.insert(row.rally_id, row).is_some() {
            warnings.push(format!(
                "duplicate result for {} in class '{}' at rally {}: keeping the first row",
                key, row.class_name, row.rally_id
            ));
        }
    }

    let mut classes: BTreeMap<String, Vec<ClassStanding>> = BTreeMap::new();
    for ((key, class_name), by_rally) in &cells {
        let Some(participant) = resolution.participant(key) else {
            continue;
        };

        // Exactly one entry per championship round, zero-filled when absent.
        let scores: Vec<RoundScore> = rounds
            .iter()
            .map(|round| match by_rally.get(&round.rally_id) {
                Some(row) => RoundScore {
                    rally_id: round.rally_id,
                    round_number: round.round_number,
                    points: row.total_points,
                    participated: true,
                    class_position: row.class_position,
                },
                None => RoundScore {
                    rally_id: round.rally_id,
                    round_number: round.round_number,
                    points: 0,
                    participated: false,
                    class_position: None,
                },
            })
            .collect();

        let total_points = scores
            .iter()
            .filter(|score| score.participated)
            .map(|score| score.points)
            .sum();
        let rounds_participated = scores.iter().filter(|score| score.participated).count() as u32;

        classes
            .entry(class_name.clone())
            .or_default()
            .push(ClassStanding {
                participant: participant.clone(),
                class_name: class_name.clone(),
                scores,
                total_points,
                rounds_participated,
                championship_position: 0,
            });
    }

    for standings in classes.values_mut() {
        standings.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then(b.rounds_participated.cmp(&a.rounds_participated))
                .then_with(|| a.participant.display_name.cmp(&b.participant.display_name))
        });
        for (index, standing) in standings.iter_mut().enumerate() {
            standing.championship_position = index as u32 + 1;
        }
    }

    ChampionshipStandings {
        championship_id,
        rounds,
        classes,
        warnings,
        linked_rows: resolution.linked_rows,
        unlinked_rows: resolution.unlinked_rows,
        skipped_rows: resolution.skipped_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::resolve;
    use std::collections::HashMap;

    fn round(rally_id: i64, round_number: u32) -> RallyRound {
        RallyRound {
            rally_id,
            round_number,
            date: None,
        }
    }

    fn row(rally_id: i64, user_id: Option<i64>, manual_id: Option<i64>, name: &str, class: &str, points: i64) -> RawResult {
        RawResult {
            rally_id,
            user_id,
            manual_participant_id: manual_id,
            participant_name: name.to_string(),
            class_name: class.to_string(),
            total_points: points,
            class_position: None,
        }
    }

    fn aggregate(rounds: &[RallyRound], rows: &[RawResult]) -> ChampionshipStandings {
        let resolution = resolve(rows, &HashMap::new(), &HashMap::new());
        aggregate_championship(1, rounds, rows, &resolution)
    }

    #[test]
    fn consistency_beats_a_single_big_score() {
        // Spec'd scenario: A scores 25 once, B scores 20 and 30.
        let rounds = vec![round(10, 1), round(11, 2)];
        let rows = vec![
            row(10, Some(1), None, "A", "RC2", 25),
            row(10, None, Some(2), "B", "RC2", 20),
            row(11, None, Some(2), "B", "RC2", 30),
        ];
        let standings = aggregate(&rounds, &rows);

        let class = &standings.classes["RC2"];
        assert_eq!(class.len(), 2);
        assert_eq!(class[0].participant.display_name, "B");
        assert_eq!(class[0].total_points, 50);
        assert_eq!(class[0].rounds_participated, 2);
        assert_eq!(class[0].championship_position, 1);
        assert_eq!(class[1].participant.display_name, "A");
        assert_eq!(class[1].total_points, 25);
        assert_eq!(class[1].rounds_participated, 1);
        assert_eq!(class[1].championship_position, 2);
    }

    #[test]
    fn every_standing_has_one_entry_per_round_in_order() {
        let rounds = vec![round(30, 3), round(10, 1), round(20, 2)];
        let rows = vec![row(20, Some(1), None, "A", "RC2", 15)];
        let standings = aggregate(&rounds, &rows);

        let scores = &standings.classes["RC2"][0].scores;
        assert_eq!(scores.len(), 3);
        assert_eq!(
            scores.iter().map(|s| s.round_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            scores.iter().map(|s| s.participated).collect::<Vec<_>>(),
            vec![false, true, false]
        );
        assert_eq!(scores[0].points, 0);
    }

    #[test]
    fn ties_break_on_rounds_then_name_and_positions_stay_contiguous() {
        let rounds = vec![round(10, 1), round(11, 2)];
        let rows = vec![
            // 30 points in one round
            row(10, Some(1), None, "Single", "RC2", 30),
            // 30 points over two rounds
            row(10, Some(2), None, "Steady", "RC2", 15),
            row(11, Some(2), None, "Steady", "RC2", 15),
            // full tie with Steady, name decides
            row(10, Some(3), None, "Also steady", "RC2", 15),
            row(11, Some(3), None, "Also steady", "RC2", 15),
        ];
        let standings = aggregate(&rounds, &rows);

        let class = &standings.classes["RC2"];
        let order: Vec<&str> = class
            .iter()
            .map(|s| s.participant.display_name.as_str())
            .collect();
        assert_eq!(order, vec!["Also steady", "Steady", "Single"]);
        let positions: Vec<u32> = class.iter().map(|s| s.championship_position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn classes_rank_independently() {
        let rounds = vec![round(10, 1)];
        let rows = vec![
            row(10, Some(1), None, "A", "RC2", 5),
            row(10, Some(2), None, "B", "RC4", 50),
        ];
        let standings = aggregate(&rounds, &rows);

        assert_eq!(standings.classes["RC2"][0].championship_position, 1);
        assert_eq!(standings.classes["RC4"][0].championship_position, 1);
    }

    #[test]
    fn participant_in_two_classes_gets_two_standings() {
        let rounds = vec![round(10, 1)];
        let rows = vec![
            row(10, Some(1), None, "A", "RC2", 5),
            row(10, Some(1), None, "A", "RC4", 8),
        ];
        let standings = aggregate(&rounds, &rows);

        assert_eq!(standings.classes["RC2"].len(), 1);
        assert_eq!(standings.classes["RC4"].len(), 1);
        assert_eq!(standings.classes["RC4"][0].total_points, 8);
    }

    #[test]
    fn duplicate_row_keeps_first_and_warns() {
        let rounds = vec![round(10, 1)];
        let rows = vec![
            row(10, Some(1), None, "A", "RC2", 25),
            row(10, Some(1), None, "A", "RC2", 99),
        ];
        let standings = aggregate(&rounds, &rows);

        assert_eq!(standings.classes["RC2"][0].total_points, 25);
        assert!(standings
            .warnings
            .iter()
            .any(|warning| warning.contains("duplicate result")));
    }

    #[test]
    fn rally_with_no_results_stays_in_the_sequence() {
        let rounds = vec![round(10, 1), round(11, 2)];
        let rows = vec![row(10, Some(1), None, "A", "RC2", 25)];
        let standings = aggregate(&rounds, &rows);

        let scores = &standings.classes["RC2"][0].scores;
        assert_eq!(scores.len(), 2);
        assert!(!scores[1].participated);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let rounds = vec![round(10, 1), round(11, 2)];
        let rows = vec![
            row(10, Some(1), None, "A", "RC2", 25),
            row(11, None, None, "Unlinked", "RC2", 12),
        ];
        let first = aggregate(&rounds, &rows);
        let second = aggregate(&rounds, &rows);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
