use crate::domain::model::{
    ManualParticipant, RallyRound, RawMemberResult, RawResult, TeamTotal, UserProfile,
};
use crate::domain::ports::{ResultStore, StoreConfig};
use crate::utils::error::{Result, StandingsError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Store backed by the hosted backend's REST surface. Joined rows arrive
/// with nested relations that are sometimes an object, sometimes an
/// array-of-one, sometimes null; everything is flattened here, once, so the
/// aggregators only ever see the flat row shapes.
pub struct RestResultStore {
    client: Client,
    base_url: String,
}

impl RestResultStore {
    pub fn new(config: &impl StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs()))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_endpoint().trim_end_matches('/').to_string(),
        })
    }

    async fn get_rows(&self, path: &str) -> Result<Vec<Value>> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, "store request");
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StandingsError::StoreError {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().await?;
        match payload {
            Value::Array(rows) => Ok(rows),
            other => Err(StandingsError::PayloadError {
                path: path.to_string(),
                reason: format!("expected an array, got {}", type_name(&other)),
            }),
        }
    }
}

#[async_trait]
impl ResultStore for RestResultStore {
    async fn championship_rounds(&self, championship_id: i64) -> Result<Vec<RallyRound>> {
        let path = format!("championships/{}/rallies", championship_id);
        let rows = self.get_rows(&path).await?;
        rows.iter().map(|row| map_round(&path, row)).collect()
    }

    async fn rally_results(&self, rally_ids: &[i64]) -> Result<Vec<RawResult>> {
        let path = format!("results?rally_ids={}", join_ids(rally_ids));
        let rows = self.get_rows(&path).await?;
        rows.iter().map(|row| map_result_row(&path, row)).collect()
    }

    async fn user_profiles(&self, user_ids: &[i64]) -> Result<Vec<UserProfile>> {
        let path = format!("users?ids={}", join_ids(user_ids));
        let rows = self.get_rows(&path).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(StandingsError::from))
            .collect()
    }

    async fn manual_participants(&self, ids: &[i64]) -> Result<Vec<ManualParticipant>> {
        let path = format!("manual_participants?ids={}", join_ids(ids));
        let rows = self.get_rows(&path).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(StandingsError::from))
            .collect()
    }

    async fn team_totals(&self, rally_id: i64, class_id: i64) -> Result<Vec<TeamTotal>> {
        let path = format!("team_totals?rally_id={}&class_id={}", rally_id, class_id);
        let rows = self.get_rows(&path).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(StandingsError::from))
            .collect()
    }

    async fn team_member_results(
        &self,
        rally_id: i64,
        class_id: i64,
    ) -> Result<Vec<RawMemberResult>> {
        let path = format!(
            "team_member_results?rally_id={}&class_id={}",
            rally_id, class_id
        );
        let rows = self.get_rows(&path).await?;
        rows.iter().map(|row| map_member_row(&path, row)).collect()
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Unwraps a nested relation that may be an object, an array-of-one, or
/// null/absent.
fn nested<'a>(row: &'a Value, key: &str) -> Option<&'a Value> {
    match row.get(key) {
        Some(Value::Object(_)) => row.get(key),
        Some(Value::Array(items)) => items.first(),
        _ => None,
    }
}

fn nested_id(row: &Value, key: &str) -> Option<i64> {
    nested(row, key).and_then(|relation| relation.get("id")).and_then(Value::as_i64)
}

fn required_i64(path: &str, row: &Value, key: &str) -> Result<i64> {
    row.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| StandingsError::PayloadError {
            path: path.to_string(),
            reason: format!("row is missing numeric field '{}'", key),
        })
}

fn string_or_empty(row: &Value, key: &str) -> String {
    row.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn map_round(path: &str, row: &Value) -> Result<RallyRound> {
    let date = row
        .get("date")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse().ok());
    Ok(RallyRound {
        rally_id: required_i64(path, row, "rally_id")?,
        round_number: required_i64(path, row, "round_number")? as u32,
        date,
    })
}

fn map_result_row(path: &str, row: &Value) -> Result<RawResult> {
    Ok(RawResult {
        rally_id: required_i64(path, row, "rally_id")?,
        user_id: row
            .get("user_id")
            .and_then(Value::as_i64)
            .or_else(|| nested_id(row, "users")),
        manual_participant_id: row
            .get("manual_participant_id")
            .and_then(Value::as_i64)
            .or_else(|| nested_id(row, "manual_participants")),
        participant_name: string_or_empty(row, "participant_name"),
        class_name: string_or_empty(row, "class_name"),
        total_points: row.get("total_points").and_then(Value::as_i64).unwrap_or(0),
        class_position: row
            .get("class_position")
            .and_then(Value::as_i64)
            .map(|position| position as u32),
    })
}

fn map_member_row(path: &str, row: &Value) -> Result<RawMemberResult> {
    let user_id = match row.get("user_id").and_then(Value::as_i64) {
        Some(id) => id,
        None => nested_id(row, "users").ok_or_else(|| StandingsError::PayloadError {
            path: path.to_string(),
            reason: "member row has no user id".to_string(),
        })?,
    };
    let display_name = nested(row, "users")
        .and_then(|user| user.get("player_name"))
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string);
    Ok(RawMemberResult {
        team_id: required_i64(path, row, "team_id")?,
        user_id,
        points: row.get("points").and_then(Value::as_i64).unwrap_or(0),
        display_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_row_with_nested_user_object() {
        let row = json!({
            "rally_id": 3,
            "participant_name": "Pekka",
            "class_name": "RC2",
            "total_points": 25,
            "class_position": 1,
            "users": {"id": 7, "player_name": "Pekka"}
        });
        let flat = map_result_row("results", &row).unwrap();
        assert_eq!(flat.user_id, Some(7));
        assert_eq!(flat.manual_participant_id, None);
        assert_eq!(flat.class_position, Some(1));
    }

    #[test]
    fn result_row_with_array_of_one_relation() {
        let row = json!({
            "rally_id": 3,
            "participant_name": "Jari",
            "class_name": "RC2",
            "total_points": 18,
            "manual_participants": [{"id": 4}]
        });
        let flat = map_result_row("results", &row).unwrap();
        assert_eq!(flat.user_id, None);
        assert_eq!(flat.manual_participant_id, Some(4));
        assert_eq!(flat.class_position, None);
    }

    #[test]
    fn result_row_with_null_relations_stays_unlinked() {
        let row = json!({
            "rally_id": 3,
            "participant_name": "Jari",
            "class_name": "RC2",
            "total_points": 18,
            "users": null,
            "manual_participants": []
        });
        let flat = map_result_row("results", &row).unwrap();
        assert_eq!(flat.user_id, None);
        assert_eq!(flat.manual_participant_id, None);
    }

    #[test]
    fn result_row_without_rally_id_is_a_payload_error() {
        let row = json!({"participant_name": "Jari", "class_name": "RC2"});
        assert!(map_result_row("results", &row).is_err());
    }

    #[test]
    fn member_row_takes_name_from_nested_user() {
        let row = json!({
            "team_id": 1,
            "points": 30,
            "users": [{"id": 9, "player_name": "Marcus"}]
        });
        let flat = map_member_row("team_member_results", &row).unwrap();
        assert_eq!(flat.user_id, 9);
        assert_eq!(flat.display_name.as_deref(), Some("Marcus"));
    }

    #[test]
    fn member_row_with_blank_nested_name_stays_unnamed() {
        let row = json!({"team_id": 1, "user_id": 9, "points": 30, "users": {"id": 9, "player_name": "  "}});
        let flat = map_member_row("team_member_results", &row).unwrap();
        assert_eq!(flat.display_name, None);
    }
}
