//! Line official accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::Resource;
use crate::types::{EntityStatus, LineId};

/// A Line official account managed by the admin client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: LineId,
    pub name: String,
    /// Public Line ID, e.g. `@example`.
    pub line_id: String,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to register a Line account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLineDto {
    pub name: String,
    pub line_id: String,
}

/// Partial update of a Line account.
///
/// `id` selects the target and is not part of the serialized body; it travels
/// in the request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLineDto {
    #[serde(skip_serializing)]
    pub id: LineId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
}

impl UpdateLineDto {
    /// An update for `id` that changes nothing yet.
    #[must_use]
    pub fn new(id: impl Into<LineId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            line_id: None,
            status: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn line_id(mut self, line_id: impl Into<String>) -> Self {
        self.line_id = Some(line_id.into());
        self
    }

    #[must_use]
    pub const fn status(mut self, status: EntityStatus) -> Self {
        self.status = Some(status);
        self
    }
}

impl Resource for Line {
    type Id = LineId;
    type Create = CreateLineDto;
    type Update = UpdateLineDto;

    const COLLECTION: &'static str = "lines";

    fn id(&self) -> &LineId {
        &self.id
    }

    fn create(id: LineId, input: CreateLineDto, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            line_id: input.line_id,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn update_target(input: &UpdateLineDto) -> &LineId {
        &input.id
    }

    fn apply_update(&mut self, input: UpdateLineDto, now: DateTime<Utc>) {
        if let Some(name) = input.name {
            self.name = name;
        }
        if let Some(line_id) = input.line_id {
            self.line_id = line_id;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;

    fn sample(now: DateTime<Utc>) -> Line {
        Line::create(
            LineId::new("1"),
            CreateLineDto {
                name: "Line 官方帳號".to_string(),
                line_id: "@example".to_string(),
            },
            now,
        )
    }

    #[test]
    fn test_create_defaults() {
        let now = Utc::now();
        let line = sample(now);
        assert_eq!(line.status, EntityStatus::Active);
        assert_eq!(line.created_at, now);
        assert_eq!(line.created_at, line.updated_at);
    }

    #[test]
    fn test_apply_update_changes_only_present_fields() {
        let created = Utc::now();
        let mut line = sample(created);
        let before = line.clone();
        let later = created + Duration::seconds(30);

        line.apply_update(UpdateLineDto::new("1").name("X"), later);

        assert_eq!(line.name, "X");
        assert_eq!(line.updated_at, later);
        assert_eq!(line.id, before.id);
        assert_eq!(line.line_id, before.line_id);
        assert_eq!(line.status, before.status);
        assert_eq!(line.created_at, before.created_at);
    }

    #[test]
    fn test_apply_update_status_transition() {
        let mut line = sample(Utc::now());
        line.apply_update(
            UpdateLineDto::new("1").status(EntityStatus::Inactive),
            Utc::now(),
        );
        assert_eq!(line.status, EntityStatus::Inactive);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let line = sample(Utc::now());
        let value = serde_json::to_value(&line).expect("serialize");
        assert_eq!(value["lineId"], json!("@example"));
        assert_eq!(value["status"], json!("active"));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }

    #[test]
    fn test_update_body_omits_id_and_absent_fields() {
        let update = UpdateLineDto::new("7").line_id("@renamed");
        let value = serde_json::to_value(&update).expect("serialize");
        assert_eq!(value, json!({"lineId": "@renamed"}));
    }
}
