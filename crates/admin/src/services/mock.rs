//! In-memory resource backing.
//!
//! Records live in insertion order behind a tokio `RwLock`. Used for local
//! development and as the default backing until a server is configured.

use async_trait::async_trait;
use chrono::Utc;
use project_tracker_core::{
    CreateDealerDto, CreateLineDto, Dealer, DealerId, Identifier, Line, LineId, Resource,
};
use tokio::sync::RwLock;
use tracing::instrument;

use super::{ResourceService, ServiceError};

/// Resource service over an in-memory list.
pub struct MockService<R: Resource> {
    records: RwLock<Vec<R>>,
}

impl<R: Resource> MockService<R> {
    #[must_use]
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    fn not_found(id: &R::Id) -> ServiceError {
        ServiceError::NotFound(format!("{} {id}", R::COLLECTION))
    }
}

impl<R: Resource> std::fmt::Debug for MockService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockService")
            .field("collection", &R::COLLECTION)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<R: Resource> ResourceService<R> for MockService<R> {
    async fn list_all(&self) -> Result<Vec<R>, ServiceError> {
        Ok(self.records.read().await.clone())
    }

    async fn get_by_id(&self, id: &R::Id) -> Result<R, ServiceError> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    #[instrument(skip(self, input), fields(collection = R::COLLECTION))]
    async fn create(&self, input: R::Create) -> Result<R, ServiceError> {
        let record = R::create(R::Id::generate(), input, Utc::now());
        self.records.write().await.push(record.clone());
        tracing::debug!(id = %record.id(), "Created record");
        Ok(record)
    }

    #[instrument(skip(self, input), fields(collection = R::COLLECTION))]
    async fn update(&self, input: R::Update) -> Result<R, ServiceError> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let id = R::update_target(&input).clone();
        let record = records
            .iter_mut()
            .find(|r| *r.id() == id)
            .ok_or_else(|| Self::not_found(&id))?;
        record.apply_update(input, now);
        Ok(record.clone())
    }

    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    async fn delete(&self, id: &R::Id) -> Result<(), ServiceError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            tracing::debug!(%id, "Delete of unknown record ignored");
        }
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Seed Line accounts.
#[must_use]
pub fn line_fixtures() -> Vec<Line> {
    let now = Utc::now();
    vec![Line::create(
        LineId::new("1"),
        CreateLineDto {
            name: "Line 官方帳號".to_string(),
            line_id: "@example".to_string(),
        },
        now,
    )]
}

/// Seed dealers.
#[must_use]
pub fn dealer_fixtures() -> Vec<Dealer> {
    let now = Utc::now();
    vec![
        Dealer::create(
            DealerId::new("1"),
            CreateDealerDto {
                name: "經銷商 A".to_string(),
                code: "DEALER_A".to_string(),
                contact: "張三".to_string(),
                email: "dealer-a@example.com".to_string(),
                phone: "0912-345-678".to_string(),
            },
            now,
        ),
        Dealer::create(
            DealerId::new("2"),
            CreateDealerDto {
                name: "經銷商 B".to_string(),
                code: "DEALER_B".to_string(),
                contact: "李四".to_string(),
                email: "dealer-b@example.com".to_string(),
                phone: "0923-456-789".to_string(),
            },
            now,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use project_tracker_core::{EntityStatus, UpdateDealerDto, UpdateLineDto};

    use super::*;

    fn lines() -> MockService<Line> {
        MockService::new(line_fixtures())
    }

    fn dealers() -> MockService<Dealer> {
        MockService::new(dealer_fixtures())
    }

    #[tokio::test]
    async fn test_line_fixture_listing() {
        let all = lines().list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        let line = &all[0];
        assert_eq!(line.id.as_str(), "1");
        assert_eq!(line.name, "Line 官方帳號");
        assert_eq!(line.line_id, "@example");
        assert_eq!(line.status, EntityStatus::Active);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let err = lines().get_by_id(&LineId::new("999")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "lines 999"));
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = dealers();
        let created = service
            .create(CreateDealerDto {
                name: "經銷商 C".to_string(),
                code: "DEALER_C".to_string(),
                contact: "王五".to_string(),
                email: "c@example.com".to_string(),
                phone: "0900-000-000".to_string(),
            })
            .await
            .unwrap();

        assert!(!created.id.is_empty());
        assert_ne!(created.id.as_str(), "1");
        assert_ne!(created.id.as_str(), "2");
        assert_eq!(created.status, EntityStatus::Active);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = service.get_by_id(&created.id).await.unwrap();
        assert_eq!(fetched, created);

        let all = service.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all.last().map(|d| &d.id), Some(&created.id));
    }

    #[tokio::test]
    async fn test_created_ids_are_unique() {
        let service = lines();
        let input = CreateLineDto {
            name: "n".to_string(),
            line_id: "@n".to_string(),
        };
        let a = service.create(input.clone()).await.unwrap();
        let b = service.create(input).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_update_merges_present_fields() {
        let service = lines();
        let before = service.get_by_id(&LineId::new("1")).await.unwrap();

        let after = service
            .update(UpdateLineDto::new("1").name("X"))
            .await
            .unwrap();

        assert_eq!(after.name, "X");
        assert_eq!(after.line_id, before.line_id);
        assert_eq!(after.status, before.status);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(service.get_by_id(&LineId::new("1")).await.unwrap(), after);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let err = dealers()
            .update(UpdateDealerDto::new("42").status(EntityStatus::Inactive))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let service = dealers();
        let id = DealerId::new("1");
        service.delete(&id).await.unwrap();
        service.delete(&id).await.unwrap();
        assert!(service.get_by_id(&id).await.is_err());
        assert_eq!(service.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_all_land() {
        let service: Arc<MockService<Line>> = Arc::new(MockService::empty());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .create(CreateLineDto {
                            name: format!("line {i}"),
                            line_id: format!("@{i}"),
                        })
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(service.list_all().await.unwrap().len(), 8);
    }
}
