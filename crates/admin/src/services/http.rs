//! Remote resource backing.
//!
//! Maps the CRUD operations onto `{base}/{collection}` endpoints:
//!
//! | Operation   | Request                          | `Data`           |
//! |-------------|----------------------------------|------------------|
//! | `list_all`  | `GET    /{collection}`           | `{items, total}` |
//! | `get_by_id` | `GET    /{collection}/{id}`      | entity           |
//! | `create`    | `POST   /{collection}`           | entity           |
//! | `update`    | `PUT    /{collection}/{id}`      | entity           |
//! | `delete`    | `DELETE /{collection}/{id}`      | `{deleted}`      |

use std::marker::PhantomData;

use async_trait::async_trait;
use project_tracker_core::{DeleteAck, ListPayload, Resource};
use tracing::instrument;

use super::{ResourceService, ServiceError};
use crate::api::ApiClient;

/// Resource service backed by the Project Tracker API.
pub struct HttpService<R: Resource> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpService<R> {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    fn collection_path() -> String {
        R::COLLECTION.to_string()
    }

    /// Path of one record.
    ///
    /// Empty and dot-segment ids are rejected: URL resolution would turn
    /// them into the collection path (or its parent).
    fn entity_path(id: &R::Id) -> Result<String, ServiceError> {
        let segment = id.as_ref();
        if matches!(segment, "" | "." | "..") {
            return Err(ServiceError::InvalidId(segment.to_string()));
        }
        Ok(format!("{}/{}", R::COLLECTION, encode_segment(segment)))
    }
}

impl<R: Resource> std::fmt::Debug for HttpService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpService")
            .field("collection", &R::COLLECTION)
            .field("client", &self.client)
            .finish()
    }
}

#[async_trait]
impl<R: Resource> ResourceService<R> for HttpService<R> {
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    async fn list_all(&self) -> Result<Vec<R>, ServiceError> {
        let payload: ListPayload<R> = self.client.get(&Self::collection_path()).await?;
        Ok(payload.items)
    }

    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    async fn get_by_id(&self, id: &R::Id) -> Result<R, ServiceError> {
        Ok(self.client.get(&Self::entity_path(id)?).await?)
    }

    #[instrument(skip(self, input), fields(collection = R::COLLECTION))]
    async fn create(&self, input: R::Create) -> Result<R, ServiceError> {
        Ok(self.client.post(&Self::collection_path(), &input).await?)
    }

    #[instrument(skip(self, input), fields(collection = R::COLLECTION))]
    async fn update(&self, input: R::Update) -> Result<R, ServiceError> {
        // The update DTO does not serialize its id; it travels in the path.
        let path = Self::entity_path(R::update_target(&input))?;
        Ok(self.client.put(&path, &input).await?)
    }

    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    async fn delete(&self, id: &R::Id) -> Result<(), ServiceError> {
        let ack: DeleteAck = self.client.delete(&Self::entity_path(id)?).await?;
        if !ack.deleted {
            tracing::debug!(%id, "Server reported nothing to delete");
        }
        Ok(())
    }
}

/// Percent-encode a single path segment.
fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use project_tracker_core::{Dealer, DealerId, Line, LineId};

    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(HttpService::<Line>::collection_path(), "lines");
        assert_eq!(
            HttpService::<Line>::entity_path(&LineId::new("42")).unwrap(),
            "lines/42"
        );
        assert_eq!(
            HttpService::<Dealer>::entity_path(&DealerId::new("a b/c")).unwrap(),
            "dealers/a%20b%2Fc"
        );
        assert_eq!(
            HttpService::<Line>::entity_path(&LineId::new("v1.2")).unwrap(),
            "lines/v1.2"
        );
    }

    #[test]
    fn test_dot_and_empty_ids_are_rejected() {
        for id in ["", ".", ".."] {
            assert_eq!(
                HttpService::<Line>::entity_path(&LineId::new(id)),
                Err(ServiceError::InvalidId(id.to_string()))
            );
        }
    }
}
