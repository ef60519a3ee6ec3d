//! Queries and mutations for one resource.

use std::collections::HashMap;
use std::sync::Arc;

use project_tracker_core::{Identifier, Resource};
use tokio::sync::RwLock;
use tracing::instrument;

use super::{MutationKind, MutationStatus, QueryClient, QueryKey, QueryOptions, QueryResult};
use crate::services::{ResourceService, ServiceError};

/// Data-fetch layer over a [`ResourceService`].
///
/// Queries go through the shared [`QueryClient`]; mutations call the service
/// directly and invalidate the affected keys on success.
pub struct ResourceQueries<R: Resource> {
    service: Arc<dyn ResourceService<R>>,
    client: QueryClient<R>,
    mutations: RwLock<HashMap<MutationKind, MutationStatus>>,
}

impl<R: Resource> ResourceQueries<R> {
    #[must_use]
    pub fn new(service: Arc<dyn ResourceService<R>>, options: QueryOptions) -> Self {
        Self {
            service,
            client: QueryClient::new(options),
            mutations: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn client(&self) -> &QueryClient<R> {
        &self.client
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All records of this resource.
    ///
    /// An API failure is reported in [`QueryResult::error`] with an empty
    /// collection as data.
    ///
    /// # Errors
    ///
    /// Returns any failure that is not an API error.
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn list(&self) -> Result<QueryResult<Vec<R>>, ServiceError> {
        let service = Arc::clone(&self.service);
        let result = self
            .client
            .collection(move || {
                let service = Arc::clone(&service);
                async move { service.list_all().await }
            })
            .await;

        match result {
            Ok(items) => Ok(QueryResult::ready(items.as_ref().clone())),
            Err(ServiceError::Api(e)) => Ok(QueryResult::failed(Vec::new(), e.error_message)),
            Err(e) => Err(e),
        }
    }

    /// One record by id. Disabled (no fetch, absent data) for an empty id.
    ///
    /// # Errors
    ///
    /// Returns any failure that is not an API error.
    #[instrument(skip(self), fields(collection = R::COLLECTION, id = %id))]
    pub async fn get(&self, id: &R::Id) -> Result<QueryResult<Option<R>>, ServiceError> {
        if id.is_empty() {
            return Ok(QueryResult::ready(None));
        }

        let service = Arc::clone(&self.service);
        let target = id.clone();
        let result = self
            .client
            .entity(id, move || {
                let service = Arc::clone(&service);
                let target = target.clone();
                async move { service.get_by_id(&target).await }
            })
            .await;

        match result {
            Ok(record) => Ok(QueryResult::ready(Some(record.as_ref().clone()))),
            Err(ServiceError::Api(e)) => Ok(QueryResult::failed(None, e.error_message)),
            Err(e) => Err(e),
        }
    }

    /// Current state of the collection query without triggering a fetch.
    pub async fn peek_list(&self) -> QueryResult<Vec<R>> {
        match self.client.peek_collection().await {
            Some(items) => QueryResult::ready(items.as_ref().clone()),
            None => QueryResult {
                data: Vec::new(),
                loading: true,
                error: None,
            },
        }
    }

    /// Current state of an entity query without triggering a fetch.
    pub async fn peek(&self, id: &R::Id) -> QueryResult<Option<R>> {
        if id.is_empty() {
            return QueryResult::ready(None);
        }
        match self.client.peek_entity(id).await {
            Some(record) => QueryResult::ready(Some(record.as_ref().clone())),
            None => QueryResult {
                data: None,
                loading: true,
                error: None,
            },
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a record and invalidate the collection.
    ///
    /// # Errors
    ///
    /// Returns the service error; the mutation status records its message.
    #[instrument(skip(self, input), fields(collection = R::COLLECTION))]
    pub async fn create(&self, input: R::Create) -> Result<R, ServiceError> {
        self.set_status(MutationKind::Create, MutationStatus::Pending).await;
        let result = self.service.create(input).await;
        if result.is_ok() {
            self.client.invalidate(&QueryKey::collection(R::COLLECTION)).await;
        }
        self.finish(MutationKind::Create, result).await
    }

    /// Update a record and invalidate the collection and the record's key.
    ///
    /// # Errors
    ///
    /// Returns the service error; the mutation status records its message.
    #[instrument(skip(self, input), fields(collection = R::COLLECTION))]
    pub async fn update(&self, input: R::Update) -> Result<R, ServiceError> {
        self.set_status(MutationKind::Update, MutationStatus::Pending).await;
        let entity_key = QueryClient::<R>::entity_key(R::update_target(&input));
        let result = self.service.update(input).await;
        if result.is_ok() {
            self.client.invalidate(&QueryKey::collection(R::COLLECTION)).await;
            self.client.invalidate(&entity_key).await;
        }
        self.finish(MutationKind::Update, result).await
    }

    /// Delete a record and invalidate the collection.
    ///
    /// # Errors
    ///
    /// Returns the service error; the mutation status records its message.
    #[instrument(skip(self), fields(collection = R::COLLECTION, id = %id))]
    pub async fn delete(&self, id: &R::Id) -> Result<(), ServiceError> {
        self.set_status(MutationKind::Delete, MutationStatus::Pending).await;
        let result = self.service.delete(id).await;
        if result.is_ok() {
            self.client.invalidate(&QueryKey::collection(R::COLLECTION)).await;
        }
        self.finish(MutationKind::Delete, result).await
    }

    /// Status of the most recent run of `kind`.
    pub async fn mutation_status(&self, kind: MutationKind) -> MutationStatus {
        self.mutations
            .read()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    async fn set_status(&self, kind: MutationKind, status: MutationStatus) {
        self.mutations.write().await.insert(kind, status);
    }

    async fn finish<T>(
        &self,
        kind: MutationKind,
        result: Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let status = match &result {
            Ok(_) => MutationStatus::Success,
            Err(e) => MutationStatus::Error(e.to_string()),
        };
        self.set_status(kind, status).await;
        result
    }
}

impl<R: Resource> std::fmt::Debug for ResourceQueries<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceQueries")
            .field("collection", &R::COLLECTION)
            .field("options", self.client.options())
            .finish_non_exhaustive()
    }
}
