//! The [`Resource`] trait implemented by every managed entity.
//!
//! Services, the query cache and the HTTP backing are generic over this
//! trait, so adding a third resource only needs a new entity module.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::Identifier;

/// A CRUD-managed entity with server-assigned identity.
pub trait Resource:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Typed ID of this resource.
    type Id: Identifier;
    /// Payload for `create`: every required field, no id/status/timestamps.
    type Create: Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Payload for `update`: required id, every other field optional.
    type Update: Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Collection name, used as the first element of query keys and as the
    /// API path segment (`lines`, `dealers`).
    const COLLECTION: &'static str;

    fn id(&self) -> &Self::Id;

    /// Build a new entity: `status` defaults to active and both timestamps
    /// are set to `now`.
    fn create(id: Self::Id, input: Self::Create, now: DateTime<Utc>) -> Self;

    /// The entity an update targets.
    fn update_target(input: &Self::Update) -> &Self::Id;

    /// Merge the fields present in `input` over `self` and refresh
    /// `updated_at`. Absent fields are left untouched; the id never changes.
    fn apply_update(&mut self, input: Self::Update, now: DateTime<Utc>);
}
