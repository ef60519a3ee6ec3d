//! Dealer records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::Resource;
use crate::types::{DealerId, EntityStatus};

/// A dealer (經銷商) with its primary contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dealer {
    pub id: DealerId,
    pub name: String,
    /// Short dealer code, e.g. `DEALER_A`.
    pub code: String,
    /// Contact person.
    pub contact: String,
    pub email: String,
    pub phone: String,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDealerDto {
    pub name: String,
    pub code: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
}

/// Partial update of a dealer; `id` travels in the request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDealerDto {
    #[serde(skip_serializing)]
    pub id: DealerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
}

impl UpdateDealerDto {
    #[must_use]
    pub fn new(id: impl Into<DealerId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            code: None,
            contact: None,
            email: None,
            phone: None,
            status: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    #[must_use]
    pub const fn status(mut self, status: EntityStatus) -> Self {
        self.status = Some(status);
        self
    }
}

impl Resource for Dealer {
    type Id = DealerId;
    type Create = CreateDealerDto;
    type Update = UpdateDealerDto;

    const COLLECTION: &'static str = "dealers";

    fn id(&self) -> &DealerId {
        &self.id
    }

    fn create(id: DealerId, input: CreateDealerDto, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            code: input.code,
            contact: input.contact,
            email: input.email,
            phone: input.phone,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn update_target(input: &UpdateDealerDto) -> &DealerId {
        &input.id
    }

    fn apply_update(&mut self, input: UpdateDealerDto, now: DateTime<Utc>) {
        let UpdateDealerDto {
            id: _,
            name,
            code,
            contact,
            email,
            phone,
            status,
        } = input;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(code) = code {
            self.code = code;
        }
        if let Some(contact) = contact {
            self.contact = contact;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(status) = status {
            self.status = status;
        }
        self.updated_at = now;
    }
}
