//! Status enums for managed resources.

use serde::{Deserialize, Serialize};

/// Lifecycle status shared by Line accounts and Dealer records.
///
/// New entities start out [`EntityStatus::Active`]; transitions only happen
/// through an explicit `status` field in an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    #[default]
    Active,
    Inactive,
}

impl EntityStatus {
    /// Wire value (`active` / `inactive`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Display label used by the admin views.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "啟用",
            Self::Inactive => "停用",
        }
    }
}

impl std::fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("invalid status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default_is_active() {
        assert_eq!(EntityStatus::default(), EntityStatus::Active);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&EntityStatus::Inactive).expect("serialize"),
            "\"inactive\""
        );
        let parsed: EntityStatus = serde_json::from_str("\"active\"").expect("deserialize");
        assert_eq!(parsed, EntityStatus::Active);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("inactive".parse::<EntityStatus>(), Ok(EntityStatus::Inactive));
        assert!("archived".parse::<EntityStatus>().is_err());
    }
}
