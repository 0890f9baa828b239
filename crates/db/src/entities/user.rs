//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which questions a user wants served, keyed on the sensitive-content flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ContentPreference {
    /// No filtering, sensitive and safe questions alike.
    #[sea_orm(string_value = "ALL")]
    #[serde(rename = "ALL")]
    All,
    /// Safe questions only. Default, and forced for anonymous callers.
    #[sea_orm(string_value = "SAFE_ONLY")]
    #[serde(rename = "SAFE_ONLY")]
    SafeOnly,
    /// Sensitive questions only.
    #[sea_orm(string_value = "ADULT_ONLY")]
    #[serde(rename = "ADULT_ONLY")]
    AdultOnly,
}

impl ContentPreference {
    /// The sensitive-content filter this preference implies.
    ///
    /// `None` means no filter; `Some(flag)` restricts to questions whose
    /// `sensitive_content` equals `flag`.
    #[must_use]
    pub const fn sensitive_filter(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::SafeOnly => Some(false),
            Self::AdultOnly => Some(true),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    pub username_lower: String,

    /// Argon2 password hash
    pub password_hash: String,

    /// Bearer token for API authentication
    #[sea_orm(unique)]
    pub token: String,

    pub content_preference: ContentPreference,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::question::Entity")]
    Question,

    #[sea_orm(has_many = "super::vote::Entity")]
    Vote,
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitive_filter_maps_preferences() {
        assert_eq!(ContentPreference::All.sensitive_filter(), None);
        assert_eq!(ContentPreference::SafeOnly.sensitive_filter(), Some(false));
        assert_eq!(ContentPreference::AdultOnly.sensitive_filter(), Some(true));
    }
}
