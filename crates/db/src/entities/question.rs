//! Question entity for binary-choice prompts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Topical categories. Stored as a closed string enumeration on the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Category {
    #[sea_orm(string_value = "GENERAL")]
    #[serde(rename = "GENERAL")]
    General,
    #[sea_orm(string_value = "ANIMALS")]
    #[serde(rename = "ANIMALS")]
    Animals,
    #[sea_orm(string_value = "CAREER")]
    #[serde(rename = "CAREER")]
    Career,
    #[sea_orm(string_value = "ETHICS")]
    #[serde(rename = "ETHICS")]
    Ethics,
    #[sea_orm(string_value = "FOOD")]
    #[serde(rename = "FOOD")]
    Food,
    #[sea_orm(string_value = "FUN")]
    #[serde(rename = "FUN")]
    Fun,
    #[sea_orm(string_value = "HEALTH")]
    #[serde(rename = "HEALTH")]
    Health,
    #[sea_orm(string_value = "MONEY")]
    #[serde(rename = "MONEY")]
    Money,
    #[sea_orm(string_value = "POP_CULTURE")]
    #[serde(rename = "POP_CULTURE")]
    PopCulture,
    #[sea_orm(string_value = "RELATIONSHIPS")]
    #[serde(rename = "RELATIONSHIPS")]
    Relationships,
    #[sea_orm(string_value = "SCI_FI")]
    #[serde(rename = "SCI_FI")]
    SciFi,
    #[sea_orm(string_value = "SUPERPOWERS")]
    #[serde(rename = "SUPERPOWERS")]
    Superpowers,
    #[sea_orm(string_value = "TRAVEL")]
    #[serde(rename = "TRAVEL")]
    Travel,
}

impl Category {
    /// Parse a URL path segment or request field, case-insensitively.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GENERAL" => Some(Self::General),
            "ANIMALS" => Some(Self::Animals),
            "CAREER" => Some(Self::Career),
            "ETHICS" => Some(Self::Ethics),
            "FOOD" => Some(Self::Food),
            "FUN" => Some(Self::Fun),
            "HEALTH" => Some(Self::Health),
            "MONEY" => Some(Self::Money),
            "POP_CULTURE" => Some(Self::PopCulture),
            "RELATIONSHIPS" => Some(Self::Relationships),
            "SCI_FI" => Some(Self::SciFi),
            "SUPERPOWERS" => Some(Self::Superpowers),
            "TRAVEL" => Some(Self::Travel),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "question")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(column_type = "Text")]
    pub prompt: String,

    pub category: Category,

    pub sensitive_content: bool,

    /// Imported popularity score; user-created questions start at 0.
    pub score: i32,

    /// NULL = system-seeded question
    #[sea_orm(nullable)]
    pub author_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Author,

    #[sea_orm(has_many = "super::response::Entity")]
    Response,

    #[sea_orm(has_many = "super::vote::Entity")]
    Vote,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::response::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Response.def()
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
    fn category_parse_is_case_insensitive() {
        assert_eq!(Category::from_str_loose("sci_fi"), Some(Category::SciFi));
        assert_eq!(
            Category::from_str_loose("SUPERPOWERS"),
            Some(Category::Superpowers)
        );
        assert_eq!(Category::from_str_loose("unknown"), None);
    }
}
