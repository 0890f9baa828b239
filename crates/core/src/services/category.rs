//! Category catalog service.

use serde::Serialize;
use wyr_common::AppResult;
use wyr_db::{entities::question::Category, repositories::QuestionRepository};

/// Static display metadata for a category.
#[derive(Debug, Clone, Copy)]
pub struct CategoryInfo {
    pub value: Category,
    pub label: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
}

/// The closed category enumeration with its display metadata.
pub const CATEGORY_INFO: [CategoryInfo; 13] = [
    CategoryInfo {
        value: Category::General,
        label: "General",
        description: "Everyday choices and decisions",
        emoji: "🤔",
    },
    CategoryInfo {
        value: Category::Animals,
        label: "Animals",
        description: "Animal-related questions",
        emoji: "🐾",
    },
    CategoryInfo {
        value: Category::Career,
        label: "Career",
        description: "Work and professional life",
        emoji: "💼",
    },
    CategoryInfo {
        value: Category::Ethics,
        label: "Ethics",
        description: "Moral and ethical dilemmas",
        emoji: "⚖️",
    },
    CategoryInfo {
        value: Category::Food,
        label: "Food",
        description: "Culinary choices and preferences",
        emoji: "🍽️",
    },
    CategoryInfo {
        value: Category::Fun,
        label: "Fun",
        description: "Entertainment and leisure",
        emoji: "🎉",
    },
    CategoryInfo {
        value: Category::Health,
        label: "Health",
        description: "Health and wellness topics",
        emoji: "🏥",
    },
    CategoryInfo {
        value: Category::Money,
        label: "Money",
        description: "Financial decisions",
        emoji: "💰",
    },
    CategoryInfo {
        value: Category::PopCulture,
        label: "Pop Culture",
        description: "Movies, music, and trends",
        emoji: "🎬",
    },
    CategoryInfo {
        value: Category::Relationships,
        label: "Relationships",
        description: "Love, friendship, and social connections",
        emoji: "💕",
    },
    CategoryInfo {
        value: Category::SciFi,
        label: "Sci-Fi",
        description: "Science fiction scenarios",
        emoji: "🚀",
    },
    CategoryInfo {
        value: Category::Superpowers,
        label: "Superpowers",
        description: "Superhero abilities and powers",
        emoji: "⚡",
    },
    CategoryInfo {
        value: Category::Travel,
        label: "Travel",
        description: "Adventures and destinations",
        emoji: "✈️",
    },
];

/// A category annotated with its live question count.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithCount {
    pub value: Category,
    pub label: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
    pub count: i64,
}

/// Category catalog service.
#[derive(Clone)]
pub struct CategoryService {
    question_repo: QuestionRepository,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub const fn new(question_repo: QuestionRepository) -> Self {
        Self { question_repo }
    }

    /// The static catalog joined with live question counts. Categories
    /// without questions report zero.
    pub async fn list_with_counts(&self) -> AppResult<Vec<CategoryWithCount>> {
        let counts = self.question_repo.count_group_by_category().await?;

        Ok(CATEGORY_INFO
            .iter()
            .map(|info| {
                let count = counts
                    .iter()
                    .find(|(category, _)| *category == info.value)
                    .map_or(0, |(_, count)| *count);

                CategoryWithCount {
                    value: info.value,
                    label: info.label,
                    description: info.description,
                    emoji: info.emoji,
                    count,
                }
            })
            .collect())
    }
}

/// Map an external dataset category name to the internal enumeration.
///
/// Unknown names fall back to [`Category::General`], matching the bulk
/// importer's behavior.
#[must_use]
pub fn category_from_external_name(name: &str) -> Category {
    match name {
        "Animals" => Category::Animals,
        "Career" => Category::Career,
        "Ethics" => Category::Ethics,
        "Food" => Category::Food,
        "Fun" => Category::Fun,
        "Health" => Category::Health,
        "Money" => Category::Money,
        "Pop Culture" => Category::PopCulture,
        "Relationships" => Category::Relationships,
        "Sci-Fi" => Category::SciFi,
        "Superpowers" => Category::Superpowers,
        "Travel" => Category::Travel,
        _ => Category::General,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn catalog_has_thirteen_unique_categories() {
        let mut values: Vec<Category> = CATEGORY_INFO.iter().map(|c| c.value).collect();
        values.dedup();
        assert_eq!(values.len(), 13);
    }

    #[test]
    fn external_names_map_to_internal_categories() {
        assert_eq!(
            category_from_external_name("Pop Culture"),
            Category::PopCulture
        );
        assert_eq!(category_from_external_name("Sci-Fi"), Category::SciFi);
        assert_eq!(
            category_from_external_name("Something Else"),
            Category::General
        );
    }

    #[tokio::test]
    async fn absent_categories_default_to_zero() {
        // Grouped count query returns no rows at all.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<std::collections::BTreeMap<&str, sea_orm::Value>>::new()])
                .into_connection(),
        );

        let service = CategoryService::new(QuestionRepository::new(db));
        let catalog = service.list_with_counts().await.unwrap();

        assert_eq!(catalog.len(), 13);
        assert!(catalog.iter().all(|c| c.count == 0));
    }
}
