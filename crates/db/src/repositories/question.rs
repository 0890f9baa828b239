//! Question repository.

use std::sync::Arc;

use crate::entities::{
    question::{self, Category},
    response, vote, Question,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, TransactionTrait,
};
use sea_orm::sea_query::{Expr, Query};
use wyr_common::{AppError, AppResult};

/// Question repository for database operations.
#[derive(Clone)]
pub struct QuestionRepository {
    db: Arc<DatabaseConnection>,
}

impl QuestionRepository {
    /// Create a new question repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a question by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<question::Model>> {
        Question::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a question by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<question::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::QuestionNotFound(id.to_string()))
    }

    /// Create a question together with its responses in one transaction.
    ///
    /// The two-responses-per-question invariant lives in this creation path,
    /// not in the schema.
    pub async fn create_with_responses(
        &self,
        question_model: question::ActiveModel,
        response_models: Vec<response::ActiveModel>,
    ) -> AppResult<question::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = question_model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for model in response_models {
            model
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Newest question the user has not voted on, honoring the sensitive
    /// filter. Deterministic: the same question comes back until they vote.
    pub async fn find_newest_unseen(
        &self,
        user_id: &str,
        sensitive: Option<bool>,
    ) -> AppResult<Option<question::Model>> {
        let seen = Query::select()
            .column(vote::Column::QuestionId)
            .from(vote::Entity)
            .and_where(Expr::col(vote::Column::UserId).eq(user_id))
            .to_owned();

        apply_sensitive_filter(Question::find(), sensitive)
            .filter(question::Column::Id.not_in_subquery(seen))
            .order_by_desc(question::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count questions matching the sensitive filter.
    pub async fn count_eligible(&self, sensitive: Option<bool>) -> AppResult<u64> {
        apply_sensitive_filter(Question::find(), sensitive)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch the question at a row offset within the filtered set,
    /// ordered by creation time for a stable offset mapping.
    pub async fn find_at_offset(
        &self,
        sensitive: Option<bool>,
        offset: u64,
    ) -> AppResult<Option<question::Model>> {
        let rows = apply_sensitive_filter(Question::find(), sensitive)
            .order_by_asc(question::Column::CreatedAt)
            .offset(offset)
            .limit(1)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().next())
    }

    /// Questions in a category (paginated, highest score first).
    pub async fn find_by_category(
        &self,
        category: Category,
        sensitive: Option<bool>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<question::Model>> {
        apply_sensitive_filter(
            Question::find().filter(question::Column::Category.eq(category)),
            sensitive,
        )
        .order_by_desc(question::Column::Score)
        .offset(offset)
        .limit(limit)
        .all(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count questions in a category under the sensitive filter.
    pub async fn count_by_category(
        &self,
        category: Category,
        sensitive: Option<bool>,
    ) -> AppResult<u64> {
        apply_sensitive_filter(
            Question::find().filter(question::Column::Category.eq(category)),
            sensitive,
        )
        .count(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Per-category question counts, for the category catalog.
    pub async fn count_group_by_category(&self) -> AppResult<Vec<(Category, i64)>> {
        Question::find()
            .select_only()
            .column(question::Column::Category)
            .column_as(question::Column::Id.count(), "count")
            .group_by(question::Column::Category)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count questions authored by a user.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Question::find()
            .filter(question::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recent questions authored by a user.
    pub async fn find_recent_by_author(
        &self,
        author_id: &str,
        limit: u64,
    ) -> AppResult<Vec<question::Model>> {
        Question::find()
            .filter(question::Column::AuthorId.eq(author_id))
            .order_by_desc(question::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Page through every question, oldest first. Used by maintenance tooling.
    pub async fn find_page(&self, limit: u64, offset: u64) -> AppResult<Vec<question::Model>> {
        Question::find()
            .order_by_asc(question::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn apply_sensitive_filter(
    query: Select<Question>,
    sensitive: Option<bool>,
) -> Select<Question> {
    match sensitive {
        Some(flag) => query.filter(question::Column::SensitiveContent.eq(flag)),
        None => query,
    }
}
