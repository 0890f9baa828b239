//! Vote repository.

use std::sync::Arc;

use crate::entities::{question, vote, Vote};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, SqlErr, Statement,
};
use sea_orm::sea_query::{Expr, Query};
use wyr_common::{AppError, AppResult};

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a known user's vote on a question.
    pub async fn find_by_user_and_question(
        &self,
        user_id: &str,
        question_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::QuestionId.eq(question_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a known user has voted on a question.
    pub async fn has_voted(&self, user_id: &str, question_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_question(user_id, question_id)
            .await?
            .is_some())
    }

    /// Insert a vote. The (question_id, user_id) unique index is the
    /// authority on duplicates; a violation comes back as the
    /// already-voted conflict, which closes the check-then-insert race.
    pub async fn create(&self, model: vote::ActiveModel) -> AppResult<vote::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("You have already voted on this question".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Count votes for one response.
    pub async fn count_by_response(&self, response_id: &str) -> AppResult<u64> {
        Vote::find()
            .filter(vote::Column::ResponseId.eq(response_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count votes cast by a user.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Votes received across all questions authored by a user ("points").
    pub async fn count_received_by_author(&self, author_id: &str) -> AppResult<u64> {
        let authored = Query::select()
            .column(question::Column::Id)
            .from(question::Entity)
            .and_where(Expr::col(question::Column::AuthorId).eq(author_id))
            .to_owned();

        Vote::find()
            .filter(vote::Column::QuestionId.in_subquery(authored))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Vote counts per question for a set of question IDs.
    pub async fn count_by_questions(
        &self,
        question_ids: &[String],
    ) -> AppResult<Vec<(String, i64)>> {
        if question_ids.is_empty() {
            return Ok(vec![]);
        }

        Vote::find()
            .select_only()
            .column(vote::Column::QuestionId)
            .column_as(vote::Column::Id.count(), "count")
            .filter(vote::Column::QuestionId.is_in(question_ids.to_vec()))
            .group_by(vote::Column::QuestionId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users whose received-vote totals strictly exceed `points`.
    ///
    /// Recomputed per profile view via a grouped aggregate; fine at small
    /// scale, a known bottleneck beyond that.
    pub async fn count_users_with_points_above(&self, points: i64) -> AppResult<i64> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            r#"
            SELECT COUNT(*) AS count FROM (
                SELECT u.id
                FROM "user" u
                LEFT JOIN "question" q ON q.author_id = u.id
                LEFT JOIN "vote" v ON v.question_id = q.id
                GROUP BY u.id
                HAVING COUNT(v.id) > $1
            ) ranked
            "#,
            [points.into()],
        );

        let row = self
            .db
            .query_one(stmt)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(row) => row
                .try_get::<i64>("", "count")
                .map_err(|e| AppError::Database(e.to_string())),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_vote(id: &str, question_id: &str, response_id: &str) -> vote::Model {
        vote::Model {
            id: id.to_string(),
            question_id: question_id.to_string(),
            response_id: response_id.to_string(),
            user_id: Some("user1".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_has_voted() {
        let v = create_test_vote("v1", "q1", "r1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[v.clone()]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        assert!(repo.has_voted("user1", "q1").await.unwrap());
    }

    #[tokio::test]
    async fn test_has_not_voted() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<vote::Model>::new()])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        assert!(!repo.has_voted("user1", "q1").await.unwrap());
    }

    #[tokio::test]
    async fn test_count_by_questions_empty_input_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = VoteRepository::new(db);
        let result = repo.count_by_questions(&[]).await.unwrap();

        assert!(result.is_empty());
    }
}
