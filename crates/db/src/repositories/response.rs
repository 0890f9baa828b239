//! Response repository.

use std::sync::Arc;

use crate::entities::{response, Response};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use wyr_common::{AppError, AppResult};

/// Response repository for database operations.
#[derive(Clone)]
pub struct ResponseRepository {
    db: Arc<DatabaseConnection>,
}

impl ResponseRepository {
    /// Create a new response repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Responses of a question, order 0 first.
    pub async fn find_by_question(&self, question_id: &str) -> AppResult<Vec<response::Model>> {
        Response::find()
            .filter(response::Column::QuestionId.eq(question_id))
            .order_by_asc(response::Column::Order)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Responses of a question in insertion order. Used by the order-repair
    /// tooling where the order column itself is suspect.
    pub async fn find_by_question_in_id_order(
        &self,
        question_id: &str,
    ) -> AppResult<Vec<response::Model>> {
        Response::find()
            .filter(response::Column::QuestionId.eq(question_id))
            .order_by_asc(response::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a response.
    pub async fn update(&self, model: response::ActiveModel) -> AppResult<response::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_response(id: &str, question_id: &str, order: i16) -> response::Model {
        response::Model {
            id: id.to_string(),
            question_id: question_id.to_string(),
            text: format!("option {order}"),
            order,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_question_orders_a_before_b() {
        let a = create_test_response("r1", "q1", 0);
        let b = create_test_response("r2", "q1", 1);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[a.clone(), b.clone()]])
                .into_connection(),
        );

        let repo = ResponseRepository::new(db);
        let result = repo.find_by_question("q1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].order, 0);
        assert_eq!(result[1].order, 1);
    }

    #[tokio::test]
    async fn test_find_by_question_empty() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<response::Model>::new()])
                .into_connection(),
        );

        let repo = ResponseRepository::new(db);
        let result = repo.find_by_question("q1").await.unwrap();

        assert!(result.is_empty());
    }
}
