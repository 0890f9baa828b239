//! Question service: creation, category listings, and unseen selection.

use rand::Rng;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use wyr_common::{AppResult, IdGenerator};
use wyr_db::{
    entities::{
        question::{self, Category},
        response, user,
    },
    repositories::{QuestionRepository, ResponseRepository, UserRepository, VoteRepository},
};

/// Question service for business logic.
#[derive(Clone)]
pub struct QuestionService {
    question_repo: QuestionRepository,
    response_repo: ResponseRepository,
    vote_repo: VoteRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for creating a question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionInput {
    #[validate(length(min = 1, max = 100))]
    pub prompt: String,

    #[validate(length(min = 1, max = 200))]
    pub option_a: String,

    #[validate(length(min = 1, max = 200))]
    pub option_b: String,

    pub category: Option<Category>,

    pub sensitive_content: Option<bool>,
}

/// One selectable option of a question.
#[derive(Debug, Clone)]
pub struct ResponseView {
    pub id: String,
    pub text: String,
    pub order: i16,
}

/// A question with its responses, author and vote count resolved.
#[derive(Debug, Clone)]
pub struct QuestionDetail {
    pub question: question::Model,
    pub responses: Vec<ResponseView>,
    pub author_username: Option<String>,
    pub votes: i64,
}

/// Outcome of the unseen-question selection.
#[derive(Debug)]
pub enum NextQuestion {
    /// A question the caller has not voted on.
    Ready(Box<QuestionDetail>),
    /// Eligible questions exist, but the caller has voted on all of them.
    Exhausted,
    /// No eligible questions exist at all.
    Empty,
}

/// Pagination metadata for category listings.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// A page of questions within one category.
#[derive(Debug)]
pub struct QuestionPage {
    pub questions: Vec<QuestionDetail>,
    pub pagination: Pagination,
}

impl QuestionService {
    /// Create a new question service.
    #[must_use]
    pub const fn new(
        question_repo: QuestionRepository,
        response_repo: ResponseRepository,
        vote_repo: VoteRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            question_repo,
            response_repo,
            vote_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a question with its two ordered responses.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateQuestionInput,
    ) -> AppResult<QuestionDetail> {
        input.validate()?;

        let question_id = self.id_gen.generate();
        let now = chrono::Utc::now();

        let question_model = question::ActiveModel {
            id: Set(question_id.clone()),
            prompt: Set(input.prompt),
            category: Set(input.category.unwrap_or(Category::General)),
            sensitive_content: Set(input.sensitive_content.unwrap_or(false)),
            score: Set(0),
            author_id: Set(Some(author.id.clone())),
            created_at: Set(now.into()),
        };

        let response_models = [input.option_a, input.option_b]
            .into_iter()
            .enumerate()
            .map(|(order, text)| response::ActiveModel {
                id: Set(self.id_gen.generate()),
                question_id: Set(question_id.clone()),
                text: Set(text),
                order: Set(order as i16),
                created_at: Set(now.into()),
            })
            .collect();

        let created = self
            .question_repo
            .create_with_responses(question_model, response_models)
            .await?;

        let responses = self.response_views(&created.id).await?;

        Ok(QuestionDetail {
            question: created,
            responses,
            author_username: Some(author.username.clone()),
            votes: 0,
        })
    }

    /// Pick the next question the viewer has not voted on.
    ///
    /// Authenticated viewers get the newest unseen question under their
    /// content preference, deterministically. Anonymous viewers get a
    /// uniformly random safe question via count + random offset; their
    /// filter is forced to safe-only regardless of anything else.
    pub async fn next_unseen(&self, viewer: Option<&user::Model>) -> AppResult<NextQuestion> {
        let sensitive = viewer.map_or(Some(false), |u| u.content_preference.sensitive_filter());

        let picked = match viewer {
            Some(user) => {
                match self
                    .question_repo
                    .find_newest_unseen(&user.id, sensitive)
                    .await?
                {
                    Some(q) => Some(q),
                    None => {
                        if self.question_repo.count_eligible(sensitive).await? == 0 {
                            return Ok(NextQuestion::Empty);
                        }
                        return Ok(NextQuestion::Exhausted);
                    }
                }
            }
            None => {
                let count = self.question_repo.count_eligible(sensitive).await?;
                if count == 0 {
                    return Ok(NextQuestion::Empty);
                }
                let offset = rand::thread_rng().gen_range(0..count);
                // A concurrent delete between count and fetch can miss;
                // treated as exhausted rather than an error.
                self.question_repo.find_at_offset(sensitive, offset).await?
            }
        };

        match picked {
            Some(q) => {
                let vote_counts = self
                    .vote_repo
                    .count_by_questions(std::slice::from_ref(&q.id))
                    .await?;
                let votes = vote_counts.first().map_or(0, |(_, count)| *count);
                let detail = self.assemble(q, votes).await?;
                Ok(NextQuestion::Ready(Box::new(detail)))
            }
            None => Ok(NextQuestion::Exhausted),
        }
    }

    /// A page of questions in one category, highest score first.
    pub async fn list_by_category(
        &self,
        category: Category,
        sensitive: Option<bool>,
        page: u64,
        limit: u64,
    ) -> AppResult<QuestionPage> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);
        let offset = (page - 1) * limit;

        let questions = self
            .question_repo
            .find_by_category(category, sensitive, limit, offset)
            .await?;
        let total_count = self
            .question_repo
            .count_by_category(category, sensitive)
            .await?;

        let ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        let vote_counts = self.vote_repo.count_by_questions(&ids).await?;

        let mut details = Vec::with_capacity(questions.len());
        for q in questions {
            let votes = vote_counts
                .iter()
                .find(|(id, _)| *id == q.id)
                .map_or(0, |(_, count)| *count);
            details.push(self.assemble(q, votes).await?);
        }

        let total_pages = total_count.div_ceil(limit);

        Ok(QuestionPage {
            questions: details,
            pagination: Pagination {
                current_page: page,
                total_pages,
                total_count,
                has_next: page * limit < total_count,
                has_prev: page > 1,
            },
        })
    }

    /// Resolve responses and author display name for one question.
    async fn assemble(&self, q: question::Model, votes: i64) -> AppResult<QuestionDetail> {
        let responses = self.response_views(&q.id).await?;

        let author_username = match &q.author_id {
            Some(author_id) => self
                .user_repo
                .find_by_id(author_id)
                .await?
                .map(|u| u.username),
            None => None,
        };

        Ok(QuestionDetail {
            question: q,
            responses,
            author_username,
            votes,
        })
    }

    async fn response_views(&self, question_id: &str) -> AppResult<Vec<ResponseView>> {
        Ok(self
            .response_repo
            .find_by_question(question_id)
            .await?
            .into_iter()
            .map(|r| ResponseView {
                id: r.id,
                text: r.text,
                order: r.order,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
    use wyr_db::entities::user::ContentPreference;

    #[test]
    fn create_input_enforces_field_lengths() {
        let input = CreateQuestionInput {
            prompt: "x".repeat(101),
            option_a: "Fly".to_string(),
            option_b: "Invisibility".to_string(),
            category: None,
            sensitive_content: None,
        };
        assert!(input.validate().is_err());

        let input = CreateQuestionInput {
            prompt: "Which superpower?".to_string(),
            option_a: String::new(),
            option_b: "Invisibility".to_string(),
            category: Some(Category::Superpowers),
            sensitive_content: Some(false),
        };
        assert!(input.validate().is_err());

        let input = CreateQuestionInput {
            prompt: "Which superpower?".to_string(),
            option_a: "Fly".to_string(),
            option_b: "Invisibility".to_string(),
            category: Some(Category::Superpowers),
            sensitive_content: None,
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn pagination_math() {
        let total_count: u64 = 25;
        let limit: u64 = 10;
        assert_eq!(total_count.div_ceil(limit), 3);

        // page 2 of 25 items at 10 per page
        let page: u64 = 2;
        assert!(page * limit < total_count);
        assert!(page > 1);

        // page 3 is the last page
        let page: u64 = 3;
        assert!(page * limit >= total_count);
    }

    fn test_question(id: &str, sensitive: bool) -> question::Model {
        question::Model {
            id: id.to_string(),
            prompt: "Would you rather?".to_string(),
            category: Category::General,
            sensitive_content: sensitive,
            score: 0,
            author_id: None,
            created_at: Utc::now().into(),
        }
    }

    fn test_response(id: &str, question_id: &str, order: i16) -> response::Model {
        response::Model {
            id: id.to_string(),
            question_id: question_id.to_string(),
            text: format!("option {order}"),
            order,
            created_at: Utc::now().into(),
        }
    }

    fn test_user(preference: ContentPreference) -> user::Model {
        user::Model {
            id: "user1".to_string(),
            username: "alice".to_string(),
            username_lower: "alice".to_string(),
            password_hash: "hash".to_string(),
            token: "tok".to_string(),
            content_preference: preference,
            created_at: Utc::now().into(),
        }
    }

    fn count_row(count: i64) -> BTreeMap<&'static str, Value> {
        let mut row = BTreeMap::new();
        row.insert("num_items", Value::from(count));
        row
    }

    fn no_vote_counts() -> Vec<BTreeMap<&'static str, Value>> {
        Vec::new()
    }

    fn service_over(db: &Arc<DatabaseConnection>) -> QuestionService {
        QuestionService::new(
            QuestionRepository::new(Arc::clone(db)),
            ResponseRepository::new(Arc::clone(db)),
            VoteRepository::new(Arc::clone(db)),
            UserRepository::new(Arc::clone(db)),
        )
    }

    fn queries_issued(service: QuestionService, db: Arc<DatabaseConnection>) -> Vec<String> {
        drop(service);
        Arc::try_unwrap(db)
            .ok()
            .unwrap()
            .into_transaction_log()
            .into_iter()
            .map(|txn| format!("{txn:?}"))
            .collect()
    }

    #[tokio::test]
    async fn anonymous_selection_is_limited_to_safe_questions() {
        // count, random-offset fetch, vote counts, responses
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(1)]])
                .append_query_results([[test_question("q1", false)]])
                .append_query_results([no_vote_counts()])
                .append_query_results([[
                    test_response("r1", "q1", 0),
                    test_response("r2", "q1", 1),
                ]])
                .into_connection(),
        );

        let service = service_over(&db);
        let result = service.next_unseen(None).await.unwrap();
        assert!(matches!(result, NextQuestion::Ready(_)));

        let queries = queries_issued(service, db);
        let count_query = &queries[0];
        assert!(count_query.contains("sensitive_content"), "{count_query}");
        assert!(count_query.contains("Bool(Some(false))"), "{count_query}");
        let fetch_query = &queries[1];
        assert!(fetch_query.contains("Bool(Some(false))"), "{fetch_query}");
    }

    #[tokio::test]
    async fn adult_only_viewer_is_offered_only_sensitive_questions() {
        let viewer = test_user(ContentPreference::AdultOnly);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_question("q1", true)]])
                .append_query_results([no_vote_counts()])
                .append_query_results([[
                    test_response("r1", "q1", 0),
                    test_response("r2", "q1", 1),
                ]])
                .into_connection(),
        );

        let service = service_over(&db);
        let result = service.next_unseen(Some(&viewer)).await.unwrap();
        match result {
            NextQuestion::Ready(detail) => assert!(detail.question.sensitive_content),
            other => panic!("expected a ready question, got {other:?}"),
        }

        let queries = queries_issued(service, db);
        let unseen_query = &queries[0];
        assert!(unseen_query.contains("sensitive_content"), "{unseen_query}");
        assert!(unseen_query.contains("Bool(Some(true))"), "{unseen_query}");
    }

    #[tokio::test]
    async fn authenticated_selection_takes_newest_unseen() {
        let viewer = test_user(ContentPreference::SafeOnly);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_question("q9", false)]])
                .append_query_results([no_vote_counts()])
                .append_query_results([[
                    test_response("r1", "q9", 0),
                    test_response("r2", "q9", 1),
                ]])
                .into_connection(),
        );

        let service = service_over(&db);
        let result = service.next_unseen(Some(&viewer)).await.unwrap();
        match result {
            NextQuestion::Ready(detail) => assert_eq!(detail.question.id, "q9"),
            other => panic!("expected a ready question, got {other:?}"),
        }

        // newest first, excluding questions the viewer already voted on
        let queries = queries_issued(service, db);
        let unseen_query = &queries[0];
        assert!(unseen_query.contains("created_at"), "{unseen_query}");
        assert!(unseen_query.contains("DESC"), "{unseen_query}");
        assert!(unseen_query.contains("NOT IN"), "{unseen_query}");
    }

    #[tokio::test]
    async fn viewer_who_voted_on_everything_is_exhausted() {
        let viewer = test_user(ContentPreference::SafeOnly);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // no unseen question, but eligible questions do exist
                .append_query_results([Vec::<question::Model>::new()])
                .append_query_results([[count_row(2)]])
                .into_connection(),
        );

        let service = service_over(&db);
        let result = service.next_unseen(Some(&viewer)).await.unwrap();

        assert!(matches!(result, NextQuestion::Exhausted));
    }

    #[tokio::test]
    async fn no_eligible_questions_is_empty_for_everyone() {
        let viewer = test_user(ContentPreference::All);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<question::Model>::new()])
                .append_query_results([[count_row(0)]])
                .into_connection(),
        );
        let service = service_over(&db);
        let result = service.next_unseen(Some(&viewer)).await.unwrap();
        assert!(matches!(result, NextQuestion::Empty));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(0)]])
                .into_connection(),
        );
        let service = service_over(&db);
        let result = service.next_unseen(None).await.unwrap();
        assert!(matches!(result, NextQuestion::Empty));
    }
}
