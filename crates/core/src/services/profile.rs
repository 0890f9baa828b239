//! Profile and stats aggregation.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use wyr_common::AppResult;
use wyr_db::{
    entities::{
        question::Category,
        user::{self, ContentPreference},
    },
    repositories::{QuestionRepository, ResponseRepository, VoteRepository},
};

use super::question::ResponseView;

const RECENT_QUESTION_LIMIT: u64 = 10;

/// Public-facing identity fields.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub joined_at: DateTime<FixedOffset>,
    pub content_preference: ContentPreference,
}

/// Activity counters for a user.
///
/// Points are votes received across authored questions. Rank is 1 plus
/// the number of users with strictly more points, so ties share a rank.
#[derive(Debug, Clone, Copy)]
pub struct ProfileStats {
    pub questions_created: u64,
    pub votes_cast: u64,
    pub points_earned: u64,
    pub rank: i64,
}

/// An authored question as shown on the profile page.
#[derive(Debug, Clone)]
pub struct RecentQuestion {
    pub id: String,
    pub prompt: String,
    pub category: Category,
    pub sensitive_content: bool,
    pub votes: i64,
    pub created_at: DateTime<FixedOffset>,
    pub responses: Vec<ResponseView>,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub user: UserProfile,
    pub stats: ProfileStats,
    pub recent_questions: Vec<RecentQuestion>,
}

/// Profile service for business logic.
#[derive(Clone)]
pub struct ProfileService {
    question_repo: QuestionRepository,
    response_repo: ResponseRepository,
    vote_repo: VoteRepository,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(
        question_repo: QuestionRepository,
        response_repo: ResponseRepository,
        vote_repo: VoteRepository,
    ) -> Self {
        Self {
            question_repo,
            response_repo,
            vote_repo,
        }
    }

    /// Assemble the full profile for an authenticated user.
    ///
    /// Stats and rank are recomputed per request; the rank aggregate
    /// walks every user, which is acceptable at current scale.
    pub async fn profile(&self, user: &user::Model) -> AppResult<Profile> {
        let questions_created = self.question_repo.count_by_author(&user.id).await?;
        let votes_cast = self.vote_repo.count_by_user(&user.id).await?;
        let points_earned = self.vote_repo.count_received_by_author(&user.id).await?;

        let above = self
            .vote_repo
            .count_users_with_points_above(points_earned as i64)
            .await?;
        let rank = above + 1;

        let recent_questions = self.recent_questions(&user.id).await?;

        Ok(Profile {
            user: UserProfile {
                id: user.id.clone(),
                username: user.username.clone(),
                joined_at: user.created_at,
                content_preference: user.content_preference,
            },
            stats: ProfileStats {
                questions_created,
                votes_cast,
                points_earned,
                rank,
            },
            recent_questions,
        })
    }

    async fn recent_questions(&self, author_id: &str) -> AppResult<Vec<RecentQuestion>> {
        let questions = self
            .question_repo
            .find_recent_by_author(author_id, RECENT_QUESTION_LIMIT)
            .await?;

        let ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        let vote_counts: HashMap<String, i64> = self
            .vote_repo
            .count_by_questions(&ids)
            .await?
            .into_iter()
            .collect();

        let mut recent = Vec::with_capacity(questions.len());
        for q in questions {
            let responses = self
                .response_repo
                .find_by_question(&q.id)
                .await?
                .into_iter()
                .map(|r| ResponseView {
                    id: r.id,
                    text: r.text,
                    order: r.order,
                })
                .collect();

            recent.push(RecentQuestion {
                votes: vote_counts.get(&q.id).copied().unwrap_or(0),
                id: q.id,
                prompt: q.prompt,
                category: q.category,
                sensitive_content: q.sensitive_content,
                created_at: q.created_at,
                responses,
            });
        }

        Ok(recent)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use wyr_db::entities::question;

    fn test_user() -> user::Model {
        user::Model {
            id: "user1".to_string(),
            username: "alice".to_string(),
            username_lower: "alice".to_string(),
            password_hash: "hash".to_string(),
            token: "tok".to_string(),
            content_preference: ContentPreference::SafeOnly,
            created_at: Utc::now().into(),
        }
    }

    fn count_row(count: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        let mut row = std::collections::BTreeMap::new();
        row.insert("num_items", sea_orm::Value::from(count));
        row
    }

    #[tokio::test]
    async fn profile_with_no_activity_is_rank_one() {
        let mut rank_row = std::collections::BTreeMap::new();
        rank_row.insert("count", sea_orm::Value::from(0i64));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // questions created, votes cast, points earned
                .append_query_results([[count_row(0)]])
                .append_query_results([[count_row(0)]])
                .append_query_results([[count_row(0)]])
                // users with strictly more points
                .append_query_results([[rank_row]])
                // recent authored questions
                .append_query_results([Vec::<question::Model>::new()])
                .into_connection(),
        );

        let service = ProfileService::new(
            QuestionRepository::new(Arc::clone(&db)),
            ResponseRepository::new(Arc::clone(&db)),
            VoteRepository::new(db),
        );

        let user = test_user();
        let profile = service.profile(&user).await.unwrap();

        assert_eq!(profile.stats.questions_created, 0);
        assert_eq!(profile.stats.votes_cast, 0);
        assert_eq!(profile.stats.points_earned, 0);
        assert_eq!(profile.stats.rank, 1);
        assert!(profile.recent_questions.is_empty());
        assert_eq!(profile.user.username, "alice");
    }
}
