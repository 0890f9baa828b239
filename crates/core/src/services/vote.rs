//! Vote recording and tallying.

use sea_orm::Set;
use wyr_common::{AppError, AppResult, IdGenerator};
use wyr_db::{
    entities::{user, vote},
    repositories::{QuestionRepository, ResponseRepository, VoteRepository},
};

/// A logical choice label. Resolved to the question's order-0 or order-1
/// response exactly once, at the recording boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    A,
    B,
}

impl Choice {
    /// Parse a request-supplied choice letter.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            _ => None,
        }
    }

    /// The response order this label maps to.
    #[must_use]
    pub const fn order(self) -> i16 {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

/// Aggregate tallies returned after a successful vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteResults {
    pub total_votes: u64,
    pub a_votes: u64,
    pub b_votes: u64,
    pub a_percentage: i64,
    pub b_percentage: i64,
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    question_repo: QuestionRepository,
    response_repo: ResponseRepository,
    vote_repo: VoteRepository,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
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
            id_gen: IdGenerator::new(),
        }
    }

    /// Record a vote and return the updated tallies.
    ///
    /// Known users may vote once per question. The pre-check gives the
    /// common duplicate a clean error; the unique index on
    /// (question_id, user_id) settles concurrent duplicates. Anonymous
    /// votes are accepted unconditionally.
    pub async fn cast(
        &self,
        question_id: &str,
        choice: Choice,
        voter: Option<&user::Model>,
    ) -> AppResult<VoteResults> {
        let question = self.question_repo.get_by_id(question_id).await?;

        let responses = self.response_repo.find_by_question(&question.id).await?;
        let chosen = responses
            .iter()
            .find(|r| r.order == choice.order())
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Question {question_id} has no response at order {}",
                    choice.order()
                ))
            })?;

        if let Some(user) = voter
            && self.vote_repo.has_voted(&user.id, &question.id).await?
        {
            return Err(AppError::Conflict(
                "You have already voted on this question".to_string(),
            ));
        }

        let model = vote::ActiveModel {
            id: Set(self.id_gen.generate()),
            question_id: Set(question.id.clone()),
            response_id: Set(chosen.id.clone()),
            user_id: Set(voter.map(|u| u.id.clone())),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.vote_repo.create(model).await?;

        self.tally(&question.id).await
    }

    /// Recompute tallies for a question by counting votes per response.
    pub async fn tally(&self, question_id: &str) -> AppResult<VoteResults> {
        let responses = self.response_repo.find_by_question(question_id).await?;

        let mut a_votes = 0;
        let mut b_votes = 0;
        for response in &responses {
            let count = self.vote_repo.count_by_response(&response.id).await?;
            match response.order {
                0 => a_votes = count,
                1 => b_votes = count,
                _ => {}
            }
        }

        let (a_percentage, b_percentage) = percentages(a_votes, b_votes);

        Ok(VoteResults {
            total_votes: a_votes + b_votes,
            a_votes,
            b_votes,
            a_percentage,
            b_percentage,
        })
    }
}

/// Independently rounded percentages for each side; both 0 when no votes.
#[must_use]
pub fn percentages(a_votes: u64, b_votes: u64) -> (i64, i64) {
    let total = a_votes + b_votes;
    if total == 0 {
        return (0, 0);
    }

    let a = (a_votes as f64 / total as f64 * 100.0).round() as i64;
    let b = (b_votes as f64 / total as f64 * 100.0).round() as i64;
    (a, b)
}
