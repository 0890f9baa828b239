//! Database repositories.

pub mod question;
pub mod response;
pub mod user;
pub mod vote;

pub use question::QuestionRepository;
pub use response::ResponseRepository;
pub use user::UserRepository;
pub use vote::VoteRepository;
