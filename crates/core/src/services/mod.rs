//! Business logic services.

#![allow(missing_docs)]

pub mod category;
pub mod profile;
pub mod question;
pub mod user;
pub mod vote;

pub use category::{
    category_from_external_name, CategoryInfo, CategoryService, CategoryWithCount, CATEGORY_INFO,
};
pub use profile::{Profile, ProfileService, ProfileStats, RecentQuestion, UserProfile};
pub use question::{
    CreateQuestionInput, NextQuestion, Pagination, QuestionDetail, QuestionPage, QuestionService,
    ResponseView,
};
pub use user::{CreateUserInput, UserService};
pub use vote::{Choice, VoteResults, VoteService};
