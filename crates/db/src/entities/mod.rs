//! Database entities.

pub mod question;
pub mod response;
pub mod user;
pub mod vote;

pub use question::Entity as Question;
pub use response::Entity as Response;
pub use user::Entity as User;
pub use vote::Entity as Vote;
