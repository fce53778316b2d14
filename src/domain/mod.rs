pub mod comment;
pub mod post;
pub mod tag;
pub mod user;

pub use comment::Comment;
pub use post::{Post, PostFile, PostPreview, PostSample, PostTags, Rating, Relationships, Score};
pub use tag::TagSuggestion;
pub use user::User;
