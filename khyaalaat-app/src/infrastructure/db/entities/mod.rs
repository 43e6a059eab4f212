pub mod comment;
pub mod like;
pub mod poem;
pub mod poem_request;
pub mod schema_version;
pub mod user;

pub use comment::Entity as Comment;
pub use like::Entity as Like;
pub use poem::Entity as Poem;
pub use poem_request::Entity as PoemRequest;
pub use schema_version::Entity as SchemaVersion;
pub use user::Entity as User;
