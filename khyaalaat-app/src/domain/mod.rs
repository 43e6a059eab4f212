mod forms;
mod genre;
mod outcome;
mod poem;
mod request;
mod user;

pub use forms::{
    validate_comment, Credentials, ImageUpload, NewPoem, NewPoemRequest, PoemRequestForm,
    PoemUploadForm, MAX_COMMENT_CHARS, MAX_IMAGE_BYTES,
};
pub use genre::{Genre, RequestGenre, UnknownGenre};
pub use outcome::WriteOutcome;
pub use poem::{Comment, LikeSummary, Poem, PoemImage, PoemListing};
pub use request::{AppMode, PoemRequest, TopicIdea};
pub use user::{AuthOutcome, UserIdentity, UserInfo, Viewer};
