mod comment_section;
mod demo_banner;
mod error_display;
mod field_message;
mod header;
mod like_button;
mod loading_spinner;
mod poem_card;
mod request_table;
mod toast;

pub use comment_section::CommentSection;
pub use demo_banner::DemoBanner;
pub use error_display::ErrorDisplay;
pub use field_message::FieldMessage;
pub use header::Header;
pub use like_button::LikeButton;
pub use loading_spinner::LoadingSpinner;
pub use poem_card::{PoemCard, PoemCell};
pub use request_table::{RequestCell, RequestTable};
pub use toast::ToastHost;
