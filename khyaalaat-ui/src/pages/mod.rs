mod admin_upload;
mod home;
mod login;
mod request;
mod requests;

pub use admin_upload::AdminUploadPage;
pub use home::HomePage;
pub use login::LoginPage;
pub use request::RequestPage;
pub use requests::RequestsPage;
