//! Form input and the validation rules shared by the browser and the server.
//!
//! Every form is validated in the browser before any server call is made and
//! validated again on the server before anything is written.

use super::{Genre, RequestGenre};
use khyaalaat_errors::FieldErrors;
use serde::{Deserialize, Serialize};

pub const MAX_COMMENT_CHARS: usize = 500;
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const MIN_PASSWORD_CHARS: usize = 6;

fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

fn require_min(errors: &mut FieldErrors, field: &str, value: &str, min: usize, message: &str) {
    if char_len(value) < min {
        errors.push(field, message);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemRequestForm {
    pub name: String,
    pub topic: String,
    pub genre: String,
    pub mood: String,
    pub description: String,
}

/// A request that passed validation, fields trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPoemRequest {
    pub name: String,
    pub topic: String,
    pub genre: RequestGenre,
    pub mood: String,
    pub description: String,
}

impl PoemRequestForm {
    pub fn validate(&self) -> Result<NewPoemRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        require_min(&mut errors, "name", &self.name, 2, "Name must be at least 2 characters.");
        require_min(&mut errors, "topic", &self.topic, 2, "Topic must be at least 2 characters.");
        let genre = self.genre.parse::<RequestGenre>().ok();
        if genre.is_none() {
            errors.push("genre", "Please select a genre.");
        }
        require_min(&mut errors, "mood", &self.mood, 2, "Mood must be at least 2 characters.");
        require_min(
            &mut errors,
            "description",
            &self.description,
            10,
            "Description must be at least 10 characters.",
        );

        match genre {
            Some(genre) if errors.is_empty() => Ok(NewPoemRequest {
                name: self.name.trim().to_string(),
                topic: self.topic.trim().to_string(),
                genre,
                mood: self.mood.trim().to_string(),
                description: self.description.trim().to_string(),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemUploadForm {
    pub title: String,
    pub caption: String,
    pub poem: String,
    pub genre: String,
}

/// An uploaded image file as received from a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPoem {
    pub title: String,
    pub caption: Option<String>,
    pub body: String,
    pub genre: Genre,
}

impl PoemUploadForm {
    /// Checks the text fields only; used by the browser, which has no file
    /// bytes to look at.
    pub fn validate(&self) -> Result<NewPoem, FieldErrors> {
        let mut errors = FieldErrors::new();
        self.check_text(&mut errors);
        self.finish(errors)
    }

    pub fn validate_with_image(&self, image: Option<&ImageUpload>) -> Result<NewPoem, FieldErrors> {
        let mut errors = FieldErrors::new();
        self.check_text(&mut errors);
        match image {
            None => errors.push("image", "Image is required."),
            Some(image) if image.bytes.is_empty() => errors.push("image", "Image is required."),
            Some(image) if !image.content_type.starts_with("image/") => {
                errors.push("image", "The uploaded file must be an image.")
            }
            Some(image) if image.bytes.len() > MAX_IMAGE_BYTES => {
                errors.push("image", "Images must be 5 MB or smaller.")
            }
            Some(_) => {}
        }
        self.finish(errors)
    }

    fn check_text(&self, errors: &mut FieldErrors) {
        require_min(errors, "title", &self.title, 2, "Title must be at least 2 characters.");
        require_min(errors, "poem", &self.poem, 10, "Full poem must be at least 10 characters.");
        if self.genre.parse::<Genre>().is_err() {
            errors.push("genre", "Please select a genre.");
        }
    }

    fn finish(&self, errors: FieldErrors) -> Result<NewPoem, FieldErrors> {
        if !errors.is_empty() {
            return Err(errors);
        }
        let genre = self
            .genre
            .parse::<Genre>()
            .map_err(|_| FieldErrors::single("genre", "Please select a genre."))?;
        let caption = self.caption.trim();
        Ok(NewPoem {
            title: self.title.trim().to_string(),
            caption: (!caption.is_empty()).then(|| caption.to_string()),
            body: self.poem.trim_end().to_string(),
            genre,
        })
    }
}

pub fn validate_comment(text: &str) -> Result<String, FieldErrors> {
    let text = text.trim();
    if text.is_empty() {
        return Err(FieldErrors::single("comment", "Comment cannot be empty."));
    }
    if text.chars().count() > MAX_COMMENT_CHARS {
        return Err(FieldErrors::single(
            "comment",
            "Comments must be 500 characters or fewer.",
        ));
    }
    Ok(text.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = self.email.trim();
        if !looks_like_email(email) {
            errors.push("email", "Please enter a valid email address.");
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            errors.push("password", "Password must be at least 6 characters.");
        }
        errors.into_result(Credentials {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_form() -> PoemRequestForm {
        PoemRequestForm {
            name: "Sarah Miller".into(),
            topic: "Ocean waves".into(),
            genre: "Nature".into(),
            mood: "Peaceful".into(),
            description: "The soothing sound of waves at night.".into(),
        }
    }

    #[test]
    fn one_character_topic_is_rejected() {
        let form = PoemRequestForm {
            topic: "a".into(),
            ..request_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("topic"), Some("Topic must be at least 2 characters."));
    }

    #[test]
    fn request_genre_other_is_rejected() {
        let form = PoemRequestForm {
            genre: "Other".into(),
            ..request_form()
        };
        assert_eq!(
            form.validate().unwrap_err().get("genre"),
            Some("Please select a genre.")
        );
    }

    #[test]
    fn valid_request_is_trimmed() {
        let form = PoemRequestForm {
            name: "  Sarah  ".into(),
            ..request_form()
        };
        let request = form.validate().unwrap();
        assert_eq!(request.name, "Sarah");
        assert_eq!(request.genre, RequestGenre::Nature);
    }

    #[test]
    fn every_failing_field_is_reported() {
        let errors = PoemRequestForm::default().validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["name", "topic", "genre", "mood", "description"]);
    }

    #[test]
    fn upload_requires_an_image() {
        let form = PoemUploadForm {
            title: "Whispers of Dawn".into(),
            caption: String::new(),
            poem: "Golden rays pierce through morning mist".into(),
            genre: "Other".into(),
        };
        assert!(form.validate().is_ok());
        assert_eq!(
            form.validate_with_image(None).unwrap_err().get("image"),
            Some("Image is required.")
        );

        let not_an_image = ImageUpload {
            file_name: "notes.txt".into(),
            content_type: "text/plain".into(),
            bytes: vec![1, 2, 3],
        };
        assert!(form.validate_with_image(Some(&not_an_image)).is_err());

        let image = ImageUpload {
            file_name: "dawn.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        };
        let poem = form.validate_with_image(Some(&image)).unwrap();
        assert_eq!(poem.caption, None);
        assert_eq!(poem.genre, Genre::Other);
    }

    #[test]
    fn comments_are_trimmed_and_bounded() {
        assert_eq!(validate_comment("  lovely  ").unwrap(), "lovely");
        assert!(validate_comment("   ").is_err());
        assert!(validate_comment(&"x".repeat(MAX_COMMENT_CHARS + 1)).is_err());
    }

    #[test]
    fn credentials_need_an_email_shape() {
        let bad = Credentials {
            email: "poet.example.com".into(),
            password: "secret".into(),
        };
        assert!(bad.validate().unwrap_err().get("email").is_some());

        let good = Credentials {
            email: " poet@example.com ".into(),
            password: "secret".into(),
        };
        assert_eq!(good.validate().unwrap().email, "poet@example.com");
    }
}
