use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Love,
    Sad,
    Motivational,
    Nature,
    Other,
}

/// Genres a visitor can ask for. Deliberately lacks [`Genre::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestGenre {
    Love,
    Sad,
    Motivational,
    Nature,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown genre `{0}`")]
pub struct UnknownGenre(pub String);

impl Genre {
    pub const ALL: [Genre; 5] = [
        Genre::Love,
        Genre::Sad,
        Genre::Motivational,
        Genre::Nature,
        Genre::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Love => "Love",
            Self::Sad => "Sad",
            Self::Motivational => "Motivational",
            Self::Nature => "Nature",
            Self::Other => "Other",
        }
    }
}

impl RequestGenre {
    pub const ALL: [RequestGenre; 4] = [
        RequestGenre::Love,
        RequestGenre::Sad,
        RequestGenre::Motivational,
        RequestGenre::Nature,
    ];

    pub fn as_str(self) -> &'static str {
        Genre::from(self).as_str()
    }
}

impl From<RequestGenre> for Genre {
    fn from(genre: RequestGenre) -> Self {
        match genre {
            RequestGenre::Love => Genre::Love,
            RequestGenre::Sad => Genre::Sad,
            RequestGenre::Motivational => Genre::Motivational,
            RequestGenre::Nature => Genre::Nature,
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RequestGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = UnknownGenre;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Genre::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownGenre(s.to_string()))
    }
}

impl FromStr for RequestGenre {
    type Err = UnknownGenre;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        RequestGenre::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownGenre(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_genres_exclude_other() {
        assert!("Other".parse::<RequestGenre>().is_err());
        assert_eq!("other".parse::<Genre>(), Ok(Genre::Other));
    }

    #[test]
    fn parsing_ignores_case_and_padding() {
        assert_eq!(" nature ".parse::<RequestGenre>(), Ok(RequestGenre::Nature));
        assert_eq!(Genre::from(RequestGenre::Sad), Genre::Sad);
    }
}
