use crate::domain::{Comment, Genre, Poem, PoemImage, PoemRequest, RequestGenre, UserInfo};
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

fn reader(n: u128, name: &str) -> UserInfo {
    UserInfo {
        id: Uuid::from_u128(0x1000 + n),
        name: Some(name.to_string()),
        photo: None,
    }
}

fn comment(n: u128, text: &str, author: UserInfo) -> Comment {
    Comment {
        id: Uuid::from_u128(0x2000 + n),
        text: text.to_string(),
        author,
        created_at: None,
    }
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

pub fn poems() -> Vec<Poem> {
    let alice = reader(1, "Alice Johnson");
    let bob = reader(2, "Bob Smith");
    let carol = reader(3, "Carol Davis");
    let david = reader(4, "David Wilson");
    let eve = reader(5, "Eve Brown");

    vec![
        Poem {
            id: Uuid::from_u128(1),
            title: "Whispers of Dawn".into(),
            caption: Some("A gentle morning poem about new beginnings".into()),
            body: "Golden rays pierce through morning mist,\n\
                   Awakening the world with nature's kiss.\n\
                   Birds sing melodies of hope and light,\n\
                   Chasing away the remnants of night.\n\n\
                   In this moment of perfect peace,\n\
                   All worries and sorrows cease.\n\
                   The earth breathes deep, so fresh and new,\n\
                   Painting the sky in morning's hue."
                .into(),
            genre: Genre::Nature,
            image: PoemImage {
                url: "https://picsum.photos/seed/dawn/600/400".into(),
                hint: "Morning sunrise".into(),
                description: "Beautiful sunrise over mountains".into(),
            },
            likes: vec![alice.clone(), bob],
            comments: vec![comment(
                1,
                "Beautiful poem! Really captures the essence of morning.",
                alice,
            )],
            created_at: None,
        },
        Poem {
            id: Uuid::from_u128(2),
            title: "Love's Eternal Dance".into(),
            caption: Some("A romantic poem about enduring love".into()),
            body: "Two hearts that beat in perfect time,\n\
                   A love that's both pure and sublime.\n\
                   Through seasons of joy and tears we've shared,\n\
                   A bond so strong, beyond compare.\n\n\
                   In your eyes I see my home,\n\
                   No matter how far I may roam.\n\
                   Hand in hand we face each day,\n\
                   Love lighting up our chosen way."
                .into(),
            genre: Genre::Love,
            image: PoemImage {
                url: "https://picsum.photos/seed/sunset/600/400".into(),
                hint: "Romantic sunset".into(),
                description: "Couple watching sunset together".into(),
            },
            likes: vec![carol],
            comments: Vec::new(),
            created_at: None,
        },
        Poem {
            id: Uuid::from_u128(3),
            title: "Rise Above".into(),
            caption: Some("An inspiring poem about overcoming challenges".into()),
            body: "When the mountain seems too high to climb,\n\
                   And you're running short on hope and time,\n\
                   Remember that within you lies\n\
                   The power to reach beyond the skies.\n\n\
                   Each step you take, however small,\n\
                   Builds the strength to conquer all.\n\
                   Rise above the doubt and fear,\n\
                   Your dreams are closer than they appear."
                .into(),
            genre: Genre::Motivational,
            image: PoemImage {
                url: "https://picsum.photos/seed/peak/600/400".into(),
                hint: "Mountain peak".into(),
                description: "Person standing on mountain peak".into(),
            },
            likes: Vec::new(),
            comments: vec![
                comment(
                    2,
                    "This is exactly what I needed to read today. Thank you!",
                    david,
                ),
                comment(3, "Very motivating! Saved this one.", eve),
            ],
            created_at: None,
        },
    ]
}

pub fn requests() -> Vec<PoemRequest> {
    vec![
        PoemRequest {
            id: Uuid::from_u128(0x3001),
            name: "Sarah Miller".into(),
            topic: "Ocean waves".into(),
            genre: RequestGenre::Nature,
            mood: "Peaceful and calming".into(),
            description: "I'd love a poem about the soothing sound of ocean waves and how they bring inner peace.".into(),
            completed: false,
            created_at: at(2024, 10, 1, 10, 0),
        },
        PoemRequest {
            id: Uuid::from_u128(0x3002),
            name: "Michael Chen".into(),
            topic: "First love".into(),
            genre: RequestGenre::Love,
            mood: "Nostalgic and sweet".into(),
            description: "A poem about the butterflies and excitement of experiencing first love in high school.".into(),
            completed: true,
            created_at: at(2024, 9, 30, 15, 30),
        },
    ]
}
