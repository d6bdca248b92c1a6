use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub time: DateTime<Utc>,
    pub image: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub time: DateTime<Utc>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNewsRequest {
    pub title: String,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnnouncementRequest {
    pub title: String,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsDetail {
    pub news: News,
    pub paragraphs: Vec<String>,
    pub latest_news: Vec<News>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementDetail {
    pub announcement: Announcement,
    pub paragraphs: Vec<String>,
    pub latest_announcements: Vec<Announcement>,
}

/// Splits body text on sentence stops, dropping blank pieces and re-adding the period.
pub fn paragraphs(content: &str) -> Vec<String> {
    content
        .split('.')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("{p}."))
        .collect()
}
