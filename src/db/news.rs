use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{Announcement, NewAnnouncementRequest, NewNewsRequest, News};

pub async fn insert_news(db: &SqlitePool, req: NewNewsRequest) -> Result<News, sqlx::Error> {
    let time = req.time.unwrap_or_else(Utc::now);

    let id = sqlx::query("INSERT INTO news (title, time, image, content) VALUES (?1, ?2, ?3, ?4)")
        .bind(&req.title)
        .bind(time)
        .bind(&req.image)
        .bind(&req.content)
        .execute(db)
        .await?
        .last_insert_rowid();

    Ok(News {
        id,
        title: req.title,
        time,
        image: req.image,
        content: req.content,
    })
}

pub async fn find_news(db: &SqlitePool, id: i64) -> Result<Option<News>, sqlx::Error> {
    sqlx::query_as::<_, News>("SELECT id, title, time, image, content FROM news WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Newest first, optionally leaving out the item currently being shown.
pub async fn latest_news(
    db: &SqlitePool,
    limit: i64,
    exclude: Option<i64>,
) -> Result<Vec<News>, sqlx::Error> {
    sqlx::query_as::<_, News>(
        r#"
        SELECT id, title, time, image, content
        FROM news
        WHERE ?1 IS NULL OR id != ?1
        ORDER BY time DESC, id DESC
        LIMIT ?2
        "#,
    )
    .bind(exclude)
    .bind(limit)
    .fetch_all(db)
    .await
}

pub async fn insert_announcement(
    db: &SqlitePool,
    req: NewAnnouncementRequest,
) -> Result<Announcement, sqlx::Error> {
    let time = req.time.unwrap_or_else(Utc::now);

    let id = sqlx::query("INSERT INTO announcements (title, time, content) VALUES (?1, ?2, ?3)")
        .bind(&req.title)
        .bind(time)
        .bind(&req.content)
        .execute(db)
        .await?
        .last_insert_rowid();

    Ok(Announcement {
        id,
        title: req.title,
        time,
        content: req.content,
    })
}

pub async fn find_announcement(db: &SqlitePool, id: i64) -> Result<Option<Announcement>, sqlx::Error> {
    sqlx::query_as::<_, Announcement>("SELECT id, title, time, content FROM announcements WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn latest_announcements(db: &SqlitePool, limit: i64) -> Result<Vec<Announcement>, sqlx::Error> {
    sqlx::query_as::<_, Announcement>(
        "SELECT id, title, time, content FROM announcements ORDER BY time DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(db)
    .await
}
