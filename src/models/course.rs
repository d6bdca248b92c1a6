use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum CourseLevel {
    #[default]
    #[serde(rename = "JUN")]
    #[sqlx(rename = "JUN")]
    JuniorSecondary,
    #[serde(rename = "SEN")]
    #[sqlx(rename = "SEN")]
    SeniorSecondary,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: i32,
    pub level: CourseLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub credits: i32,
    #[serde(default)]
    pub level: CourseLevel,
}
