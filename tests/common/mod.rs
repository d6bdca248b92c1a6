#![allow(dead_code)]

use chrono::NaiveDate;
use portal::db::{self, repository};
use portal::models::{
    Category, Course, CourseLevel, Department, Gender, NewAccount, NewCourseRequest,
    NewStudentRequest,
};
use sqlx::SqlitePool;

pub async fn setup_db() -> SqlitePool {
    db::connect_in_memory()
        .await
        .expect("Failed to create test db")
}

pub fn student_request(
    username: &str,
    category: Category,
    department: Option<Department>,
) -> NewStudentRequest {
    NewStudentRequest {
        account: NewAccount {
            username: username.to_string(),
            first_name: "Kwame".to_string(),
            last_name: username.to_string(),
            email: format!("{username}@school.test"),
            password: "correct horse".to_string(),
        },
        date_of_birth: NaiveDate::from_ymd_opt(2009, 2, 14).unwrap(),
        gender: Gender::Male,
        phone_number: "0244000000".to_string(),
        address: "12 Market Street".to_string(),
        category,
        enrollment_year: 1,
        current_year: 1,
        gpa: Some(3.2),
        department,
        father_name: "Kofi".to_string(),
        mother_name: "Akosua".to_string(),
        parent_phone_number: "0244000001".to_string(),
        parent_email: Some("parents@school.test".to_string()),
        parent_address: None,
        emergency_contact_name: "Yaw".to_string(),
        emergency_contact_relationship: "Uncle".to_string(),
        emergency_contact_phone_number: "0244000002".to_string(),
        emergency_contact_address: None,
    }
}

pub async fn course(pool: &SqlitePool, code: &str) -> Course {
    repository::insert_course(
        pool,
        NewCourseRequest {
            code: code.to_string(),
            name: format!("Course {code}"),
            description: None,
            credits: 3,
            level: CourseLevel::SeniorSecondary,
        },
    )
    .await
    .expect("Failed to insert course")
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}
