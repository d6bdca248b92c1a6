mod common;

use portal::db::repository;
use portal::error::AppError;
use portal::models::{Category, Department};
use portal::services::StudentService;
use portal::validation::ValidationError;

use common::{count_rows, setup_db, student_request};

#[tokio::test]
async fn test_junior_ids_start_at_one_and_increment() {
    let pool = setup_db().await;
    let service = StudentService::new(pool.clone());

    let first = service
        .create_student(student_request("j1", Category::Junior, None))
        .await
        .expect("Failed to create student");
    let second = service
        .create_student(student_request("j2", Category::Junior, None))
        .await
        .expect("Failed to create student");

    assert_eq!(first.student_id, "1020101001");
    assert_eq!(second.student_id, "1020101002");

    let found = repository::find_student_by_student_id(&pool, "1020101002")
        .await
        .unwrap()
        .expect("Student not found");
    assert_eq!(found.id, second.id);
}

#[tokio::test]
async fn test_senior_ids_have_their_own_counter() {
    let pool = setup_db().await;
    let service = StudentService::new(pool.clone());

    service
        .create_student(student_request("j1", Category::Junior, None))
        .await
        .expect("Failed to create junior");
    let senior = service
        .create_student(student_request("s1", Category::Senior, Some(Department::Electrical)))
        .await
        .expect("Failed to create senior");

    assert_eq!(senior.student_id, "1020201001");
}

#[tokio::test]
async fn test_junior_department_is_always_cleared() {
    let pool = setup_db().await;
    let service = StudentService::new(pool.clone());

    let student = service
        .create_student(student_request("j1", Category::Junior, Some(Department::Mechanical)))
        .await
        .expect("Failed to create student");
    assert_eq!(student.department, None);

    let stored = repository::find_student_by_id(&pool, &student.id)
        .await
        .unwrap()
        .expect("Student not found");
    assert_eq!(stored.department, None);
}

#[tokio::test]
async fn test_senior_without_department_persists_nothing() {
    let pool = setup_db().await;
    let service = StudentService::new(pool.clone());

    let err = service
        .create_student(student_request("s1", Category::Senior, None))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::DepartmentRequired)
    ));
    assert_eq!(err.to_string(), "Department is required for senior students");
    assert_eq!(count_rows(&pool, "students").await, 0);
    assert_eq!(count_rows(&pool, "users").await, 0);
    assert_eq!(count_rows(&pool, "student_id_counters").await, 0);
}

#[tokio::test]
async fn test_deleted_ids_are_not_reused() {
    let pool = setup_db().await;
    let service = StudentService::new(pool.clone());

    let a = service
        .create_student(student_request("a", Category::Junior, None))
        .await
        .expect("Failed to create A");
    assert!(repository::delete_student(&pool, &a.id).await.unwrap());

    let b = service
        .create_student(student_request("b", Category::Junior, None))
        .await
        .expect("Failed to create B");

    assert_eq!(a.student_id, "1020101001");
    assert_eq!(b.student_id, "1020101002");
}

#[tokio::test]
async fn test_duplicate_username_rolls_back_everything() {
    let pool = setup_db().await;
    let service = StudentService::new(pool.clone());

    service
        .create_student(student_request("dup", Category::Junior, None))
        .await
        .expect("Failed to create first student");

    let err = service
        .create_student(student_request("dup", Category::Junior, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(count_rows(&pool, "students").await, 1);
    assert_eq!(count_rows(&pool, "users").await, 1);

    // the failed attempt must not have burned a counter value
    let next = service
        .create_student(student_request("fresh", Category::Junior, None))
        .await
        .expect("Failed to create student");
    assert_eq!(next.student_id, "1020101002");
}

async fn create_junior(service: &StudentService, username: &str) -> String {
    service
        .create_student(student_request(username, Category::Junior, None))
        .await
        .expect("Failed to create student")
        .student_id
}

async fn execute(pool: &sqlx::SqlitePool, sql: &str) {
    sqlx::query(sql).execute(pool).await.unwrap();
}

#[tokio::test]
async fn test_malformed_legacy_ids_do_not_block_creation() {
    let pool = setup_db().await;
    let service = StudentService::new(pool.clone());

    for username in ["j1", "j2", "j3"] {
        create_junior(&service, username).await;
    }
    // legacy data: no counter row and two corrupted IDs, one longer than the rest
    execute(&pool, "DELETE FROM student_id_counters").await;
    execute(&pool, "UPDATE students SET student_id = '1020101zzzz' WHERE student_id = '1020101001'").await;
    execute(&pool, "UPDATE students SET student_id = '1020101abc' WHERE student_id = '1020101002'").await;

    assert_eq!(create_junior(&service, "j4").await, "1020101004");
    assert_eq!(create_junior(&service, "j5").await, "1020101005");
    assert_eq!(create_junior(&service, "j6").await, "1020101006");
}

#[tokio::test]
async fn test_taken_student_id_is_skipped_on_retry() {
    let pool = setup_db().await;
    let service = StudentService::new(pool.clone());

    create_junior(&service, "j1").await;
    let senior = service
        .create_student(student_request("s1", Category::Senior, Some(Department::Welding)))
        .await
        .expect("Failed to create senior");
    // a senior row squatting on the next junior ID is invisible to the junior scan
    execute(
        &pool,
        &format!("UPDATE students SET student_id = '1020101002' WHERE id = '{}'", senior.id),
    )
    .await;

    assert_eq!(create_junior(&service, "j2").await, "1020101003");
    assert_eq!(count_rows(&pool, "students").await, 3);
}

#[tokio::test]
async fn test_student_id_collision_is_reported_after_retries() {
    let pool = setup_db().await;
    let service = StudentService::new(pool.clone());

    create_junior(&service, "j1").await;
    for (n, username) in ["s1", "s2", "s3"].into_iter().enumerate() {
        let senior = service
            .create_student(student_request(username, Category::Senior, Some(Department::Painting)))
            .await
            .expect("Failed to create senior");
        execute(
            &pool,
            &format!(
                "UPDATE students SET student_id = '102010100{}' WHERE id = '{}'",
                n + 2,
                senior.id
            ),
        )
        .await;
    }

    let err = service
        .create_student(student_request("j2", Category::Junior, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(count_rows(&pool, "students").await, 4);
    assert_eq!(count_rows(&pool, "users").await, 4);
}

#[tokio::test]
async fn test_account_is_linked_one_to_one() {
    let pool = setup_db().await;
    let service = StudentService::new(pool.clone());

    let student = service
        .create_student(student_request("linked", Category::Junior, None))
        .await
        .expect("Failed to create student");

    let account = repository::find_account_by_id(&pool, &student.user_id)
        .await
        .unwrap()
        .expect("Account not found");
    assert_eq!(account.username, "linked");
    assert!(portal::credentials::verify_password("correct horse", &account.password_hash));
}

#[tokio::test]
async fn test_year_out_of_range_is_rejected() {
    let pool = setup_db().await;
    let service = StudentService::new(pool.clone());

    let mut req = student_request("late", Category::Junior, None);
    req.current_year = 4;

    let err = service.create_student(req).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::YearOutOfRange { .. })
    ));
    assert_eq!(count_rows(&pool, "students").await, 0);
}
