use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::warn;
use uuid::Uuid;

use crate::identity;
use crate::models::{
    Account, Category, CohortFilter, Course, Enrollment, EnrollmentView, NewAccount,
    NewCourseRequest, NewStudentRequest, Student, StudentSummary,
};

const STUDENT_COLUMNS: &str = "id, user_id, student_id, date_of_birth, gender, phone_number, \
    address, category, enrollment_year, current_year, gpa, department, father_name, \
    mother_name, parent_phone_number, parent_email, parent_address, emergency_contact_name, \
    emergency_contact_relationship, emergency_contact_phone_number, emergency_contact_address, \
    date_joined, last_updated";

const ENROLLMENT_COLUMNS: &str = "id, student_ref, course_ref, date_enrolled, completed";

/// Stores the account with an already computed password hash.
pub async fn insert_account(
    conn: &mut SqliteConnection,
    req: &NewAccount,
    password_hash: String,
) -> Result<Account, sqlx::Error> {
    let account = Account {
        id: Uuid::new_v4().to_string(),
        username: req.username.trim().to_string(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        email: req.email.trim().to_string(),
        password_hash,
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO users
            (id, username, first_name, last_name, email, password_hash, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&account.id)
    .bind(&account.username)
    .bind(&account.first_name)
    .bind(&account.last_name)
    .bind(&account.email)
    .bind(&account.password_hash)
    .bind(account.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(account)
}

pub async fn find_account_by_id(db: &SqlitePool, id: &str) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT id, username, first_name, last_name, email, password_hash, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn read_student_id_counter(
    conn: &mut SqliteConnection,
    category: Category,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT last_value FROM student_id_counters WHERE category = ?")
        .bind(category)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn fetch_student_ids(
    conn: &mut SqliteConnection,
    category: Category,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT student_id FROM students WHERE category = ? ORDER BY student_id")
        .bind(category)
        .fetch_all(&mut *conn)
        .await
}

pub async fn store_student_id_counter(
    conn: &mut SqliteConnection,
    category: Category,
    value: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO student_id_counters (category, last_value)
        VALUES (?1, ?2)
        ON CONFLICT(category) DO UPDATE SET last_value = max(last_value, excluded.last_value)
        "#,
    )
    .bind(category)
    .bind(value)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Advances the category counter and returns the formatted ID. Must run in
/// the same transaction as the student insert so a rollback releases it.
pub async fn allocate_student_id(
    conn: &mut SqliteConnection,
    category: Category,
) -> Result<String, sqlx::Error> {
    let persisted = read_student_id_counter(&mut *conn, category)
        .await?
        .and_then(|v| u64::try_from(v).ok());
    let ids = fetch_student_ids(&mut *conn, category).await?;

    let scan = identity::scan_suffixes(category, ids.iter().map(String::as_str));
    for bad in &scan.malformed {
        warn!("malformed student id {} in category {}, skipped when counting", bad, category);
    }

    let next = identity::next_counter(persisted, scan.highest);
    store_student_id_counter(&mut *conn, category, counter_value(next)?).await?;

    Ok(identity::format_student_id(category, next))
}

/// Moves the counter past an ID found to be taken so the next allocation
/// skips it.
pub async fn skip_student_id(
    conn: &mut SqliteConnection,
    category: Category,
    taken: &str,
) -> Result<(), sqlx::Error> {
    match identity::parse_suffix(category, taken) {
        Some(value) => store_student_id_counter(&mut *conn, category, counter_value(value)?).await,
        None => Ok(()),
    }
}

fn counter_value(value: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(value)
        .map_err(|_| sqlx::Error::Protocol(format!("student id counter overflow: {value}")))
}

/// Inserts an already validated student. The caller supplies the account and
/// the allocated ID.
pub async fn insert_student(
    conn: &mut SqliteConnection,
    user_id: &str,
    student_id: &str,
    req: &NewStudentRequest,
) -> Result<Student, sqlx::Error> {
    let now = Utc::now();
    let student = Student {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        student_id: student_id.to_string(),
        date_of_birth: req.date_of_birth,
        gender: req.gender,
        phone_number: req.phone_number.clone(),
        address: req.address.clone(),
        category: req.category,
        enrollment_year: req.enrollment_year,
        current_year: req.current_year,
        gpa: req.gpa,
        department: req.department,
        father_name: req.father_name.clone(),
        mother_name: req.mother_name.clone(),
        parent_phone_number: req.parent_phone_number.clone(),
        parent_email: req.parent_email.clone(),
        parent_address: req.parent_address.clone(),
        emergency_contact_name: req.emergency_contact_name.clone(),
        emergency_contact_relationship: req.emergency_contact_relationship.clone(),
        emergency_contact_phone_number: req.emergency_contact_phone_number.clone(),
        emergency_contact_address: req.emergency_contact_address.clone(),
        date_joined: now.date_naive(),
        last_updated: now,
    };

    sqlx::query(&format!(
        "INSERT INTO students ({STUDENT_COLUMNS}) VALUES \
         (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)"
    ))
    .bind(&student.id)
    .bind(&student.user_id)
    .bind(&student.student_id)
    .bind(student.date_of_birth)
    .bind(student.gender)
    .bind(&student.phone_number)
    .bind(&student.address)
    .bind(student.category)
    .bind(student.enrollment_year)
    .bind(student.current_year)
    .bind(student.gpa)
    .bind(student.department)
    .bind(&student.father_name)
    .bind(&student.mother_name)
    .bind(&student.parent_phone_number)
    .bind(&student.parent_email)
    .bind(&student.parent_address)
    .bind(&student.emergency_contact_name)
    .bind(&student.emergency_contact_relationship)
    .bind(&student.emergency_contact_phone_number)
    .bind(&student.emergency_contact_address)
    .bind(student.date_joined)
    .bind(student.last_updated)
    .execute(&mut *conn)
    .await?;

    Ok(student)
}

pub async fn find_student_by_id(db: &SqlitePool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_student_by_student_id(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = ?"
    ))
    .bind(student_id)
    .fetch_optional(db)
    .await
}

pub async fn delete_student(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Admin list, optionally narrowed by a search on student ID or account name.
pub async fn fetch_students(
    db: &SqlitePool,
    search: Option<&str>,
) -> Result<Vec<StudentSummary>, sqlx::Error> {
    let pattern = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"));

    sqlx::query_as::<_, StudentSummary>(
        r#"
        SELECT
            s.id, s.student_id, u.first_name, u.last_name,
            s.category, s.current_year, s.department
        FROM students s
        JOIN users u ON u.id = s.user_id
        WHERE ?1 IS NULL
            OR s.student_id LIKE ?1
            OR u.first_name LIKE ?1
            OR u.last_name LIKE ?1
        ORDER BY s.student_id
        "#,
    )
    .bind(pattern)
    .fetch_all(db)
    .await
}

/// Students matching category and current year, narrowed to one department
/// when the filter names one. Juniors have no department, so a department
/// filter never matches them.
pub async fn fetch_cohort(db: &SqlitePool, filter: &CohortFilter) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        r#"
        SELECT {STUDENT_COLUMNS}
        FROM students
        WHERE category = ?1
            AND current_year = ?2
            AND (?3 IS NULL OR department = ?3)
        ORDER BY student_id
        "#
    ))
    .bind(filter.category)
    .bind(filter.year)
    .bind(filter.department)
    .fetch_all(db)
    .await
}

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, code, name, description, credits, level FROM courses ORDER BY code",
    )
    .fetch_all(db)
    .await
}

pub async fn insert_course(db: &SqlitePool, req: NewCourseRequest) -> Result<Course, sqlx::Error> {
    let course = Course {
        id: Uuid::new_v4().to_string(),
        code: req.code.trim().to_string(),
        name: req.name.trim().to_string(),
        description: req.description,
        credits: req.credits,
        level: req.level,
    };

    sqlx::query(
        r#"
        INSERT INTO courses (id, code, name, description, credits, level)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&course.id)
    .bind(&course.code)
    .bind(&course.name)
    .bind(&course.description)
    .bind(course.credits)
    .bind(course.level)
    .execute(db)
    .await?;

    Ok(course)
}

pub async fn find_course_by_id(db: &SqlitePool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, code, name, description, credits, level FROM courses WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find_course_by_code(db: &SqlitePool, code: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, code, name, description, credits, level FROM courses WHERE code = ?",
    )
    .bind(code.trim())
    .fetch_optional(db)
    .await
}

/// Get-or-create on (student, course). The UNIQUE constraint decides whether
/// a row is new; a concurrent insert of the same pair simply loses and the
/// existing row is returned untouched.
pub async fn get_or_create_enrollment(
    db: &SqlitePool,
    student_ref: &str,
    course_ref: &str,
) -> Result<(Enrollment, bool), sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let today = Utc::now().date_naive();

    let inserted = sqlx::query(
        r#"
        INSERT INTO enrollments (id, student_ref, course_ref, date_enrolled, completed)
        VALUES (?1, ?2, ?3, ?4, 0)
        ON CONFLICT(student_ref, course_ref) DO NOTHING
        "#,
    )
    .bind(&id)
    .bind(student_ref)
    .bind(course_ref)
    .bind(today)
    .execute(db)
    .await?
    .rows_affected();

    let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE student_ref = ?1 AND course_ref = ?2"
    ))
    .bind(student_ref)
    .bind(course_ref)
    .fetch_one(db)
    .await?;

    Ok((enrollment, inserted > 0))
}

pub async fn find_enrollment_by_id(db: &SqlitePool, id: &str) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn set_enrollment_completed(
    db: &SqlitePool,
    id: &str,
    completed: bool,
) -> Result<Option<Enrollment>, sqlx::Error> {
    let updated = sqlx::query("UPDATE enrollments SET completed = ?1 WHERE id = ?2")
        .bind(completed)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    if updated == 0 {
        return Ok(None);
    }

    find_enrollment_by_id(db, id).await
}

pub async fn fetch_enrollments_for_student(
    db: &SqlitePool,
    student_ref: &str,
) -> Result<Vec<EnrollmentView>, sqlx::Error> {
    sqlx::query_as::<_, EnrollmentView>(
        r#"
        SELECT
            e.id, e.course_ref, c.code AS course_code, c.name AS course_name,
            c.credits, e.date_enrolled, e.completed
        FROM enrollments e
        JOIN courses c ON c.id = e.course_ref
        WHERE e.student_ref = ?1
        ORDER BY e.date_enrolled DESC, c.code
        "#,
    )
    .bind(student_ref)
    .fetch_all(db)
    .await
}

pub async fn count_enrollments(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM enrollments")
        .fetch_one(db)
        .await
}
