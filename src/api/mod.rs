use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::db::{news, repository};
use crate::error::{AppError, is_unique_violation};
use crate::models::*;
use crate::services::{EnrollmentService, StudentService};
use crate::state::AppState;
use crate::validation;

const HOME_NEWS_LIMIT: i64 = 4;
const DETAIL_NEWS_LIMIT: i64 = 4;
const DETAIL_ANNOUNCEMENT_LIMIT: i64 = 3;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/students", get(list_students).post(create_student))
        .route("/students/{id}", get(get_student))
        .route("/students/{id}/enrollments", get(student_enrollments))
        .route("/courses", get(list_courses).post(create_course))
        .route("/enrollments", post(register))
        .route("/enrollments/bulk", post(bulk_register))
        .route("/enrollments/{id}/completed", patch(set_completed))
        .route("/news", get(list_news).post(create_news))
        .route("/news/{id}", get(news_detail))
        .route("/announcements", get(list_announcements).post(create_announcement))
        .route("/announcements/{id}", get(announcement_detail))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<StudentQueryParams>,
) -> Result<Json<Vec<StudentSummary>>, AppError> {
    let students = repository::fetch_students(&state.db, params.q.as_deref()).await?;
    Ok(Json(students))
}

async fn create_student(
    State(state): State<AppState>,
    Json(req): Json<NewStudentRequest>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let student = StudentService::new(state.db.clone()).create_student(req).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::new(state.db.clone()).get_student(&id).await?;
    Ok(Json(student))
}

async fn student_enrollments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EnrollmentView>>, AppError> {
    let enrollments = EnrollmentService::new(state.db.clone())
        .enrollments_for_student(&id)
        .await?;
    Ok(Json(enrollments))
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = repository::fetch_courses(&state.db).await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    validation::validate_new_course(&req)?;
    let code = req.code.trim().to_string();
    let course = repository::insert_course(&state.db, req)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::Conflict(format!("course code {} already exists", code))
            } else {
                err.into()
            }
        })?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let (enrollment, created) = EnrollmentService::new(state.db.clone())
        .register(&req.student_ref, &req.course_ref)
        .await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(RegisterResponse { enrollment, created })))
}

async fn bulk_register(
    State(state): State<AppState>,
    Json(req): Json<BulkRegistrationRequest>,
) -> Result<Json<BulkRegistrationReport>, AppError> {
    let report = EnrollmentService::new(state.db.clone())
        .bulk_register(req)
        .await?;
    Ok(Json(report))
}

async fn set_completed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCompletionRequest>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = EnrollmentService::new(state.db.clone())
        .set_completed(&id, req.completed)
        .await?;
    Ok(Json(enrollment))
}

async fn list_news(State(state): State<AppState>) -> Result<Json<Vec<News>>, AppError> {
    let items = news::latest_news(&state.db, HOME_NEWS_LIMIT, None).await?;
    Ok(Json(items))
}

async fn create_news(
    State(state): State<AppState>,
    Json(req): Json<NewNewsRequest>,
) -> Result<(StatusCode, Json<News>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".to_string()));
    }
    let item = news::insert_news(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn news_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NewsDetail>, AppError> {
    let item = news::find_news(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let latest_news = news::latest_news(&state.db, DETAIL_NEWS_LIMIT, Some(id)).await?;
    let paragraphs = crate::models::news::paragraphs(&item.content);

    Ok(Json(NewsDetail {
        news: item,
        paragraphs,
        latest_news,
    }))
}

async fn list_announcements(
    State(state): State<AppState>,
) -> Result<Json<Vec<Announcement>>, AppError> {
    let items = news::latest_announcements(&state.db, HOME_NEWS_LIMIT).await?;
    Ok(Json(items))
}

async fn create_announcement(
    State(state): State<AppState>,
    Json(req): Json<NewAnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".to_string()));
    }
    let item = news::insert_announcement(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn announcement_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AnnouncementDetail>, AppError> {
    let announcement = news::find_announcement(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let latest_announcements =
        news::latest_announcements(&state.db, DETAIL_ANNOUNCEMENT_LIMIT).await?;
    let paragraphs = crate::models::news::paragraphs(&announcement.content);

    Ok(Json(AnnouncementDetail {
        announcement,
        paragraphs,
        latest_announcements,
    }))
}
