use actix_web::web::{self, Data};
use actix_web::HttpResponse;
use tracing::info;

use crate::controller::workflow::CourseHoleInfo;
use crate::error::AppError;
use crate::model::{Caller, NewGolfClub, NewGolfCourse};
use crate::storage::Storage;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/clubs")
            .route("", web::get().to(list_clubs))
            .route("", web::post().to(create_club)),
    )
    .service(
        web::scope("/api/courses")
            .route("", web::get().to(list_courses))
            .route("", web::post().to(create_course))
            .route("/{id}", web::get().to(course_hole_info)),
    );
}

pub async fn list_clubs(
    _caller: Caller,
    storage: Data<dyn Storage>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(storage.list_clubs().await?))
}

pub async fn create_club(
    _caller: Caller,
    storage: Data<dyn Storage>,
    body: web::Json<NewGolfClub>,
) -> Result<HttpResponse, AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("Club name is required".to_string()));
    }
    let club = storage.add_club(&body).await?;
    info!(golf_club_id = club.golf_club_id, name = %club.name, "club created");
    Ok(HttpResponse::Created().json(club))
}

pub async fn list_courses(
    _caller: Caller,
    storage: Data<dyn Storage>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(storage.list_courses().await?))
}

pub async fn create_course(
    _caller: Caller,
    storage: Data<dyn Storage>,
    body: web::Json<NewGolfCourse>,
) -> Result<HttpResponse, AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("Course name is required".to_string()));
    }
    let known_club = storage
        .list_clubs()
        .await?
        .iter()
        .any(|c| c.golf_club_id == body.golf_club_id);
    if !known_club {
        return Err(AppError::NotFound(format!("club {}", body.golf_club_id)));
    }
    let mut numbers: Vec<i32> = body.holes.iter().map(|h| h.hole_number).collect();
    numbers.sort_unstable();
    numbers.dedup();
    if numbers.len() != body.holes.len() || numbers.first().is_some_and(|n| *n < 1) {
        return Err(AppError::BadRequest(
            "Hole numbers must be unique and start at 1 or above".to_string(),
        ));
    }
    let course = storage.add_course(&body).await?;
    info!(golf_course_id = course.golf_course_id, name = %course.name, "course created");
    Ok(HttpResponse::Created().json(course))
}

pub async fn course_hole_info(
    _caller: Caller,
    storage: Data<dyn Storage>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let course_id = path.into_inner();
    let course = storage
        .get_course(course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("course {course_id}")))?;
    let holes = storage.holes_for_course(course_id).await?;
    Ok(HttpResponse::Ok().json(CourseHoleInfo::new(&course, holes)))
}
