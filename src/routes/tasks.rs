use crate::{
    auth::{authorize_ownership, AuthenticatedUser},
    error::AppError,
    models::{Task, TaskCreate, TaskListResponse, TaskUpdate},
    store::TaskRepository,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

const TASK_NOT_FOUND: &str = "Task not found";

fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| {
        AppError::ValidationError("Invalid task_id format - must be valid UUID".into())
    })
}

/// Retrieves every task owned by the user in the path.
///
/// Tasks are ordered by creation date in descending order.
///
/// ## Responses:
/// - `200 OK`: `{"tasks": [...], "count": n}`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `403 Forbidden`: If `{user_id}` is not the authenticated user.
#[get("")]
pub async fn list_tasks(
    repo: web::Data<dyn TaskRepository>,
    path: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let owner = authorize_ownership(&path, user.0)?;

    let tasks = repo.list_for_owner(owner).await?;

    Ok(HttpResponse::Ok().json(TaskListResponse::from(tasks)))
}

/// Creates a new task for the authenticated user.
///
/// The owner is taken from the token, never from the body.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created `Task` object as JSON.
/// - `401 Unauthorized`, `403 Forbidden`: as for listing.
/// - `422 Unprocessable Entity`: If the title or description is out of bounds.
#[post("")]
pub async fn create_task(
    repo: web::Data<dyn TaskRepository>,
    path: web::Path<String>,
    task_data: web::Json<TaskCreate>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let owner = authorize_ownership(&path, user.0)?;
    task_data.validate()?;

    let task = repo.insert(&Task::new(task_data.into_inner(), owner)).await?;
    log::info!("User {} created task {}", owner, task.id);

    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a single task.
///
/// A task that belongs to someone else is reported exactly like a missing one.
///
/// ## Responses:
/// - `200 OK`: Returns the `Task` object as JSON.
/// - `404 Not Found`: If no task with this id is owned by the user.
/// - `422 Unprocessable Entity`: If `{task_id}` is not a UUID.
#[get("/{task_id}")]
pub async fn get_task(
    repo: web::Data<dyn TaskRepository>,
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let (user_id, task_id) = path.into_inner();
    let owner = authorize_ownership(&user_id, user.0)?;
    let task_id = parse_task_id(&task_id)?;

    let task = repo
        .find_by_id_and_owner(task_id, owner)
        .await?
        .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task.
///
/// Only the fields present in the body change; `updated_at` is always refreshed.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Task` object as JSON.
/// - `404 Not Found`: If no task with this id is owned by the user.
/// - `422 Unprocessable Entity`: If `{task_id}` is not a UUID or a field is out of bounds.
#[put("/{task_id}")]
pub async fn update_task(
    repo: web::Data<dyn TaskRepository>,
    path: web::Path<(String, String)>,
    task_data: web::Json<TaskUpdate>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let (user_id, task_id) = path.into_inner();
    let owner = authorize_ownership(&user_id, user.0)?;
    let task_id = parse_task_id(&task_id)?;
    task_data.validate()?;

    let task = repo
        .update(task_id, owner, &task_data)
        .await?
        .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task.
///
/// ## Responses:
/// - `204 No Content`: The task was removed.
/// - `404 Not Found`: If no task with this id is owned by the user, including one
///   that was already deleted.
#[delete("/{task_id}")]
pub async fn delete_task(
    repo: web::Data<dyn TaskRepository>,
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let (user_id, task_id) = path.into_inner();
    let owner = authorize_ownership(&user_id, user.0)?;
    let task_id = parse_task_id(&task_id)?;

    if !repo.delete(task_id, owner).await? {
        return Err(AppError::NotFound(TASK_NOT_FOUND.into()));
    }
    log::info!("User {} deleted task {}", owner, task_id);

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_task_id(&id.to_string()).unwrap(), id);

        let err = parse_task_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref msg) if msg.contains("task_id")));
    }
}
