pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::{web, HttpResponse};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::signup)
            .service(auth::signin),
    )
    .service(
        web::scope("/users/{user_id}/tasks")
            .wrap(AuthMiddleware)
            .service(tasks::list_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}

/// Unreadable JSON bodies answer with the same envelope as failed field validation.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected request body: {}", err);
        AppError::ValidationError(err.to_string()).into()
    })
}

/// Fallback for paths no route matches.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Resource not found".into()))
}
