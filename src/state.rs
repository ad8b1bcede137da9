use actix_web::web;
use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::routes;
use crate::services::AuthService;
use crate::store::{TaskRepository, UserRepository};

/// Everything the handlers need, built once and cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub auth: web::Data<AuthService>,
    pub tokens: web::Data<TokenService>,
    pub tasks: web::Data<dyn TaskRepository>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        hasher: PasswordHasher,
        tokens: TokenService,
    ) -> Self {
        Self {
            auth: web::Data::new(AuthService::new(users, hasher, tokens.clone())),
            tokens: web::Data::new(tokens),
            tasks: web::Data::from(tasks),
        }
    }

    /// Registers application data, every route and the not-found fallback.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.auth.clone())
            .app_data(self.tokens.clone())
            .app_data(self.tasks.clone())
            .app_data(routes::json_config())
            .service(routes::health::root)
            .service(routes::health::health)
            .service(web::scope("/api").configure(routes::config))
            .default_service(web::to(routes::not_found));
    }
}
