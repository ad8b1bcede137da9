#![doc = "The `taskledger` library crate."]
#![doc = ""]
#![doc = "Authentication (password hashing, bearer tokens, ownership checks), the task and user"]
#![doc = "stores, and the HTTP routes of the TaskLedger service. The binary (`main.rs`) only"]
#![doc = "loads configuration, opens the database and starts the server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::AppState;
