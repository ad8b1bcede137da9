pub mod task;
pub mod user;

pub use task::{Task, TaskCreate, TaskListResponse, TaskUpdate};
pub use user::User;
