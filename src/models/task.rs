use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Input structure for creating a task.
///
/// The owner is never part of the payload; it always comes from the authenticated identity.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskCreate {
    /// The title of the task.
    /// Must be between 1 and 500 characters.
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    /// An optional description for the task.
    /// Maximum length of 5000 characters if provided.
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

/// Partial update of a task. Absent fields are left untouched.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    pub completed: Option<bool>,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// Identifier of the user who owns the task.
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of the task listing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub count: usize,
}

impl Task {
    /// Creates a new, incomplete `Task` owned by `user_id`.
    pub fn new(input: TaskCreate, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: input.title,
            description: input.description,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields present in `changes` and refreshes `updated_at`.
    pub fn apply(&mut self, changes: &TaskUpdate) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(description) = &changes.description {
            self.description = Some(description.clone());
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        self.updated_at = Utc::now();
    }
}

impl From<Vec<Task>> for TaskListResponse {
    fn from(tasks: Vec<Task>) -> Self {
        Self {
            count: tasks.len(),
            tasks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(title: &str, description: Option<&str>) -> TaskCreate {
        TaskCreate {
            title: title.to_string(),
            description: description.map(String::from),
        }
    }

    #[test]
    fn test_task_creation() {
        let owner = Uuid::new_v4();
        let task = Task::new(sample("Test Task", Some("Test Description")), owner);

        assert_eq!(task.title, "Test Task");
        assert_eq!(task.user_id, owner);
        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_task_create_validation() {
        assert!(sample("Valid Task", Some("Valid Description")).validate().is_ok());
        assert!(sample("", None).validate().is_err());
        assert!(sample(&"a".repeat(500), None).validate().is_ok());
        assert!(sample(&"a".repeat(501), None).validate().is_err());
        assert!(sample("Valid", Some(&"b".repeat(5000))).validate().is_ok());
        assert!(sample("Valid", Some(&"b".repeat(5001))).validate().is_err());
    }

    #[test]
    fn test_title_length_counts_characters() {
        // 500 multi-byte characters are still a valid title.
        assert!(sample(&"é".repeat(500), None).validate().is_ok());
    }

    #[test]
    fn test_task_update_validation() {
        assert!(TaskUpdate::default().validate().is_ok());

        let empty_title = TaskUpdate {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(empty_title.validate().is_err());
    }

    #[test]
    fn test_partial_update_only_touches_present_fields() {
        let mut task = Task::new(sample("Keep me", Some("And me")), Uuid::new_v4());
        let before = task.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(2));

        task.apply(&TaskUpdate {
            completed: Some(true),
            ..Default::default()
        });

        assert!(task.completed);
        assert_eq!(task.title, "Keep me");
        assert_eq!(task.description.as_deref(), Some("And me"));
        assert!(task.updated_at > before);
    }

    #[test]
    fn test_update_payload_distinguishes_absent_fields() {
        let changes: TaskUpdate = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert!(changes.title.is_none());
        assert!(changes.description.is_none());
        assert_eq!(changes.completed, Some(true));
    }

    #[test]
    fn test_list_response_counts_tasks() {
        let owner = Uuid::new_v4();
        let response = TaskListResponse::from(vec![
            Task::new(sample("One", None), owner),
            Task::new(sample("Two", None), owner),
        ]);
        assert_eq!(response.count, 2);
    }
}
