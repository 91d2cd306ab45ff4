/// Raw task input and its validation
///
/// Front ends hand over what the client sent as strings; validation turns
/// it into the typed [`CreateTask`] / [`UpdateTask`] records. Every field is
/// checked before anything is returned, so a rejected input never leaves a
/// half-applied change behind.
///
/// Category ids are only parsed here. Whether the category belongs to the
/// caller is checked by the service against the store.

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use super::due_date::parse_optional_due_date;
use crate::error::TaskError;
use crate::models::{CreateTask, Priority, TaskStatus, UpdateTask};

pub const TITLE_REQUIRED: &str = "Title is required";

/// Maximum title length, matching the column size
pub const TITLE_MAX_LEN: usize = 200;

/// How an unrecognized priority is treated
///
/// The JSON API is strict and rejects the request. The HTML forms are
/// lenient: on creation the priority falls back to `medium`, on edit the
/// current priority is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityPolicy {
    Strict,
    Lenient,
}

/// Fields accepted when creating a task
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub category_id: Option<String>,
}

/// Fields accepted when updating a task
///
/// A field missing from the payload is left untouched. For nullable fields
/// an explicit `null` (or an empty string) clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub priority: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub category_id: Option<Option<String>>,
}

/// Marks a field as present even when its value is `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl TaskInput {
    /// Validates creation input for `user_id`
    ///
    /// # Errors
    ///
    /// - missing or blank title
    /// - title longer than [`TITLE_MAX_LEN`]
    /// - unknown priority under [`PriorityPolicy::Strict`]
    /// - malformed due date
    pub fn validate(self, user_id: Uuid, policy: PriorityPolicy) -> Result<CreateTask, TaskError> {
        let title = validate_title(self.title.as_deref().unwrap_or_default())?;

        let priority = match self.priority.as_deref() {
            None => Priority::default(),
            Some(raw) => match (raw.parse::<Priority>(), policy) {
                (Ok(priority), _) => priority,
                (Err(_), PriorityPolicy::Lenient) => Priority::default(),
                (Err(err), PriorityPolicy::Strict) => return Err(err.into()),
            },
        };

        let due_date = parse_optional_due_date(self.due_date.as_deref())?;

        Ok(CreateTask {
            user_id,
            title,
            description: normalize_text(self.description),
            priority,
            due_date,
            category_id: parse_category_ref(self.category_id.as_deref()),
        })
    }
}

impl TaskPatch {
    /// Validates every present field into one update
    ///
    /// # Errors
    ///
    /// - blank or overlong title
    /// - unknown status (always)
    /// - unknown priority under [`PriorityPolicy::Strict`]
    /// - malformed due date
    pub fn validate(self, policy: PriorityPolicy) -> Result<UpdateTask, TaskError> {
        let title = self.title.as_deref().map(validate_title).transpose()?;

        let priority = match self.priority.as_deref() {
            None => None,
            Some(raw) => match (raw.parse::<Priority>(), policy) {
                (Ok(priority), _) => Some(priority),
                (Err(_), PriorityPolicy::Lenient) => None,
                (Err(err), PriorityPolicy::Strict) => return Err(err.into()),
            },
        };

        let status = self
            .status
            .as_deref()
            .map(str::parse::<TaskStatus>)
            .transpose()?;

        let due_date = match self.due_date {
            None => None,
            Some(raw) => Some(parse_optional_due_date(raw.as_deref())?),
        };

        Ok(UpdateTask {
            title,
            description: self.description.map(normalize_text),
            priority,
            status,
            due_date,
            category_id: self
                .category_id
                .map(|raw| parse_category_ref(raw.as_deref())),
        })
    }
}

fn validate_title(raw: &str) -> Result<String, TaskError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TaskError::validation(TITLE_REQUIRED));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(TaskError::validation(format!(
            "Title must be at most {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

/// Blank text is stored as no text
fn normalize_text(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// An unparseable category reference is treated like an unknown one
fn parse_category_ref(raw: Option<&str>) -> Option<Uuid> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| Uuid::parse_str(s).ok())
}
