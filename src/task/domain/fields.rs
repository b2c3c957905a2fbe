//! Validated descriptive fields carried by a task.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trims `raw` and rejects it when it exceeds `max` characters.
fn bounded(raw: &str, field: &'static str, max: usize) -> Result<String, TaskDomainError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > max {
        return Err(TaskDomainError::FieldTooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Required task title of at most 200 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct TaskTitle(String);

impl TryFrom<String> for TaskTitle {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TaskTitle {
    /// Maximum title length in characters.
    pub const MAX_LEN: usize = 200;

    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the trimmed value is empty
    /// or [`TaskDomainError::FieldTooLong`] when it exceeds
    /// [`Self::MAX_LEN`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        let title = bounded(value.as_ref(), "title", Self::MAX_LEN)?;
        if title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        Ok(Self(title))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional free-form description of at most 1000 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct TaskDescription(String);

impl TryFrom<String> for TaskDescription {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TaskDescription {
    /// Maximum description length in characters.
    pub const MAX_LEN: usize = 1000;

    /// Creates a validated description.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::FieldTooLong`] when the trimmed value
    /// exceeds [`Self::MAX_LEN`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        bounded(value.as_ref(), "description", Self::MAX_LEN).map(Self)
    }

    /// Returns the description as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Optional category label of at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct TaskCategory(String);

impl TryFrom<String> for TaskCategory {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TaskCategory {
    /// Maximum category length in characters.
    pub const MAX_LEN: usize = 100;

    /// Creates a validated category.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::FieldTooLong`] when the trimmed value
    /// exceeds [`Self::MAX_LEN`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        bounded(value.as_ref(), "category", Self::MAX_LEN).map(Self)
    }

    /// Returns the category as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Optional assignee name of at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct TaskAssignee(String);

impl TryFrom<String> for TaskAssignee {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TaskAssignee {
    /// Maximum assignee length in characters.
    pub const MAX_LEN: usize = 100;

    /// Creates a validated assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::FieldTooLong`] when the trimmed value
    /// exceeds [`Self::MAX_LEN`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        bounded(value.as_ref(), "assignee", Self::MAX_LEN).map(Self)
    }

    /// Returns the assignee as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single tag of at most 50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct TaskTag(String);

impl TryFrom<String> for TaskTag {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TaskTag {
    /// Maximum tag length in characters.
    pub const MAX_LEN: usize = 50;

    /// Creates a validated tag.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTag`] for blank tags or
    /// [`TaskDomainError::FieldTooLong`] when the trimmed value exceeds
    /// [`Self::MAX_LEN`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        let tag = bounded(value.as_ref(), "tag", Self::MAX_LEN)?;
        if tag.is_empty() {
            return Err(TaskDomainError::EmptyTag);
        }
        Ok(Self(tag))
    }

    /// Validates every tag in order.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn parse_all<I, S>(values: I) -> Result<Vec<Self>, TaskDomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values.into_iter().map(Self::new).collect()
    }

    /// Returns the tag as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Descriptive fields of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDetails {
    /// Task title.
    pub title: TaskTitle,
    /// Optional description.
    pub description: Option<TaskDescription>,
    /// Optional category.
    pub category: Option<TaskCategory>,
    /// Optional assignee.
    pub assignee: Option<TaskAssignee>,
    /// Ordered tags.
    pub tags: Vec<TaskTag>,
}

impl TaskDetails {
    /// Creates details with only a title.
    #[must_use]
    pub const fn new(title: TaskTitle) -> Self {
        Self {
            title,
            description: None,
            category: None,
            assignee: None,
            tags: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: TaskDescription) -> Self {
        self.description = Some(description);
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee: TaskAssignee) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TaskTag>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }
}
