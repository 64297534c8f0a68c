//! Editable task fields.

use super::{TaskDomainError, TaskPriority};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Validated descriptive fields of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskContent {
    title: String,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    priority: TaskPriority,
}

impl TaskContent {
    /// Longest title accepted by storage.
    pub const MAX_TITLE_LENGTH: usize = 100;
    /// Longest description accepted by storage.
    pub const MAX_DESCRIPTION_LENGTH: usize = 255;

    /// Creates validated task content.
    ///
    /// A blank description is stored as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the title is blank or either text
    /// exceeds its limit.
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        due_date: Option<NaiveDate>,
        priority: TaskPriority,
    ) -> Result<Self, TaskDomainError> {
        let raw_title = title.into();
        let trimmed_title = raw_title.trim();
        if trimmed_title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let title_length = trimmed_title.chars().count();
        if title_length > Self::MAX_TITLE_LENGTH {
            return Err(TaskDomainError::TitleTooLong {
                max: Self::MAX_TITLE_LENGTH,
                actual: title_length,
            });
        }

        let trimmed_description = description
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        if let Some(text) = &trimmed_description {
            let length = text.chars().count();
            if length > Self::MAX_DESCRIPTION_LENGTH {
                return Err(TaskDomainError::DescriptionTooLong {
                    max: Self::MAX_DESCRIPTION_LENGTH,
                    actual: length,
                });
            }
        }

        Ok(Self {
            title: trimmed_title.to_owned(),
            description: trimmed_description,
            due_date,
            priority,
        })
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }
}
