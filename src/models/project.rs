use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::deserialize_present;

/// A project groups tasks and belongs to exactly one owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /projects`.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_project_input"))]
pub struct ProjectInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Payload for `PUT /projects/{id}`. Absent fields stay untouched, explicit
/// `null` clears the nullable ones.
#[derive(Debug, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_project_update"))]
pub struct ProjectUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub end_date: Option<Option<NaiveDate>>,
}

fn check_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => {
            let mut err = ValidationError::new("date_order");
            err.message = Some("start_date must not be after end_date".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

fn validate_project_input(input: &ProjectInput) -> Result<(), ValidationError> {
    check_date_order(input.start_date, input.end_date)
}

fn validate_project_update(update: &ProjectUpdate) -> Result<(), ValidationError> {
    if let Some(Some(description)) = &update.description {
        if description.chars().count() > 1000 {
            return Err(ValidationError::new("description_too_long"));
        }
    }
    check_date_order(update.start_date.flatten(), update.end_date.flatten())
}

impl Project {
    pub fn new(input: ProjectInput, owner_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            start_date: input.start_date,
            end_date: input.end_date,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update and fails if the resulting date range is inverted.
    pub fn apply(&mut self, update: ProjectUpdate) -> Result<(), ValidationError> {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(start_date) = update.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            self.end_date = end_date;
        }
        check_date_order(self.start_date, self.end_date)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}
