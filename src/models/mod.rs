pub mod project;
pub mod report;
pub mod task;
pub mod user;

use serde::{Deserialize, Deserializer};
use validator::Validate;

pub use project::{Project, ProjectInput, ProjectUpdate};
pub use report::{CompletionReport, ProjectStats, ReportScope};
pub use task::{Task, TaskFilter, TaskInput, TaskPriority, TaskStatus, TaskUpdate};
pub use user::{NewUser, User, UserResponse, UserRole, UserUpdate};

/// Maps a present JSON value (including `null`) to `Some`, so that together with
/// `#[serde(default)]` an `Option<Option<T>>` tells "absent" apart from "cleared".
pub(crate) fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Offset/limit pagination shared by every listing endpoint.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct Pagination {
    #[serde(default)]
    #[validate(range(min = 0))]
    pub skip: i64,
    #[serde(default = "Pagination::default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
}

impl Pagination {
    fn default_limit() -> i64 {
        100
    }

    /// Applies the window to an already ordered sequence.
    pub fn window<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.skip as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::default_limit(),
        }
    }
}
