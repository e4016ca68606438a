use chrono::{NaiveDate, Utc};

use crate::db::Repository;
use crate::error::AppError;
use crate::models::{CompletionReport, ProjectStats, ReportScope, Task};

// Admin-only; the role check happens in the `AdminUser` extractor.

pub async fn completion(
    repo: &dyn Repository,
    scope: &ReportScope,
) -> Result<CompletionReport, AppError> {
    if let (Some(after), Some(before)) = (scope.due_after, scope.due_before) {
        if after > before {
            return Err(AppError::ValidationError(
                "due_after must not be later than due_before".into(),
            ));
        }
    }
    let counts = repo.count_tasks_by_status(scope).await?;
    Ok(CompletionReport::from_counts(counts))
}

/// Tasks past their due date (compared against `today`) that are not done.
pub async fn overdue_as_of(repo: &dyn Repository, today: NaiveDate) -> Result<Vec<Task>, AppError> {
    repo.overdue_tasks(today).await
}

pub async fn overdue(repo: &dyn Repository) -> Result<Vec<Task>, AppError> {
    overdue_as_of(repo, Utc::now().date_naive()).await
}

pub async fn project_stats(repo: &dyn Repository) -> Result<ProjectStats, AppError> {
    repo.project_stats().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRepository;

    #[actix_rt::test]
    async fn test_inverted_range_is_rejected() {
        let repo = MemoryRepository::new();
        let scope = ReportScope {
            due_after: NaiveDate::from_ymd_opt(2024, 2, 1),
            due_before: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert!(matches!(
            completion(&repo, &scope).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[actix_rt::test]
    async fn test_empty_store() {
        let repo = MemoryRepository::new();
        let report = completion(&repo, &ReportScope::default()).await.unwrap();
        assert_eq!(report.total_tasks, 0);
        assert_eq!(report.completion_rate, 0.0);
        assert!(overdue(&repo).await.unwrap().is_empty());
        assert_eq!(project_stats(&repo).await.unwrap(), ProjectStats::default());
    }
}
