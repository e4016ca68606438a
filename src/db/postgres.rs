use async_trait::async_trait;
use chrono::NaiveDate;
use log::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::Repository;
use crate::error::AppError;
use crate::models::{
    NewUser, Pagination, Project, ProjectStats, ReportScope, Task, TaskFilter, TaskStatus, User,
};

const USER_COLUMNS: &str =
    "id, email, name, password_hash, role, is_active, created_at, updated_at";
const PROJECT_COLUMNS: &str =
    "id, name, description, start_date, end_date, owner_id, created_at, updated_at";
const TASK_COLUMNS: &str = "id, title, description, status, priority, due_date, owner_id, \
     assignee_id, project_id, created_at, updated_at";

/// Escapes `ILIKE` wildcards so user input only ever matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_due_range(
    qb: &mut QueryBuilder<'_, Postgres>,
    due_after: Option<NaiveDate>,
    due_before: Option<NaiveDate>,
) {
    if let Some(after) = due_after {
        qb.push(" AND due_date >= ").push_bind(after);
    }
    if let Some(before) = due_before {
        qb.push(" AND due_date <= ").push_bind(before);
    }
}

/// `Repository` backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the pool and applies pending migrations from `migrations/`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))?;
        info!("database migrations applied");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (email, name, password_hash, role) VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => AppError::Conflict("Email already registered".into()),
                other => other,
            })
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            "UPDATE users SET name = $1, email = $2, is_active = $3, updated_at = NOW() \
             WHERE id = $4 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.is_active)
            .bind(user.id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => AppError::Conflict("Email already registered".into()),
                AppError::NotFound(_) => AppError::NotFound("User not found".into()),
                other => other,
            })
    }

    async fn list_users(&self, page: Pagination) -> Result<Vec<User>, AppError> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn create_project(&self, project: &Project) -> Result<Project, AppError> {
        let sql = format!(
            "INSERT INTO projects (id, name, description, start_date, end_date, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            PROJECT_COLUMNS
        );
        let created = sqlx::query_as::<_, Project>(&sql)
            .bind(project.id)
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.start_date)
            .bind(project.end_date)
            .bind(project.owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    async fn list_projects(
        &self,
        owner_id: Option<i32>,
        page: Pagination,
    ) -> Result<Vec<Project>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM projects WHERE TRUE",
            PROJECT_COLUMNS
        ));
        if let Some(owner_id) = owner_id {
            qb.push(" AND owner_id = ").push_bind(owner_id);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.skip);

        let projects = qb
            .build_query_as::<Project>()
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    async fn update_project(&self, project: &Project) -> Result<Project, AppError> {
        let sql = format!(
            "UPDATE projects SET name = $1, description = $2, start_date = $3, end_date = $4, \
             updated_at = NOW() WHERE id = $5 RETURNING {}",
            PROJECT_COLUMNS
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.start_date)
            .bind(project.end_date)
            .bind(project.id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::NotFound(_) => AppError::NotFound("Project not found".into()),
                other => other,
            })
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, AppError> {
        // Child tasks go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_task(&self, task: &Task) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (id, title, description, status, priority, due_date, owner_id, \
             assignee_id, project_id) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            TASK_COLUMNS
        );
        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .bind(task.priority)
            .bind(task.due_date)
            .bind(task.owner_id)
            .bind(task.assignee_id)
            .bind(task.project_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        visible_to: Option<i32>,
        page: Pagination,
    ) -> Result<Vec<Task>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM tasks WHERE TRUE",
            TASK_COLUMNS
        ));

        if let Some(user_id) = visible_to {
            qb.push(" AND (owner_id = ")
                .push_bind(user_id)
                .push(" OR assignee_id = ")
                .push_bind(user_id)
                .push(" OR project_id IN (SELECT id FROM projects WHERE owner_id = ")
                .push_bind(user_id)
                .push("))");
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(priority) = filter.priority {
            qb.push(" AND priority = ").push_bind(priority);
        }
        if let Some(project_id) = filter.project_id {
            qb.push(" AND project_id = ").push_bind(project_id);
        }
        if let Some(assignee_id) = filter.assignee_id {
            qb.push(" AND assignee_id = ").push_bind(assignee_id);
        }
        push_due_range(&mut qb, filter.due_after, filter.due_before);
        if let Some(search) = &filter.search {
            let pattern = like_pattern(search);
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.skip);

        let tasks = qb.build_query_as::<Task>().fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn update_task(&self, task: &Task) -> Result<Task, AppError> {
        let sql = format!(
            "UPDATE tasks SET title = $1, description = $2, status = $3, priority = $4, \
             due_date = $5, assignee_id = $6, project_id = $7, updated_at = NOW() \
             WHERE id = $8 RETURNING {}",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .bind(task.priority)
            .bind(task.due_date)
            .bind(task.assignee_id)
            .bind(task.project_id)
            .bind(task.id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::NotFound(_) => AppError::NotFound("Task not found".into()),
                other => other,
            })
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_tasks_by_status(
        &self,
        scope: &ReportScope,
    ) -> Result<Vec<(TaskStatus, i64)>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT status, COUNT(*) FROM tasks WHERE TRUE");
        if let Some(project_id) = scope.project_id {
            qb.push(" AND project_id = ").push_bind(project_id);
        }
        push_due_range(&mut qb, scope.due_after, scope.due_before);
        qb.push(" GROUP BY status");

        let counts = qb
            .build_query_as::<(TaskStatus, i64)>()
            .fetch_all(&self.pool)
            .await?;
        Ok(counts)
    }

    async fn overdue_tasks(&self, today: NaiveDate) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE due_date < $1 AND status <> $2 \
             ORDER BY due_date ASC, created_at ASC",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(today)
            .bind(TaskStatus::Done)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn project_stats(&self) -> Result<ProjectStats, AppError> {
        let stats = sqlx::query_as::<_, ProjectStats>(
            "SELECT \
                COUNT(*) AS total_projects, \
                COUNT(*) FILTER (WHERE EXISTS ( \
                    SELECT 1 FROM tasks t WHERE t.project_id = p.id AND t.status <> 'done' \
                )) AS active_projects, \
                COUNT(*) FILTER (WHERE EXISTS ( \
                    SELECT 1 FROM tasks t WHERE t.project_id = p.id \
                ) AND NOT EXISTS ( \
                    SELECT 1 FROM tasks t WHERE t.project_id = p.id AND t.status <> 'done' \
                )) AS completed_projects, \
                COUNT(*) FILTER (WHERE EXISTS ( \
                    SELECT 1 FROM tasks t WHERE t.project_id = p.id \
                )) AS projects_with_tasks \
             FROM projects p",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("login"), "%login%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("snake_case"), "%snake\\_case%");
    }

    // Runs against a real database: DATABASE_URL=postgres://... cargo test -- --ignored
    #[ignore]
    #[actix_rt::test]
    async fn test_postgres_round_trip() {
        use crate::models::{ProjectInput, TaskInput, TaskPriority, UserRole};

        dotenv::dotenv().ok();
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let repo = PgRepository::connect(&url, 2).await.unwrap();
        let email = format!("pg-{}@example.com", Uuid::new_v4());

        let user = repo
            .create_user(NewUser {
                email: email.clone(),
                name: "Pg".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::User,
            })
            .await
            .unwrap();
        assert!(matches!(
            repo.create_user(NewUser {
                email: email.clone(),
                name: "Pg".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::User,
            })
            .await,
            Err(AppError::Conflict(_))
        ));

        let project = repo
            .create_project(&Project::new(
                ProjectInput {
                    name: "Pg project".to_string(),
                    description: None,
                    start_date: None,
                    end_date: None,
                },
                user.id,
            ))
            .await
            .unwrap();
        let task = repo
            .create_task(&Task::new(
                TaskInput {
                    title: "Pg task".to_string(),
                    description: Some("search me".to_string()),
                    status: TaskStatus::Pending,
                    priority: TaskPriority::High,
                    due_date: None,
                    assignee_id: None,
                    project_id: Some(project.id),
                },
                user.id,
            ))
            .await
            .unwrap();

        let filter = TaskFilter {
            search: Some("SEARCH".to_string()),
            ..Default::default()
        };
        let found = repo
            .list_tasks(&filter, Some(user.id), Pagination::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        assert!(repo.delete_project(project.id).await.unwrap());
        assert!(repo.find_task(task.id).await.unwrap().is_none());

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(repo.pool())
            .await
            .unwrap();
    }
}
