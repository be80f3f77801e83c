use crate::models::{Todo, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use std::sync::Mutex;

/// TodoRepository Trait
///
/// Defines the abstract contract for all persistence operations. Handlers talk
/// to this trait only, so the Postgres implementation can be swapped for the
/// in-memory one in tests.
///
/// Every method returns `Result` with the raw `sqlx::Error`; the handler layer
/// decides how a persistence failure maps onto the HTTP surface (always a
/// logged, generic 500).
#[async_trait]
pub trait TodoRepository: Send + Sync {
    // --- Todo Item Access ---
    async fn get_todo(&self, id: &str) -> Result<Option<Todo>, sqlx::Error>;
    // Persists the new completion flag; None when the id does not exist.
    async fn set_todo_completed(
        &self,
        id: &str,
        completed: bool,
    ) -> Result<Option<Todo>, sqlx::Error>;
    // True when a row was actually deleted.
    async fn delete_todo(&self, id: &str) -> Result<bool, sqlx::Error>;

    // --- Admin Listing ---
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    // One page of a user's todos, newest first.
    async fn get_todo_page(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Todo>, sqlx::Error>;
    // Total number of todos belonging to the user with this email.
    async fn count_todos_by_email(&self, email: &str) -> Result<i64, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn TodoRepository>;

/// PostgresRepository
///
/// The concrete implementation of the `TodoRepository` trait, backed by the
/// PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepository for PostgresRepository {
    async fn get_todo(&self, id: &str) -> Result<Option<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            "SELECT id, user_id, completed, created_at FROM todos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// set_todo_completed
    ///
    /// Updates the completion flag and returns the updated row in one round trip.
    async fn set_todo_completed(
        &self,
        id: &str,
        completed: bool,
    ) -> Result<Option<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            "UPDATE todos SET completed = $2 WHERE id = $1 \
             RETURNING id, user_id, completed, created_at",
        )
        .bind(id)
        .bind(completed)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_todo(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, email, role FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    /// get_todo_page
    ///
    /// Newest-first page of a user's todos. The caller computes the offset from
    /// the 1-based page number.
    async fn get_todo_page(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            "SELECT id, user_id, completed, created_at FROM todos \
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_todos_by_email(&self, email: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM todos t JOIN users u ON t.user_id = u.id \
             WHERE u.email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
    }
}

/// MemoryRepository
///
/// In-memory implementation of `TodoRepository` used for unit and integration
/// testing. Seeded with users and todos up front; todos are mutable behind a
/// mutex so tests can observe mutations. The `should_fail` switch simulates a
/// persistence outage for exercising the generic 500 path.
#[derive(Default)]
pub struct MemoryRepository {
    users: Vec<User>,
    todos: Mutex<Vec<Todo>>,
    pub should_fail: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_todo(self, todo: Todo) -> Self {
        self.todos.lock().unwrap().push(todo);
        self
    }

    /// Snapshot of the stored todos, for post-hoc assertions.
    pub fn todos_snapshot(&self) -> Vec<Todo> {
        self.todos.lock().unwrap().clone()
    }

    fn check_available(&self) -> Result<(), sqlx::Error> {
        if self.should_fail {
            // Close enough to a real pool failure for the handlers' purposes.
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TodoRepository for MemoryRepository {
    async fn get_todo(&self, id: &str) -> Result<Option<Todo>, sqlx::Error> {
        self.check_available()?;
        Ok(self
            .todos
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn set_todo_completed(
        &self,
        id: &str,
        completed: bool,
    ) -> Result<Option<Todo>, sqlx::Error> {
        self.check_available()?;
        let mut todos = self.todos.lock().unwrap();
        Ok(todos.iter_mut().find(|t| t.id == id).map(|todo| {
            todo.completed = completed;
            todo.clone()
        }))
    }

    async fn delete_todo(&self, id: &str) -> Result<bool, sqlx::Error> {
        self.check_available()?;
        let mut todos = self.todos.lock().unwrap();
        let before = todos.len();
        todos.retain(|t| t.id != id);
        Ok(todos.len() < before)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.check_available()?;
        Ok(self.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_todo_page(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Todo>, sqlx::Error> {
        self.check_available()?;
        let mut todos: Vec<Todo> = self
            .todos
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_todos_by_email(&self, email: &str) -> Result<i64, sqlx::Error> {
        self.check_available()?;
        let Some(user) = self.users.iter().find(|u| u.email == email) else {
            return Ok(0);
        };
        Ok(self
            .todos
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user.id)
            .count() as i64)
    }
}
