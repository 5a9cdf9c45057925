use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use actix_web::web;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};

use crate::routes::{
    CommentRecord, CommentSubmission, ProgramRecord, ProgramSubmission, ProgramsQueryParams,
};

const DATABASE_NAME: &str = "aula.sqlite3";

/// Status of a freshly created program
pub const STATUS_CREATED: &str = "Created";
/// Status once a professor has assigned a grade
pub const STATUS_GRADED: &str = "Graded";

pub fn get_db_path() -> PathBuf {
    use directories::ProjectDirs;

    let proj_dirs = ProjectDirs::from("", "", "aula").expect("Unable to find user directory");
    let data_dir = proj_dirs.data_local_dir();

    fs::create_dir_all(data_dir).expect("Failed to create local data dir");

    data_dir.join(DATABASE_NAME)
}

pub async fn init_db(db_path: impl AsRef<Path>) -> sqlx::Result<SqlitePool> {
    let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display()); // rwc = read/write/create
    let db_pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect(&db_url)
        .await?;

    // Execute PRAGMA statements first (these cannot be run inside a transaction)
    for pragma_sql in &[
        "PRAGMA foreign_keys = ON;",
        "PRAGMA busy_timeout = 2000;", // 2 seconds timeout for lock contention
        "PRAGMA journal_mode = WAL;",  // Write-Ahead Logging for better concurrency
        "PRAGMA synchronous = NORMAL;", // Balance between safety and performance
    ] {
        sqlx::query(pragma_sql).execute(&db_pool).await?;
    }

    let mut tx = db_pool.begin().await?;

    for sql in &[
        r"
        CREATE TABLE IF NOT EXISTS programs (
            id            INTEGER  PRIMARY KEY AUTOINCREMENT,
            title         TEXT     NOT NULL,
            description   TEXT,
            source_code   TEXT     NOT NULL,
            difficulty    TEXT,
            topic         TEXT,
            grade         INTEGER,
            status        TEXT     NOT NULL,
            author_id     INTEGER  NOT NULL,
            created_time  TEXT     NOT NULL,
            updated_time  TEXT     NOT NULL
        );",
        "CREATE INDEX IF NOT EXISTS idx_programs_author_id ON programs(author_id);",
        r"
        CREATE TABLE IF NOT EXISTS comments (
            id            INTEGER  PRIMARY KEY AUTOINCREMENT,
            program_id    INTEGER  NOT NULL,
            author_id     INTEGER  NOT NULL,
            content       TEXT     NOT NULL,
            created_time  TEXT     NOT NULL,
            FOREIGN KEY (program_id) REFERENCES programs (id)
        );",
        "CREATE INDEX IF NOT EXISTS idx_comments_program_id ON comments(program_id);",
    ] {
        sqlx::query(sql).execute(tx.as_mut()).await?;
    }

    tx.commit().await?;

    log::info!("Initialized database at {}", db_path.as_ref().display());

    Ok(db_pool)
}

pub fn remove_db(db_path: impl AsRef<Path>) {
    // Remove WAL and SHM files (ignore errors as they might not exist)
    let wal_path = format!("{}-wal", db_path.as_ref().display());
    let shm_path = format!("{}-shm", db_path.as_ref().display());
    let _ = fs::remove_file(wal_path);
    let _ = fs::remove_file(shm_path);

    if let Err(e) = std::fs::remove_file(&db_path) {
        log::warn!(
            "Unable to remove database at {}: {e}",
            db_path.as_ref().display()
        );
    } else {
        log::info!("Removed database at {}", db_path.as_ref().display());
    }
}

/// Inserts a new program and returns the stored record.
pub async fn create_program(
    submission: &ProgramSubmission,
    pool: Arc<SqlitePool>,
) -> sqlx::Result<ProgramRecord> {
    let now = crate::create_timestamp();

    let result = sqlx::query(
        r#"
        INSERT INTO programs (title, description, source_code, difficulty, topic, status, author_id, created_time, updated_time)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&submission.title)
    .bind(&submission.description)
    .bind(&submission.source_code)
    .bind(&submission.difficulty)
    .bind(&submission.topic)
    .bind(STATUS_CREATED)
    .bind(submission.author_id)
    .bind(&now)
    .bind(&now)
    .execute(pool.as_ref())
    .await?;

    fetch_program(result.last_insert_rowid(), pool).await
}

/// Fetches one program record; `RowNotFound` when the id does not exist.
pub async fn fetch_program(id: i64, pool: Arc<SqlitePool>) -> sqlx::Result<ProgramRecord> {
    sqlx::query_as::<_, ProgramRecord>("SELECT * FROM programs WHERE id = ?")
        .bind(id)
        .fetch_one(pool.as_ref())
        .await
}

pub async fn fetch_programs_by_query(
    query: web::Query<ProgramsQueryParams>,
    pool: Arc<SqlitePool>,
) -> sqlx::Result<Vec<ProgramRecord>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM programs WHERE 1=1");

    if let Some(author_id) = query.author_id {
        qb.push(" AND author_id = ").push_bind(author_id);
    }
    if let Some(ref topic) = query.topic {
        qb.push(" AND topic = ").push_bind(topic);
    }
    if let Some(ref difficulty) = query.difficulty {
        qb.push(" AND difficulty = ").push_bind(difficulty);
    }
    if let Some(ref status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY created_time, id");

    qb.build_query_as::<ProgramRecord>()
        .fetch_all(pool.as_ref())
        .await
}

/// Checks whether a program with the given title already exists.
pub async fn program_title_exists(title: &str, pool: Arc<SqlitePool>) -> sqlx::Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM programs WHERE title = ? LIMIT 1")
        .bind(title)
        .fetch_optional(pool.as_ref())
        .await?;
    Ok(row.is_some())
}

/// Replaces the mutable fields of a program; `RowNotFound` when absent.
pub async fn update_program(
    id: i64,
    submission: &ProgramSubmission,
    pool: Arc<SqlitePool>,
) -> sqlx::Result<ProgramRecord> {
    let now = crate::create_timestamp();

    let result = sqlx::query(
        r#"
        UPDATE programs
        SET title = ?, description = ?, source_code = ?, difficulty = ?, topic = ?, author_id = ?, updated_time = ?
        WHERE id = ?
        "#,
    )
    .bind(&submission.title)
    .bind(&submission.description)
    .bind(&submission.source_code)
    .bind(&submission.difficulty)
    .bind(&submission.topic)
    .bind(submission.author_id)
    .bind(&now)
    .bind(id)
    .execute(pool.as_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }

    fetch_program(id, pool).await
}

/// Assigns a grade and marks the program as graded; `RowNotFound` when absent.
pub async fn grade_program(
    id: i64,
    grade: i64,
    pool: Arc<SqlitePool>,
) -> sqlx::Result<ProgramRecord> {
    let now = crate::create_timestamp();

    let result =
        sqlx::query("UPDATE programs SET grade = ?, status = ?, updated_time = ? WHERE id = ?")
            .bind(grade)
            .bind(STATUS_GRADED)
            .bind(&now)
            .bind(id)
            .execute(pool.as_ref())
            .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }

    fetch_program(id, pool).await
}

/// Deletes a program and its comments. Returns false when the id is unknown.
pub async fn delete_program(id: i64, pool: Arc<SqlitePool>) -> sqlx::Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM comments WHERE program_id = ?")
        .bind(id)
        .execute(tx.as_mut())
        .await?;

    let result = sqlx::query("DELETE FROM programs WHERE id = ?")
        .bind(id)
        .execute(tx.as_mut())
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

/// Attaches a comment to a program and returns the stored record.
pub async fn create_comment(
    program_id: i64,
    submission: &CommentSubmission,
    pool: Arc<SqlitePool>,
) -> sqlx::Result<CommentRecord> {
    let now = crate::create_timestamp();

    let result = sqlx::query(
        "INSERT INTO comments (program_id, author_id, content, created_time) VALUES (?, ?, ?, ?)",
    )
    .bind(program_id)
    .bind(submission.author_id)
    .bind(&submission.content)
    .bind(&now)
    .execute(pool.as_ref())
    .await?;

    sqlx::query_as::<_, CommentRecord>("SELECT * FROM comments WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool.as_ref())
        .await
}

pub async fn fetch_comments(
    program_id: i64,
    pool: Arc<SqlitePool>,
) -> sqlx::Result<Vec<CommentRecord>> {
    sqlx::query_as::<_, CommentRecord>(
        "SELECT * FROM comments WHERE program_id = ? ORDER BY created_time, id",
    )
    .bind(program_id)
    .fetch_all(pool.as_ref())
    .await
}
