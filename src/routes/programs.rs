mod comments;
mod delete;
mod get;
mod grade;
mod post;
mod put;

pub use comments::{get_comments_handler, post_comment_handler};
pub use delete::delete_program_handler;
pub use get::{get_program_by_id_handler, get_programs_handler};
pub use grade::grade_program_handler;
pub use post::post_program_handler;
pub use put::put_program_handler;

use actix_web::{HttpResponse, Responder, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;

use super::{ErrorResponse, ErrorResponseWithMessage};
use crate::database as db;

/// Payload for creating or replacing a program
#[derive(Serialize, Deserialize, Debug)]
pub struct ProgramSubmission {
    pub title: String,
    pub description: Option<String>,
    pub source_code: String,
    pub difficulty: Option<String>,
    pub topic: Option<String>,
    pub author_id: i64,
}

#[derive(Serialize, Deserialize, Debug, sqlx::FromRow)]
pub struct ProgramRecord {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub source_code: String,
    pub difficulty: Option<String>,
    pub topic: Option<String>,
    pub grade: Option<i64>,
    pub status: String,
    pub author_id: i64,
    pub created_time: String,
    pub updated_time: String,
}

/// Payload for commenting on a program
#[derive(Serialize, Deserialize, Debug)]
pub struct CommentSubmission {
    pub author_id: i64,
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: i64,
    pub program_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_time: String,
}

#[derive(Deserialize)]
pub struct ProgramsQueryParams {
    pub author_id: Option<i64>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct GradeQueryParams {
    pub grade: i64,
}
