use actix_web::{HttpResponse, Responder, post, web};
use sqlx::sqlite::SqlitePool;

use super::{ErrorResponse, ErrorResponseWithMessage};
use crate::config::{ExecutionConfig, ToolchainConfig};
use crate::executor::{self, ExecutionError};

#[post("/programs/{id}/executions")]
pub async fn post_execution_handler(
    pool: web::Data<SqlitePool>,
    toolchain: web::Data<ToolchainConfig>,
    execution: web::Data<ExecutionConfig>,
    path: web::Path<(i64,)>,
) -> impl Responder {
    let program_id = path.into_inner().0;
    log::info!("Executing program {program_id}");

    let result =
        executor::execute_program(program_id, pool.into_inner(), &toolchain, &execution).await;

    match result {
        // Compile failures also land here, as a success:false body
        Ok(response) => HttpResponse::Ok().json(response),
        Err(ExecutionError::ProgramNotFound(id)) => {
            log::info!("Program {id} not found, nothing to execute");
            HttpResponse::NotFound().json(ErrorResponseWithMessage {
                reason: "ERR_NOT_FOUND",
                code: 3,
                message: format!("Program {id} not found."),
            })
        }
        Err(e @ ExecutionError::ToolchainUnavailable(_)) => {
            log::error!("Toolchain misconfiguration: {e}");
            HttpResponse::InternalServerError().json(ErrorResponseWithMessage {
                reason: "ERR_TOOLCHAIN",
                code: 7,
                message: e.to_string(),
            })
        }
        Err(e @ ExecutionError::Timeout { .. }) => {
            log::warn!("Program {program_id} timed out: {e}");
            HttpResponse::InternalServerError().json(ErrorResponseWithMessage {
                reason: "ERR_EXECUTION",
                code: 8,
                message: e.to_string(),
            })
        }
        Err(ExecutionError::Database(e)) => {
            log::error!("Database failure while executing program {program_id}: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_EXTERNAL",
                code: 5,
            })
        }
        Err(e) => {
            log::error!("Failed to execute program {program_id}: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            })
        }
    }
}
