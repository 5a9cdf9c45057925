use super::*;

#[delete("/programs/{id}")]
pub async fn delete_program_handler(
    pool: web::Data<SqlitePool>,
    path: web::Path<(i64,)>,
) -> impl Responder {
    let program_id = path.into_inner().0;

    match db::delete_program(program_id, pool.into_inner()).await {
        Ok(true) => {
            log::info!("Deleted program {program_id}");
            HttpResponse::NoContent().finish()
        }
        Ok(false) => HttpResponse::NotFound().json(ErrorResponseWithMessage {
            reason: "ERR_NOT_FOUND",
            code: 3,
            message: format!("Program {program_id} not found."),
        }),
        Err(e) => {
            log::error!("Failed to delete program {program_id}: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_EXTERNAL",
                code: 5,
            })
        }
    }
}
