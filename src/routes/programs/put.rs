use super::*;

#[put("/programs/{id}")]
pub async fn put_program_handler(
    pool: web::Data<SqlitePool>,
    path: web::Path<(i64,)>,
    body: web::Json<ProgramSubmission>,
) -> impl Responder {
    let program_id = path.into_inner().0;

    match db::update_program(program_id, &body, pool.into_inner()).await {
        Ok(record) => {
            log::info!("Updated program {program_id}");
            HttpResponse::Ok().json(record)
        }
        Err(sqlx::Error::RowNotFound) => HttpResponse::NotFound().json(ErrorResponseWithMessage {
            reason: "ERR_NOT_FOUND",
            code: 3,
            message: format!("Program {program_id} not found."),
        }),
        Err(e) => {
            log::error!("Failed to update program {program_id}: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_EXTERNAL",
                code: 5,
            })
        }
    }
}
