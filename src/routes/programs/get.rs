use super::*;

#[get("/programs")]
pub async fn get_programs_handler(
    pool: web::Data<SqlitePool>,
    query: web::Query<ProgramsQueryParams>,
) -> impl Responder {
    match db::fetch_programs_by_query(query, pool.into_inner()).await {
        Ok(records) => {
            log::info!("Got {} program records", records.len());
            HttpResponse::Ok().json(records)
        }
        Err(e) => {
            log::error!("Failed to retrieve program records: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_EXTERNAL",
                code: 5,
            })
        }
    }
}

#[get("/programs/{id}")]
pub async fn get_program_by_id_handler(
    pool: web::Data<SqlitePool>,
    path: web::Path<(i64,)>,
) -> impl Responder {
    let program_id = path.into_inner().0;

    match db::fetch_program(program_id, pool.into_inner()).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(sqlx::Error::RowNotFound) => {
            log::info!("Got nothing with program id {program_id} from database");
            HttpResponse::NotFound().json(ErrorResponseWithMessage {
                reason: "ERR_NOT_FOUND",
                code: 3,
                message: format!("Program {program_id} not found."),
            })
        }
        Err(e) => {
            log::error!("Failed to retrieve program record from database: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_EXTERNAL",
                code: 5,
            })
        }
    }
}
