use super::*;

#[post("/programs")]
pub async fn post_program_handler(
    pool: web::Data<SqlitePool>,
    body: web::Json<ProgramSubmission>,
) -> impl Responder {
    let title_taken = match db::program_title_exists(&body.title, pool.clone().into_inner()).await {
        Ok(taken) => taken,
        Err(e) => {
            log::error!("Failed to check program title: {e}");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_EXTERNAL",
                code: 5,
            });
        }
    };

    if title_taken {
        log::warn!("A program titled '{}' already exists", body.title);
        return HttpResponse::Conflict().json(ErrorResponseWithMessage {
            reason: "ERR_ALREADY_EXISTS",
            code: 4,
            message: format!("A program titled '{}' already exists.", body.title),
        });
    }

    match db::create_program(&body, pool.into_inner()).await {
        Ok(record) => {
            log::info!("Created program {} by author {}", record.id, record.author_id);
            HttpResponse::Created().json(record)
        }
        Err(e) => {
            log::error!("Failed to insert program into database: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_EXTERNAL",
                code: 5,
            })
        }
    }
}
