use super::*;

#[post("/programs/{id}/comments")]
pub async fn post_comment_handler(
    pool: web::Data<SqlitePool>,
    path: web::Path<(i64,)>,
    body: web::Json<CommentSubmission>,
) -> impl Responder {
    let program_id = path.into_inner().0;

    match db::fetch_program(program_id, pool.clone().into_inner()).await {
        Ok(_) => {}
        Err(sqlx::Error::RowNotFound) => {
            return HttpResponse::NotFound().json(ErrorResponseWithMessage {
                reason: "ERR_NOT_FOUND",
                code: 3,
                message: format!("Program {program_id} not found."),
            });
        }
        Err(e) => {
            log::error!("Failed to look up program {program_id}: {e}");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_EXTERNAL",
                code: 5,
            });
        }
    }

    match db::create_comment(program_id, &body, pool.into_inner()).await {
        Ok(record) => {
            log::info!(
                "Author {} commented on program {program_id}",
                record.author_id
            );
            HttpResponse::Created().json(record)
        }
        Err(e) => {
            log::error!("Failed to insert comment for program {program_id}: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_EXTERNAL",
                code: 5,
            })
        }
    }
}

#[get("/programs/{id}/comments")]
pub async fn get_comments_handler(
    pool: web::Data<SqlitePool>,
    path: web::Path<(i64,)>,
) -> impl Responder {
    let program_id = path.into_inner().0;

    match db::fetch_program(program_id, pool.clone().into_inner()).await {
        Ok(_) => {}
        Err(sqlx::Error::RowNotFound) => {
            return HttpResponse::NotFound().json(ErrorResponseWithMessage {
                reason: "ERR_NOT_FOUND",
                code: 3,
                message: format!("Program {program_id} not found."),
            });
        }
        Err(e) => {
            log::error!("Failed to look up program {program_id}: {e}");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_EXTERNAL",
                code: 5,
            });
        }
    }

    match db::fetch_comments(program_id, pool.into_inner()).await {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => {
            log::error!("Failed to retrieve comments for program {program_id}: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_EXTERNAL",
                code: 5,
            })
        }
    }
}
