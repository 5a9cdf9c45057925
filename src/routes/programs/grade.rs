use super::*;

#[patch("/programs/{id}/grades")]
pub async fn grade_program_handler(
    pool: web::Data<SqlitePool>,
    path: web::Path<(i64,)>,
    query: web::Query<GradeQueryParams>,
) -> impl Responder {
    let program_id = path.into_inner().0;
    let grade = query.grade;

    // Grades run from 0 to 5, the scale the platform inherited
    if !(0..=5).contains(&grade) {
        return HttpResponse::BadRequest().json(ErrorResponseWithMessage {
            reason: "ERR_INVALID_ARGUMENT",
            code: 1,
            message: format!("Grade {grade} is out of the 0..=5 range."),
        });
    }

    match db::grade_program(program_id, grade, pool.into_inner()).await {
        Ok(record) => {
            log::info!("Graded program {program_id} with {grade}");
            HttpResponse::Ok().json(record)
        }
        Err(sqlx::Error::RowNotFound) => HttpResponse::NotFound().json(ErrorResponseWithMessage {
            reason: "ERR_NOT_FOUND",
            code: 3,
            message: format!("Program {program_id} not found."),
        }),
        Err(e) => {
            log::error!("Failed to grade program {program_id}: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_EXTERNAL",
                code: 5,
            })
        }
    }
}
