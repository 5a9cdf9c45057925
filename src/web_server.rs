use actix_web::{App, HttpServer, dev::Server, middleware, web};
use sqlx::sqlite::SqlitePool;

use crate::config::Config;
use crate::routes::{
    delete_program_handler, get_comments_handler, get_program_by_id_handler, get_programs_handler,
    grade_program_handler, json_error_handler, post_comment_handler, post_execution_handler,
    post_program_handler, put_program_handler, query_error_handler,
};

pub fn build_server(config: Config, db_pool: SqlitePool) -> std::io::Result<Server> {
    let Config {
        server: server_config,
        execution,
        toolchain,
    } = config;
    let db_pool = web::Data::new(db_pool);
    let execution = web::Data::new(execution);
    let toolchain = web::Data::new(toolchain);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(db_pool.clone())
            .app_data(execution.clone())
            .app_data(toolchain.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .wrap(middleware::Logger::default())
            .service(
                web::scope("/api/v1")
                    .service(post_program_handler)
                    .service(get_programs_handler)
                    .service(get_program_by_id_handler)
                    .service(put_program_handler)
                    .service(delete_program_handler)
                    .service(grade_program_handler)
                    .service(post_comment_handler)
                    .service(get_comments_handler)
                    .service(post_execution_handler),
            )
    })
    .bind((
        server_config
            .bind_address
            .unwrap_or("127.0.0.1".to_string()),
        server_config.bind_port.unwrap_or(8080),
    ))?
    .run();

    Ok(server)
}
