// src/main.rs

mod app_state;
mod config;
mod db;
mod response;
mod sanity_checks;
mod task;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use env_logger::Env;
use log::error;
use serde_json::json;

use crate::app_state::AppState;
use crate::task::{
    add_task_in_folder, change_task_status, create_task, edit_task, get_all_tasks,
    get_folder_associated_tasks, remove_task_from_folder,
};

/// GET /health: liveness probe that also pings the database.
async fn health(data: web::Data<AppState>) -> impl Responder {
    match data.mongodb.ping().await {
        Ok(_) => HttpResponse::Ok().json(json!({ "status": 200, "message": "OK" })),
        Err(e) => {
            error!("Health check failed to reach the database: {}", e);
            HttpResponse::InternalServerError()
                .json(json!({ "status": 500, "message": "Database unreachable" }))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = config::Config::from_env();
    let mongodb = Arc::new(db::MongoDB::init(&config.mongo_uri, &config.database_name).await);

    let frontend_origin = config.frontend_origin.clone();
    let bind_addr = config.bind_addr.clone();

    println!("Server running at http://{}", bind_addr);
    println!("Allowed CORS Origin: {}", frontend_origin);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![http::header::CONTENT_TYPE, http::header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(AppState {
                mongodb: mongodb.clone(),
                config: config.clone(),
            }))
            .route("/health", web::get().to(health))
            // TASKS
            .service(
                web::scope("/tasks")
                    .route("", web::post().to(create_task))
                    .route("", web::get().to(get_all_tasks))
                    .route("", web::put().to(edit_task))
                    .route("/status", web::patch().to(change_task_status))
                    .route("/folder", web::get().to(get_folder_associated_tasks))
                    .route("/folder", web::post().to(add_task_in_folder))
                    .route("/folder", web::delete().to(remove_task_from_folder)),
            )
    })
    .bind(&bind_addr)?
    .run()
    .await
}
