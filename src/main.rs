use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use dengue_watch_server::{app_state::AppState, config::Config, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        config.validate_for_production();
    }

    let bind_host = config.web_server_host.clone();
    let bind_port = config.web_server_port;

    let state = AppState::new(config)
        .await
        .expect("failed to initialize application state");

    log::info!("Starting HTTP server on {}:{}", bind_host, bind_port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .service(handlers::health_check)
            .service(handlers::health_check_ready)
            .service(handlers::health_check_live)
            .service(handlers::start_quiz)
            .service(handlers::submit_answer)
            .service(handlers::finish_quiz)
            .service(handlers::quiz_result)
            .service(handlers::user_attempts)
            .service(handlers::list_categories)
            .service(handlers::create_category)
            .service(handlers::create_question)
            .service(handlers::generate_certificate)
            .service(handlers::verify_certificate)
            .service(handlers::revoke_certificate)
            .service(handlers::download_certificate)
            .service(handlers::user_certificate)
    })
    .bind((bind_host, bind_port))?
    .run()
    .await
}
