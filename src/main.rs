use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::info;

use chess_table::config::Args;
use chess_table::models::AppState;
use chess_table::routes::configure_routes;
use chess_table::websocket::GameServer;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();
    let (host, port) = args.bind_address();
    info!(
        "Starting chess table at http://{}:{} with a {} ms turn budget",
        host, port, args.turn_budget_ms
    );

    let app_state = web::Data::new(AppState {
        server: GameServer::spawn(args.table_config()),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(configure_routes)
    })
    .bind((host, port))?
    .run()
    .await
}
