use actix_web::{App, HttpServer, web};

use catalogo_api::auth::JwtService;
use catalogo_api::db::establish_connection_pool;
use catalogo_api::models::config::ServerConfig;
use catalogo_api::repository::DieselRepository;
use catalogo_api::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::load().map_err(std::io::Error::other)?;

    let pool = establish_connection_pool(&config.database_url).map_err(std::io::Error::other)?;
    let repo = DieselRepository::new(pool);
    let jwt = JwtService::new(&config.jwt_secret, config.token_ttl_hours);

    let bind = (config.bind_address.clone(), config.port);
    log::info!("listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(jwt.clone()))
            .app_data(web::Data::new(config.clone()))
            .configure(routes::configure)
    })
    .bind(bind)?
    .run()
    .await
}
