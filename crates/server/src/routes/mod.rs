pub mod process;
pub mod system;

use actix_web::web;

/// Register all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/process")
            .route(web::post().to(process::process))
            .default_service(web::to(process::invalid_method)),
    )
    .service(system::home)
    .service(system::health);
}
