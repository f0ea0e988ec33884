use actix_web::web;

use crate::handlers::adjustments;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/adjustments")
            .route("", web::get().to(adjustments::list_adjustments))
            .route("", web::post().to(adjustments::create_adjustment))
            .route(
                "/unapplied",
                web::get().to(adjustments::list_unapplied_adjustments),
            )
            .route("/{id}", web::put().to(adjustments::update_adjustment))
            .route("/{id}", web::delete().to(adjustments::delete_adjustment)),
    );
}
