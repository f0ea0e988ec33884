use actix_web::web;

use crate::handlers::payroll;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payroll")
            .route(
                "/statement/{employee_id}",
                web::get().to(payroll::get_statement),
            )
            .route("/recalculate", web::post().to(payroll::recalculate)),
    );
}
