use actix_web::web;

pub mod adjustments;
pub mod payroll;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(payroll::configure)
            .configure(adjustments::configure),
    );
}
