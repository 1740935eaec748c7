use actix_web::{Scope, web};

pub fn routes() -> Scope {
    web::scope("/v1")
        .service(
            web::scope("/auth")
                .service(super::auth::login)
                .service(super::auth::logout)
                .service(super::auth::state),
        )
        .service(super::navigation::navigation)
        .service(
            web::scope("/reports")
                .service(super::report::dashboard)
                .service(super::report::ingested),
        )
        .service(super::master::routes())
        .service(
            web::scope("/tools/upload")
                .service(super::upload::state)
                .service(super::upload::upload)
                .service(super::upload::mappings)
                .service(super::upload::types)
                .service(super::upload::process)
                .service(super::upload::back)
                .service(super::upload::reset),
        )
        .service(
            web::scope("/system")
                .service(super::system::database)
                .service(super::system::clear_cache),
        )
}
