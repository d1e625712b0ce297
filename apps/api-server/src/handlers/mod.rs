//! HTTP handlers and route configuration.

mod blogs;
mod health;
mod pages;
mod payload;
mod users;

use actix_web::{HttpResponse, web};

use crate::middleware::auth::{OptionalIdentity, RestrictTo};
use crate::middleware::error::PageResult;
use crate::state::AppState;
use crate::views;

pub use payload::{json_config, multipart_config};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(pages::home))
        .route("/health", web::get().to(health::health_check))
        .route("/about-us", web::get().to(pages::about))
        .service(
            web::resource("/contact")
                .route(web::get().to(pages::contact_page))
                .route(web::post().to(pages::contact)),
        )
        .route("/subscribe", web::post().to(pages::subscribe))
        .service(
            web::scope("/user")
                .service(
                    web::resource("/signup")
                        .route(web::get().to(users::signup_page).wrap(RestrictTo::guests()))
                        .route(web::post().to(users::signup)),
                )
                .service(
                    web::resource("/login")
                        .route(web::get().to(users::login_page).wrap(RestrictTo::guests()))
                        .route(web::post().to(users::login)),
                )
                .route("/get-started", web::get().to(users::get_started))
                .service(
                    web::resource("/logout")
                        .wrap(RestrictTo::members())
                        .route(web::get().to(users::logout)),
                )
                .service(
                    web::resource("/profile")
                        .wrap(RestrictTo::members())
                        .route(web::get().to(users::profile)),
                ),
        )
        .service(
            web::scope("/blog")
                .route("/all", web::get().to(blogs::all))
                .service(
                    web::resource("/add-blog")
                        .wrap(RestrictTo::members())
                        .route(web::get().to(blogs::add_page))
                        .route(web::post().to(blogs::create)),
                )
                .service(
                    web::resource("/edit/{id}")
                        .wrap(RestrictTo::members())
                        .route(web::get().to(blogs::edit_page))
                        .route(web::post().to(blogs::update)),
                )
                .service(
                    web::resource("/delete/{id}")
                        .wrap(RestrictTo::members())
                        .route(web::get().to(blogs::delete)),
                )
                .service(
                    web::resource("/comment/{blog_id}")
                        .wrap(RestrictTo::members())
                        .route(web::post().to(blogs::comment)),
                )
                .service(
                    web::resource("/comment/delete/{comment_id}/{blog_id}")
                        .wrap(RestrictTo::members())
                        .route(web::get().to(blogs::delete_comment)),
                )
                .service(
                    web::resource("/like/{blog_id}")
                        .wrap(RestrictTo::members())
                        .route(web::get().to(blogs::like)),
                )
                // Catch-all slug route goes last.
                .route("/{slug}", web::get().to(blogs::show)),
        )
        .default_service(web::to(not_found));
}

async fn not_found(state: web::Data<AppState>, identity: OptionalIdentity) -> PageResult<HttpResponse> {
    views::not_found_page(&state, identity.0.as_ref())
}

#[cfg(test)]
mod tests;
