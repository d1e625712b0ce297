//! Session resolution and role-based route guards.
//!
//! [`CheckAuthentication`] runs on every request: a valid `uid` cookie puts an
//! [`Identity`] into the request extensions, anything else leaves the caller a
//! guest. [`RestrictTo`] then guards individual routes.

use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
};
use serde::Serialize;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

use blogify_core::domain::Role;
use blogify_core::ports::{SessionIdentity, TokenService};
use blogify_shared::ErrorBody;

pub const LOGIN_PATH: &str = "/user/login";
const LOGIN_REQUIRED: &str = "Please log in to continue.";

/// The signed-in caller.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub account_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub profile_image_url: String,
    pub role: Role,
}

impl From<SessionIdentity> for Identity {
    fn from(session: SessionIdentity) -> Self {
        Self {
            account_id: session.account_id,
            full_name: session.full_name,
            email: session.email,
            profile_image_url: session.profile_image_url,
            role: session.role,
        }
    }
}

fn login_required(req: &HttpRequest) -> HttpResponse {
    let wants_json = req
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));

    if wants_json {
        HttpResponse::Unauthorized().json(ErrorBody::new(LOGIN_REQUIRED).with_redirect(LOGIN_PATH))
    } else {
        redirect(LOGIN_PATH)
    }
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Error for handlers that need an identity but run without a guard.
#[derive(Debug)]
pub struct AuthenticationRequired;

impl std::fmt::Display for AuthenticationRequired {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(LOGIN_REQUIRED)
    }
}

impl actix_web::ResponseError for AuthenticationRequired {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Unauthorized().json(ErrorBody::new(LOGIN_REQUIRED).with_redirect(LOGIN_PATH))
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationRequired;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Identity>()
                .cloned()
                .ok_or(AuthenticationRequired),
        )
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(req.extensions().get::<Identity>().cloned())))
    }
}

/// Resolves the session cookie into an [`Identity`]. Never rejects a request.
pub struct CheckAuthentication {
    tokens: Arc<dyn TokenService>,
    cookie: Rc<str>,
}

impl CheckAuthentication {
    pub fn new(tokens: Arc<dyn TokenService>, cookie: &str) -> Self {
        Self {
            tokens,
            cookie: Rc::from(cookie),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CheckAuthentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = CheckAuthenticationService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CheckAuthenticationService {
            service,
            tokens: self.tokens.clone(),
            cookie: self.cookie.clone(),
        }))
    }
}

pub struct CheckAuthenticationService<S> {
    service: S,
    tokens: Arc<dyn TokenService>,
    cookie: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for CheckAuthenticationService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = S::Future;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(cookie) = req.cookie(&self.cookie) {
            match self.tokens.validate_token(cookie.value()) {
                Ok(claims) => {
                    req.extensions_mut().insert(Identity::from(claims.identity));
                }
                Err(e) => tracing::debug!(error = %e, "Ignoring invalid session cookie"),
            }
        }

        self.service.call(req)
    }
}

/// Route guard admitting the listed roles, and guests when `guests` is set.
///
/// Guests that are not admitted are sent to the login page (or get a 401 JSON
/// body when they asked for JSON); signed-in callers without a listed role are
/// sent home.
#[derive(Clone)]
pub struct RestrictTo {
    roles: Rc<[Role]>,
    guests: bool,
}

impl RestrictTo {
    /// Any signed-in account.
    pub fn members() -> Self {
        Self {
            roles: Rc::from([Role::User, Role::Admin]),
            guests: false,
        }
    }

    /// Only callers without a session (login and signup forms).
    pub fn guests() -> Self {
        Self {
            roles: Rc::from([]),
            guests: true,
        }
    }

    fn admits(&self, identity: Option<&Identity>) -> Result<(), &'static str> {
        match identity {
            None if self.guests => Ok(()),
            None => Err(LOGIN_PATH),
            Some(identity) if self.roles.contains(&identity.role) => Ok(()),
            Some(_) => Err("/"),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RestrictTo
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RestrictToService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RestrictToService {
            service,
            guard: self.clone(),
        }))
    }
}

pub struct RestrictToService<S> {
    service: S,
    guard: RestrictTo,
}

impl<S, B> Service<ServiceRequest> for RestrictToService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verdict = {
            let extensions = req.extensions();
            self.guard.admits(extensions.get::<Identity>())
        };

        match verdict {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(location) => {
                tracing::debug!(path = %req.path(), to = location, "Route guard refused caller");

                let response = if location == LOGIN_PATH {
                    login_required(req.request())
                } else {
                    redirect(location)
                };
                let (http_req, _payload) = req.into_parts();
                let srv_response = ServiceResponse::new(http_req, response);

                Box::pin(async move { Ok(srv_response.map_into_right_body()) })
            }
        }
    }
}
