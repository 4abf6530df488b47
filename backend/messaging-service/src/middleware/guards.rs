//! Caller extraction for handlers
//!
//! `JwtAuthMiddleware` resolves the token; this guard only reads the result.
//! Anonymous callers are represented, not rejected: read paths degrade to
//! empty results and write paths return `Unauthenticated` from the services.

use actix_middleware::UserId;
use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

/// The resolved caller, `None` when the request carries no valid token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Option<Uuid>);

impl Caller {
    pub fn id(&self) -> Option<Uuid> {
        self.0
    }
}

impl FromRequest for Caller {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user_id = req.extensions().get::<UserId>().map(|u| u.0);
        ready(Ok(Caller(user_id)))
    }
}
