//! Request logging
//!
//! Clients poll the read endpoints every few seconds, so successful GETs are
//! logged at debug. Writes and client errors go out at info, server errors at
//! warn.

use crate::correlation_id::CorrelationId;
use crate::jwt_auth::UserId;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{Method, StatusCode},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::time::Instant;
use tracing::Level;

/// Middleware that logs one line per completed request
#[derive(Clone, Default)]
pub struct Logging;

/// Level a completed request is logged at
pub fn completion_level(method: &Method, status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::WARN
    } else if *method == Method::GET && status.is_success() {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

impl<S, B> Transform<S, ServiceRequest> for Logging
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggingService { service }))
    }
}

pub struct LoggingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for LoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();
        let (correlation_id, user_id) = {
            let ext = req.extensions();
            (
                ext.get::<CorrelationId>().map(|c| c.0.clone()).unwrap_or_default(),
                ext.get::<UserId>().map(|u| u.0.to_string()),
            )
        };
        let user_id = user_id.as_deref().unwrap_or("anonymous").to_string();

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            let status = res.status();
            let duration_ms = start.elapsed().as_millis() as u64;

            macro_rules! completed {
                ($lvl:expr) => {
                    tracing::event!(
                        $lvl,
                        method = %method,
                        path = %path,
                        status = status.as_u16(),
                        duration_ms,
                        correlation_id = %correlation_id,
                        user_id = %user_id,
                        "HTTP request completed"
                    )
                };
            }

            let level = completion_level(&method, status);
            if level == Level::WARN {
                completed!(Level::WARN);
            } else if level == Level::DEBUG {
                completed!(Level::DEBUG);
            } else {
                completed!(Level::INFO);
            }

            Ok(res)
        })
    }
}
