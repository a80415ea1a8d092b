//! Per-request authentication and authorization gate.
//!
//! Applied to the API scope. Register and login pass through untouched;
//! every other request must carry a bearer token that verifies and that the
//! access policy accepts for the route and method. Verified claims are
//! attached to the request for handlers to extract.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{policy, verify_token};
use crate::configuration::AuthSettings;

pub struct AuthGate {
    settings: AuthSettings,
}

impl AuthGate {
    pub fn new(settings: AuthSettings) -> Self {
        Self { settings }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthGateService {
            service: Rc::new(service),
            settings: self.settings.clone(),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
    settings: AuthSettings,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if policy::is_public(req.path()) {
            let service = self.service.clone();
            return Box::pin(async move { service.call(req).await });
        }

        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer ").map(str::to_owned));

        let token = match bearer {
            Some(token) => token,
            None => {
                tracing::warn!(path = req.path(), "missing or malformed Authorization header");
                let response = HttpResponse::Unauthorized().json(serde_json::json!({
                    "code": "UNAUTHORIZED",
                    "message": "missing authorization header"
                }));
                return Box::pin(async move {
                    Err(actix_web::error::InternalError::from_response("unauthorized", response)
                        .into())
                });
            }
        };

        let claims = match verify_token(&token, &self.settings) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(path = req.path(), error = %e, "token verification failed");
                let response = HttpResponse::Unauthorized().json(serde_json::json!({
                    "code": "UNAUTHORIZED",
                    "message": "invalid or expired token"
                }));
                return Box::pin(async move {
                    Err(actix_web::error::InternalError::from_response("invalid token", response)
                        .into())
                });
            }
        };

        if !policy::decide(req.path(), req.method(), Some(&claims)) {
            tracing::warn!(
                path = req.path(),
                username = %claims.username,
                access_level = claims.access_level,
                "request denied by access policy"
            );
            let response = HttpResponse::Forbidden().json(serde_json::json!({
                "code": "FORBIDDEN",
                "message": "insufficient access level"
            }));
            return Box::pin(async move {
                Err(actix_web::error::InternalError::from_response("forbidden", response).into())
            });
        }

        req.extensions_mut().insert(claims);

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
