//! Rate limiting middleware.

use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures::future::LocalBoxFuture;

use toolreview_core::ports::{RateLimitResult, RateLimiter};
use toolreview_shared::ErrorResponse;

/// Rate limiting middleware factory. Requests are keyed by client address.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
}

fn too_many_requests(result: &RateLimitResult) -> HttpResponse {
    let retry_after = result.retry_after_secs();
    let error = ErrorResponse::too_many_requests().with_detail(format!(
        "Rate limit exceeded. Try again in {retry_after} seconds."
    ));

    HttpResponse::TooManyRequests()
        .insert_header(("X-RateLimit-Remaining", "0"))
        .insert_header(("Retry-After", retry_after.to_string()))
        .json(error)
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = self.limiter.clone();
        let key = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        Box::pin(async move {
            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    tracing::warn!(client = %key, "Rate limit exceeded");
                    let response = too_many_requests(&result);
                    return Ok(req.into_response(response).map_into_right_body());
                }
                Ok(_) => {}
                Err(err) => tracing::error!(error = %err, "Rate limiter error, failing open"),
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
