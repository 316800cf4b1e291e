// Object response policy (CORS/CSP) for download redirects
//
// Handlers tag a response with the object's `ResponseHeaderSet`; this layer
// sits outside `CorsLayer` so the per-object values are the ones the browser
// sees.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::storage::ResponseHeaderSet;

/// Response extension carrying the policy for the object being served
#[derive(Debug, Clone)]
pub struct ObjectPolicy(pub ResponseHeaderSet);

pub async fn apply_object_policy(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    if let Some(ObjectPolicy(policy)) = response.extensions_mut().remove::<ObjectPolicy>() {
        let headers = response.headers_mut();
        for (name, value) in policy.policy_headers() {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
    }
    response
}
