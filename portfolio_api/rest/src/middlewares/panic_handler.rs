//! Turn a panicking handler into a 500 response instead of a dropped connection.

use std::{any::Any, panic::AssertUnwindSafe};

use anyhow::anyhow;
use axum::{
    extract::Request,
    middleware::{from_fn, Next},
    response::Response,
    Router,
};
use futures::FutureExt;

use crate::routes::internal_server_error;

pub fn add<S: Clone + Send + Sync + 'static>(router: Router<S>) -> Router<S> {
    router.layer(from_fn(middleware))
}

async fn middleware(request: Request, next: Next) -> Response {
    AssertUnwindSafe(next.run(request))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| {
            internal_server_error(anyhow!("handler panicked: {}", panic_message(&*payload)))
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload")
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, routing};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn panic_becomes_500() {
        // Arrange
        let router = add(Router::new().route(
            "/",
            routing::get(|| async {
                if true {
                    panic!("handler failed");
                }
            }),
        ));

        // Act
        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), 500);
    }

    #[test]
    fn panic_message_from_payload() {
        let literal: Box<dyn Any + Send> = Box::new("static message");
        let formatted: Box<dyn Any + Send> = Box::new(format!("code {}", 42));
        let other: Box<dyn Any + Send> = Box::new(7);

        assert_eq!(panic_message(&*literal), "static message");
        assert_eq!(panic_message(&*formatted), "code 42");
        assert_eq!(panic_message(&*other), "unknown panic payload");
    }
}
