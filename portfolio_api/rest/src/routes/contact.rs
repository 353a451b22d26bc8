use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use portfolio_core_contact_contracts::{ContactSendMessageError, ContactService};
use tracing::error;

use super::respond;
use crate::models::{contact::ApiContactMessage, ApiMessage};

pub fn router(service: Arc<impl ContactService>) -> Router<()> {
    Router::new()
        .route("/api/send-email", routing::post(send_message))
        .with_state(service)
}

async fn send_message(
    service: State<Arc<impl ContactService>>,
    Json(message): Json<ApiContactMessage>,
) -> Response {
    match service.send_message(message.into()).await {
        Ok(()) => respond(StatusCode::OK, "Email sent successfully"),
        Err(ContactSendMessageError::Invalid(errors)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiMessage {
                message: "Invalid contact message",
                errors: Some(errors),
            }),
        )
            .into_response(),
        Err(ContactSendMessageError::Send) => {
            error!("smtp server did not accept the contact message");
            failed()
        }
        Err(ContactSendMessageError::Other(err)) => {
            error!("failed to send contact message: {err:#}");
            failed()
        }
    }
}

fn failed() -> Response {
    respond(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send email")
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request},
    };
    use portfolio_core_contact_contracts::MockContactService;
    use portfolio_models::contact::{validate, ContactMessage};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    fn jane() -> ContactMessage {
        ContactMessage {
            name: "Jane Doe".into(),
            email: "jane@gmail.com".into(),
            subject: "Hi".into(),
            message: "Loved your portfolio!".into(),
        }
    }

    fn request(body: impl Into<Body>) -> Request<Body> {
        Request::post("/api/send-email")
            .header(CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn call(service: MockContactService, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(service.into()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn jane_body() -> String {
        serde_json::to_string(&jane()).unwrap()
    }

    #[tokio::test]
    async fn ok() {
        // Arrange
        let service = MockContactService::new().with_send_message(jane(), Ok(()));

        // Act
        let (status, body) = call(service, request(jane_body())).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Email sent successfully"}));
    }

    #[tokio::test]
    async fn send_failed() {
        // Arrange
        let service =
            MockContactService::new().with_send_message(jane(), Err(ContactSendMessageError::Send));

        // Act
        let (status, body) = call(service, request(jane_body())).await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Failed to send email"}));
    }

    #[tokio::test]
    async fn transport_error_is_not_leaked() {
        // Arrange
        let service = MockContactService::new().with_send_message(
            jane(),
            Err(ContactSendMessageError::Other(anyhow!(
                "connection refused by smtp.example.com"
            ))),
        );

        // Act
        let (status, body) = call(service, request(jane_body())).await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Failed to send email"}));
    }

    #[tokio::test]
    async fn invalid() {
        // Arrange
        let message = ContactMessage {
            name: "J4ne".into(),
            message: "short".into(),
            ..jane()
        };
        let errors = validate(&message);
        let service = MockContactService::new().with_send_message(
            message.clone(),
            Err(ContactSendMessageError::Invalid(errors)),
        );

        // Act
        let (status, body) = call(service, request(serde_json::to_string(&message).unwrap())).await;

        // Assert
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({
                "message": "Invalid contact message",
                "errors": {
                    "name": "Name can only contain letters",
                    "message": "Message must be at least 10 characters long",
                },
            })
        );
    }

    #[tokio::test]
    async fn missing_field() {
        // Arrange
        let body = json!({"name": "Jane Doe", "email": "jane@gmail.com", "subject": "Hi"});

        // Act
        let (status, _) = call(MockContactService::new(), request(body.to_string())).await;

        // Assert
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn not_json() {
        // Act
        let (status, _) = call(MockContactService::new(), request("name=Jane")).await;

        // Assert
        assert!(status.is_client_error());
    }
}
