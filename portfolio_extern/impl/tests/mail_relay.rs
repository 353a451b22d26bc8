use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{extract::State, http::StatusCode, routing, Json, Router};
use portfolio_extern_contracts::mail_relay::MailRelayApiService;
use portfolio_extern_impl::{
    http::HttpClient,
    mail_relay::{MailRelayApiServiceConfig, MailRelayApiServiceImpl},
};
use portfolio_models::contact::ContactMessage;
use serde_json::Value;
use tokio::net::TcpListener;

type Received = Arc<Mutex<Vec<Value>>>;

#[tokio::test]
async fn success() {
    let (addr, received) = start_server(StatusCode::OK).await;
    let sut = make_sut(format!("http://{addr}/api/send-email"));

    let result = sut.send_message(&message()).await.unwrap();

    assert!(result);
    assert_eq!(
        *received.lock().unwrap(),
        [serde_json::json!({
            "name": "Jane Doe",
            "email": "jane@gmail.com",
            "subject": "Hi",
            "message": "Loved your portfolio!",
        })]
    );
}

#[tokio::test]
async fn server_error() {
    let (addr, received) = start_server(StatusCode::INTERNAL_SERVER_ERROR).await;
    let sut = make_sut(format!("http://{addr}/api/send-email"));

    let result = sut.send_message(&message()).await.unwrap();

    assert!(!result);
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn not_found() {
    let (addr, received) = start_server(StatusCode::OK).await;
    let sut = make_sut(format!("http://{addr}/wrong"));

    let result = sut.send_message(&message()).await.unwrap();

    assert!(!result);
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let sut = make_sut(format!("http://{addr}/api/send-email"));

    let result = sut.send_message(&message()).await;

    assert!(result.is_err());
}

fn message() -> ContactMessage {
    ContactMessage {
        name: "Jane Doe".into(),
        email: "jane@gmail.com".into(),
        subject: "Hi".into(),
        message: "Loved your portfolio!".into(),
    }
}

fn make_sut(endpoint: String) -> MailRelayApiServiceImpl {
    MailRelayApiServiceImpl::new(
        MailRelayApiServiceConfig {
            endpoint: Arc::new(endpoint.parse().unwrap()),
        },
        HttpClient::new(Duration::from_secs(5)).unwrap(),
    )
}

async fn start_server(status: StatusCode) -> (SocketAddr, Received) {
    let received = Received::default();

    let router = Router::new()
        .route(
            "/api/send-email",
            routing::post(
                move |State(received): State<Received>, Json(body): Json<Value>| async move {
                    received.lock().unwrap().push(body);
                    (status, Json(serde_json::json!({"message": "ok"})))
                },
            ),
        )
        .with_state(Arc::clone(&received));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    (addr, received)
}
