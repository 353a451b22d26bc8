use portfolio_models::contact::ValidationErrors;
use serde::Serialize;

pub mod contact;

#[derive(Serialize)]
pub struct ApiMessage {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}
