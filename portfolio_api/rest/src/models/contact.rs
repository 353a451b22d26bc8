use portfolio_models::contact::ContactMessage;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiContactMessage {
    /// Full name of the visitor
    pub name: String,
    /// Email address of the visitor
    pub email: String,
    /// Subject of the message
    pub subject: String,
    /// Content of the message
    pub message: String,
}

impl From<ApiContactMessage> for ContactMessage {
    fn from(value: ApiContactMessage) -> Self {
        Self {
            name: value.name,
            email: value.email,
            subject: value.subject,
            message: value.message,
        }
    }
}
