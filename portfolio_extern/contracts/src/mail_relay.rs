use std::future::Future;

use portfolio_models::contact::ContactMessage;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait MailRelayApiService: Send + Sync + 'static {
    /// Submit a contact message to the mail relay endpoint.
    ///
    /// Returns `Ok(false)` if the endpoint answered with a non-success status.
    fn send_message(
        &self,
        message: &ContactMessage,
    ) -> impl Future<Output = anyhow::Result<bool>> + Send;
}

#[cfg(feature = "mock")]
impl MockMailRelayApiService {
    pub fn with_send_message(mut self, message: ContactMessage, result: bool) -> Self {
        self.expect_send_message()
            .once()
            .with(mockall::predicate::eq(message))
            .return_once(move |_| Box::pin(std::future::ready(Ok(result))));
        self
    }

    pub fn with_send_message_error(mut self, message: ContactMessage) -> Self {
        self.expect_send_message()
            .once()
            .with(mockall::predicate::eq(message))
            .return_once(|_| {
                Box::pin(std::future::ready(Err(anyhow::anyhow!(
                    "error sending request"
                ))))
            });
        self
    }
}
