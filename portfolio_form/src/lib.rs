//! State of the portfolio contact form.
//!
//! [`ContactFormController`] holds the four form fields, the per-field
//! validation errors and the submission state which drives the status banner.
//! A renderer calls [`ContactFormController::update_field`] whenever an input
//! changes and [`ContactFormController::submit`] when the form is submitted.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use portfolio_extern_contracts::mail_relay::MailRelayApiService;
use portfolio_models::contact::{
    validate, ContactField, ContactFieldError, ContactMessage, ValidationErrors,
};
use tokio::{sync::watch, task::AbortHandle};
use tracing::{debug, warn};

pub const SUCCESS_BANNER: &str = "Message sent successfully! I'll get back to you soon.";
pub const ERROR_BANNER: &str = "Failed to send message. Please try again.";
pub const SUBMIT_LABEL: &str = "Send Message";
pub const SUBMITTING_LABEL: &str = "Sending...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

impl SubmissionState {
    /// Text of the status banner shown for this state, if any.
    pub fn banner(self) -> Option<&'static str> {
        match self {
            Self::Success => Some(SUCCESS_BANNER),
            Self::Error => Some(ERROR_BANNER),
            Self::Idle | Self::Submitting => None,
        }
    }

    fn resets(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed, the relay was not contacted.
    Invalid(ValidationErrors),
    Sent,
    Failed,
}

#[derive(Debug, Clone, Copy)]
pub struct ContactFormConfig {
    /// Time after which a success or error status reverts to idle.
    pub status_reset_delay: Duration,
}

impl Default for ContactFormConfig {
    fn default() -> Self {
        Self {
            status_reset_delay: Duration::from_secs(3),
        }
    }
}

#[derive(Debug)]
pub struct ContactFormController<Relay> {
    relay: Relay,
    config: ContactFormConfig,
    fields: ContactMessage,
    errors: ValidationErrors,
    status: Arc<StatusCell>,
    reset_timer: Option<AbortHandle>,
}

/// Submission state shared with the reset timer.
///
/// Every transition bumps `epoch`; a timer only resets the state it was armed
/// for.
#[derive(Debug)]
struct StatusCell {
    state: watch::Sender<SubmissionState>,
    epoch: AtomicU64,
}

impl StatusCell {
    fn set(&self, state: SubmissionState) -> u64 {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(state);
        epoch
    }

    async fn reset_after(self: Arc<Self>, epoch: u64, delay: Duration) {
        tokio::time::sleep(delay).await;
        self.reset(epoch);
    }

    fn reset(&self, epoch: u64) {
        self.state.send_if_modified(|state| {
            if self.epoch.load(Ordering::SeqCst) != epoch || *state == SubmissionState::Idle {
                return false;
            }
            *state = SubmissionState::Idle;
            true
        });
    }
}

impl<Relay> ContactFormController<Relay> {
    pub fn new(relay: Relay, config: ContactFormConfig) -> Self {
        Self {
            relay,
            config,
            fields: ContactMessage::default(),
            errors: ValidationErrors::default(),
            status: Arc::new(StatusCell {
                state: watch::Sender::new(SubmissionState::Idle),
                epoch: AtomicU64::new(0),
            }),
            reset_timer: None,
        }
    }

    /// Overwrite a field and hide the error currently shown for it.
    ///
    /// The field is not validated again until the next submission.
    pub fn update_field(&mut self, field: ContactField, value: impl Into<String>) {
        *self.fields.field_mut(field) = value.into();
        self.errors.remove(field);
    }

    pub fn fields(&self) -> &ContactMessage {
        &self.fields
    }

    pub fn field(&self, field: ContactField) -> &str {
        self.fields.field(field)
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error(&self, field: ContactField) -> Option<ContactFieldError> {
        self.errors.get(field)
    }

    pub fn state(&self) -> SubmissionState {
        *self.status.state.borrow()
    }

    pub fn is_submitting(&self) -> bool {
        self.state() == SubmissionState::Submitting
    }

    pub fn banner(&self) -> Option<&'static str> {
        self.state().banner()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_submitting() {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    /// Receive every change of the submission state, including the automatic
    /// reset to idle.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.status.state.subscribe()
    }

    fn transition(&mut self, state: SubmissionState) {
        if let Some(timer) = self.reset_timer.take() {
            timer.abort();
        }

        let epoch = self.status.set(state);
        debug!(?state, epoch, "contact form state changed");

        if state.resets() {
            let status = Arc::clone(&self.status);
            let timer = tokio::spawn(status.reset_after(epoch, self.config.status_reset_delay));
            self.reset_timer = Some(timer.abort_handle());
        }
    }
}

/// Moves the form to [`SubmissionState::Error`] if a submission is dropped
/// while waiting for the relay.
struct InFlight {
    status: Arc<StatusCell>,
    delay: Duration,
    done: bool,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.done {
            return;
        }

        warn!("contact form submission was cancelled");
        let epoch = self.status.set(SubmissionState::Error);
        // The epoch check makes this timer harmless once the controller moves on.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(Arc::clone(&self.status).reset_after(epoch, self.delay));
        }
    }
}

impl<Relay> ContactFormController<Relay>
where
    Relay: MailRelayApiService,
{
    /// Validate the current fields and, if they are valid, send them to the
    /// mail relay.
    ///
    /// Must be called from within a tokio runtime. Dropping the returned
    /// future while the relay call is pending leaves the form in the error
    /// state, which resets like any other failed submission.
    pub async fn submit(&mut self) -> SubmitOutcome {
        self.transition(SubmissionState::Idle);

        self.errors = validate(&self.fields);
        if !self.errors.is_empty() {
            return SubmitOutcome::Invalid(self.errors.clone());
        }

        self.transition(SubmissionState::Submitting);
        let mut in_flight = InFlight {
            status: Arc::clone(&self.status),
            delay: self.config.status_reset_delay,
            done: false,
        };

        let result = self.relay.send_message(&self.fields).await;
        in_flight.done = true;

        let sent = match result {
            Ok(true) => true,
            Ok(false) => {
                warn!("mail relay rejected contact message");
                false
            }
            Err(err) => {
                warn!("failed to reach mail relay: {err}");
                false
            }
        };

        if sent {
            self.fields = ContactMessage::default();
            self.errors.clear();
            self.transition(SubmissionState::Success);
            SubmitOutcome::Sent
        } else {
            self.transition(SubmissionState::Error);
            SubmitOutcome::Failed
        }
    }
}

impl<Relay> Drop for ContactFormController<Relay> {
    fn drop(&mut self) {
        if let Some(timer) = self.reset_timer.take() {
            timer.abort();
        }
    }
}
