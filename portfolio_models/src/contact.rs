use std::{collections::BTreeMap, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

pub static CONTACT_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").unwrap());

pub static CONTACT_EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+@gmail\.com$").unwrap());

/// Minimum number of characters of a trimmed message.
pub const CONTACT_MESSAGE_MIN_LEN: usize = 10;

/// The four-field payload a visitor submits through the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Subject => &self.subject,
            ContactField::Message => &self.message,
        }
    }

    pub fn field_mut(&mut self, field: ContactField) -> &mut String {
        match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Subject => &mut self.subject,
            ContactField::Message => &mut self.message,
        }
    }

    pub fn is_empty(&self) -> bool {
        ContactField::ALL.iter().all(|&f| self.field(f).is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Subject,
    Message,
}

impl ContactField {
    pub const ALL: [Self; 4] = [Self::Name, Self::Email, Self::Subject, Self::Message];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for ContactField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown contact field: {0:?}")]
pub struct UnknownContactField(pub String);

impl FromStr for ContactField {
    type Err = UnknownContactField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownContactField(s.into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactFieldError {
    #[error("Name is required")]
    NameRequired,
    #[error("Name can only contain letters")]
    NameInvalid,
    #[error("Email is required")]
    EmailRequired,
    #[error("Please enter a valid Gmail address")]
    EmailInvalid,
    #[error("Subject is required")]
    SubjectRequired,
    #[error("Message is required")]
    MessageRequired,
    #[error("Message must be at least 10 characters long")]
    MessageTooShort,
}

impl Serialize for ContactFieldError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Per-field validation failures. A field without an entry is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<ContactField, ContactFieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: ContactField) -> Option<ContactFieldError> {
        self.0.get(&field).copied()
    }

    pub fn remove(&mut self, field: ContactField) -> Option<ContactFieldError> {
        self.0.remove(&field)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContactField, ContactFieldError)> + '_ {
        self.0.iter().map(|(&field, &error)| (field, error))
    }

    fn insert(&mut self, field: ContactField, error: Option<ContactFieldError>) {
        if let Some(error) = error {
            self.0.insert(field, error);
        }
    }
}

impl FromIterator<(ContactField, ContactFieldError)> for ValidationErrors {
    fn from_iter<T: IntoIterator<Item = (ContactField, ContactFieldError)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Validates all four fields of a contact message.
///
/// Every rule is evaluated, so the result lists each failing field and not only
/// the first one.
pub fn validate(message: &ContactMessage) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    errors.insert(ContactField::Name, validate_name(&message.name));
    errors.insert(ContactField::Email, validate_email(&message.email));
    errors.insert(ContactField::Subject, validate_subject(&message.subject));
    errors.insert(ContactField::Message, validate_message(&message.message));
    errors
}

fn validate_name(name: &str) -> Option<ContactFieldError> {
    let name = name.trim();
    if name.is_empty() {
        Some(ContactFieldError::NameRequired)
    } else if !CONTACT_NAME_REGEX.is_match(name) {
        Some(ContactFieldError::NameInvalid)
    } else {
        None
    }
}

fn validate_email(email: &str) -> Option<ContactFieldError> {
    let email = email.trim();
    if email.is_empty() {
        Some(ContactFieldError::EmailRequired)
    } else if !CONTACT_EMAIL_REGEX.is_match(email) {
        Some(ContactFieldError::EmailInvalid)
    } else {
        None
    }
}

fn validate_subject(subject: &str) -> Option<ContactFieldError> {
    subject
        .trim()
        .is_empty()
        .then_some(ContactFieldError::SubjectRequired)
}

fn validate_message(message: &str) -> Option<ContactFieldError> {
    let message = message.trim();
    if message.is_empty() {
        Some(ContactFieldError::MessageRequired)
    } else if message.chars().count() < CONTACT_MESSAGE_MIN_LEN {
        Some(ContactFieldError::MessageTooShort)
    } else {
        None
    }
}
