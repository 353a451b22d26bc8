pub mod http;
pub mod mail_relay;
