pub mod webhook_secret;

pub use webhook_secret::{make_span, verify_webhook_secret, SECRET_TOKEN_HEADER};
