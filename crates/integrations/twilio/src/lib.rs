//! Twilio components for twilink workflows.
//!
//! The crate wraps the [Twilio REST API](https://www.twilio.com/docs/usage/api)
//! for messages, calls, and account lookups, and exposes each operation as a
//! [`Component`](twilink_component::Component) that can be wired into a flow.
//! A `twilio_auth` step produces a session handle on its `client` port; every
//! other Twilio component accepts that handle or falls back to credentials
//! from the environment.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use twilink_component::{ComponentRegistry, Ports};
//! use twilink_twilio::{ProcessEnv, register_all};
//!
//! # async fn demo() -> Result<(), twilink_component::ComponentError> {
//! let mut registry = ComponentRegistry::new();
//! register_all(&mut registry, Arc::new(ProcessEnv));
//!
//! let session = registry.run("twilio_auth", &Ports::new()).await?;
//! let mut inputs = Ports::new()
//!     .with("from_number", "+15551234567")
//!     .with("to_number", "+15559876543")
//!     .with("message", "Your order has shipped");
//! if let Some(client) = session.get("client") {
//!     inputs.insert("client", client.clone());
//! }
//! let sent = registry.run("twilio_send_sms", &inputs).await?;
//! println!("{:?}", sent.string("message_sid")?);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod components;
pub mod config;
pub mod error;
pub mod twiml;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use client::TwilioClient;
pub use components::register_all;
pub use config::{Environment, ProcessEnv, TwilioConfig};
pub use error::{ApiError, TwilioError};
