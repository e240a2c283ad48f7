//! Port values, opaque handles, and static component metadata.
//!
//! These types model the typed sockets a workflow host wires between
//! components. Data ports carry JSON; handle ports carry shared,
//! reference-counted objects such as an authenticated API session.

pub mod error;
pub mod handle;
pub mod port;
pub mod spec;

pub use error::PortError;
pub use handle::Handle;
pub use port::{PortValue, Ports};
pub use spec::{ComponentSpec, PortSpec};
