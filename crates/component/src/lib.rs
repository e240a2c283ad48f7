pub mod component;
pub mod error;
pub mod flow;
pub mod registry;

pub use component::{Component, DynComponent, check_inputs, run_component};
pub use error::{ComponentError, FlowError};
pub use flow::{Binding, Flow, FlowReport, Link, Step, StepReport};
pub use registry::ComponentRegistry;

pub use twilink_core::{ComponentSpec, Handle, PortError, PortSpec, PortValue, Ports};
