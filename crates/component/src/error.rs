use thiserror::Error;
use twilink_core::PortError;

/// Errors a component reports to the host.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// The requested component was not found in the registry.
    #[error("component not found: {0}")]
    NotFound(String),

    /// One or more required inputs were absent or empty.
    #[error("missing required input: {0}")]
    MissingInput(String),

    /// An input was present but unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The component could not be configured (e.g. no credentials).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The remote API rejected the request due to rate limiting.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The remote API returned an error.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<PortError> for ComponentError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Missing(port) => Self::MissingInput(port),
            PortError::TypeMismatch { .. } => Self::InvalidInput(err.to_string()),
        }
    }
}

/// Errors produced while running a flow.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The flow definition is inconsistent (unknown component, bad link...).
    #[error("invalid flow: {0}")]
    Invalid(String),

    /// A step's component failed; the component error is kept unchanged.
    #[error("step '{step}' ({component}) failed: {source}")]
    Step {
        step: String,
        component: String,
        #[source]
        source: ComponentError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_input_errors() {
        let err: ComponentError = PortError::Missing("to_number".into()).into();
        assert!(matches!(err, ComponentError::MissingInput(ref p) if p == "to_number"));

        let err: ComponentError = PortError::TypeMismatch {
            port: "limit".into(),
            expected: "a non-negative integer",
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invalid input: input 'limit' must be a non-negative integer"
        );
    }

    #[test]
    fn step_error_keeps_component_message() {
        let err = FlowError::Step {
            step: "sms".into(),
            component: "twilio_send_sms".into(),
            source: ComponentError::ExecutionFailed("[21211] Invalid 'To' Phone Number".into()),
        };
        assert_eq!(
            err.to_string(),
            "step 'sms' (twilio_send_sms) failed: execution failed: [21211] Invalid 'To' Phone Number"
        );
    }

    #[test]
    fn error_display() {
        let err = ComponentError::NotFound("twilio_fax".into());
        assert_eq!(err.to_string(), "component not found: twilio_fax");

        let err = ComponentError::RateLimited("Too Many Requests".into());
        assert_eq!(err.to_string(), "rate limited: Too Many Requests");
    }
}
