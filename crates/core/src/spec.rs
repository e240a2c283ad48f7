use serde::Serialize;

use crate::port::Ports;

/// Description of a single input or output port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortSpec {
    /// Port name as wired in the host.
    pub name: &'static str,
    /// Whether the component refuses to run without this input.
    pub required: bool,
    /// Human-readable description shown in the host's editor.
    pub description: &'static str,
}

impl PortSpec {
    pub const fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            required: false,
            description,
        }
    }
}

/// Static metadata for a component: its name and port layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComponentSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub inputs: &'static [PortSpec],
    pub outputs: &'static [PortSpec],
}

impl ComponentSpec {
    /// Names of required inputs that are absent or empty in `inputs`.
    pub fn missing_inputs(&self, inputs: &Ports) -> Vec<&'static str> {
        self.inputs
            .iter()
            .filter(|p| p.required && !inputs.is_set(p.name))
            .map(|p| p.name)
            .collect()
    }

    /// Look up an input port by name.
    pub fn input(&self, name: &str) -> Option<&PortSpec> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Returns `true` if the component declares an output with this name.
    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.iter().any(|p| p.name == name)
    }
}
