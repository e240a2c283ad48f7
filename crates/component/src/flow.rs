//! Sequential flow runner.
//!
//! A flow is the chain a workflow author draws in the host editor, e.g.
//! `twilio_auth -> twilio_send_sms -> twilio_get_message_status`. Steps run
//! strictly in declaration order and each step's inputs are either literal
//! JSON values or links to an output of an earlier step.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};
use twilink_core::{PortValue, Ports};

use crate::component::run_component;
use crate::error::FlowError;
use crate::registry::ComponentRegistry;

/// A chain of component steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flow {
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<Step>,
}

/// One node in a flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Unique step identifier, referenced by links. Must not contain `.`.
    pub id: String,
    /// Registered component name.
    pub component: String,
    #[serde(default)]
    pub inputs: BTreeMap<String, Binding>,
}

/// Where a step input gets its value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Binding {
    /// `{ from: "<step>.<port>" }`
    Link(Link),
    /// Any other JSON value, passed as-is.
    Literal(Value),
}

/// Reference to an output port of an earlier step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Link {
    pub from: String,
}

impl Link {
    /// Split `step.port` into its parts.
    pub fn parts(&self) -> Option<(&str, &str)> {
        self.from
            .split_once('.')
            .filter(|(step, port)| !step.is_empty() && !port.is_empty())
    }
}

/// Outputs of one executed step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub id: String,
    pub component: String,
    pub outputs: Ports,
}

/// Outputs of every step, in execution order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowReport {
    pub steps: Vec<StepReport>,
}

impl FlowReport {
    /// Outputs of the step with the given id.
    pub fn outputs(&self, step: &str) -> Option<&Ports> {
        self.steps.iter().find(|s| s.id == step).map(|s| &s.outputs)
    }
}

impl Flow {
    /// Check the flow against a registry without running anything.
    ///
    /// Rejects duplicate or dotted step ids, unknown components, malformed
    /// links, links to later or unknown steps, and links to ports the source
    /// component never publishes.
    pub fn validate(&self, registry: &ComponentRegistry) -> Result<(), FlowError> {
        let mut seen: HashMap<&str, &str> = HashMap::new();

        for step in &self.steps {
            if step.id.is_empty() || step.id.contains('.') {
                return Err(FlowError::Invalid(format!(
                    "step id '{}' must be non-empty and must not contain '.'",
                    step.id
                )));
            }
            if seen.contains_key(step.id.as_str()) {
                return Err(FlowError::Invalid(format!(
                    "duplicate step id '{}'",
                    step.id
                )));
            }
            if registry.get(&step.component).is_none() {
                return Err(FlowError::Invalid(format!(
                    "step '{}' uses unknown component '{}'",
                    step.id, step.component
                )));
            }

            for (input, binding) in &step.inputs {
                let Binding::Link(link) = binding else {
                    continue;
                };
                let (source, port) = link.parts().ok_or_else(|| {
                    FlowError::Invalid(format!(
                        "step '{}' input '{input}': link '{}' is not of the form step.port",
                        step.id, link.from
                    ))
                })?;
                let source_component = seen.get(source).ok_or_else(|| {
                    FlowError::Invalid(format!(
                        "step '{}' input '{input}' links to '{source}', which is not an earlier step",
                        step.id
                    ))
                })?;
                let declares_port = registry
                    .get(source_component)
                    .is_some_and(|c| c.spec().has_output(port));
                if !declares_port {
                    return Err(FlowError::Invalid(format!(
                        "step '{}' input '{input}' links to '{source}.{port}', but \
                         {source_component} has no output '{port}'",
                        step.id
                    )));
                }
            }

            seen.insert(&step.id, &step.component);
        }

        Ok(())
    }

    /// Validate, then run every step in order.
    ///
    /// The first failing step aborts the run; its error is returned
    /// unchanged inside [`FlowError::Step`].
    #[instrument(skip_all, fields(flow = self.name.as_deref().unwrap_or("unnamed")))]
    pub async fn run(&self, registry: &ComponentRegistry) -> Result<FlowReport, FlowError> {
        self.validate(registry)?;

        let mut report = FlowReport::default();
        for step in &self.steps {
            let inputs = resolve_inputs(step, &report)?;
            let component = registry.get(&step.component).ok_or_else(|| {
                FlowError::Invalid(format!("unknown component '{}'", step.component))
            })?;

            info!(step = %step.id, component = %step.component, "running step");

            let outputs = run_component(component.as_ref(), &inputs)
                .await
                .map_err(|source| FlowError::Step {
                    step: step.id.clone(),
                    component: step.component.clone(),
                    source,
                })?;

            report.steps.push(StepReport {
                id: step.id.clone(),
                component: step.component.clone(),
                outputs,
            });
        }

        info!(steps = report.steps.len(), "flow finished");
        Ok(report)
    }
}

fn resolve_inputs(step: &Step, report: &FlowReport) -> Result<Ports, FlowError> {
    step.inputs
        .iter()
        .map(|(name, binding)| {
            let value = match binding {
                Binding::Literal(v) => PortValue::Value(v.clone()),
                Binding::Link(link) => resolve_link(step, name, link, report)?,
            };
            Ok((name.clone(), value))
        })
        .collect()
}

fn resolve_link(
    step: &Step,
    input: &str,
    link: &Link,
    report: &FlowReport,
) -> Result<PortValue, FlowError> {
    let (source, port) = link
        .parts()
        .ok_or_else(|| FlowError::Invalid(format!("malformed link '{}'", link.from)))?;
    report
        .outputs(source)
        .and_then(|outputs| outputs.get(port))
        .cloned()
        .ok_or_else(|| {
            FlowError::Invalid(format!(
                "step '{}' input '{input}': step '{source}' did not publish '{port}'",
                step.id
            ))
        })
}
