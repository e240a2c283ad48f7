use async_trait::async_trait;
use tracing::{debug, instrument};
use twilink_core::{ComponentSpec, Ports};

use crate::error::ComponentError;

/// Strongly-typed component trait with native `async fn`.
///
/// A component is one node in the host's workflow editor: it reads its input
/// ports, performs a single operation, and publishes its output ports.
///
/// This trait is **not** object-safe. Use [`DynComponent`] for dynamic
/// dispatch; every `Component` implements it through a blanket impl.
pub trait Component: Send + Sync {
    /// Static port layout and name of this component.
    fn spec(&self) -> &'static ComponentSpec;

    /// Unique name of this component.
    fn name(&self) -> &'static str {
        self.spec().name
    }

    /// Run the component once against the given inputs.
    ///
    /// Required inputs have already been checked by [`run_component`] when
    /// invoked through the registry or a flow.
    fn execute(
        &self,
        inputs: &Ports,
    ) -> impl std::future::Future<Output = Result<Ports, ComponentError>> + Send;
}

/// Object-safe component trait for use behind `Arc<dyn DynComponent>`.
///
/// Implement [`Component`] instead and rely on the blanket implementation.
#[async_trait]
pub trait DynComponent: Send + Sync {
    fn spec(&self) -> &'static ComponentSpec;

    fn name(&self) -> &'static str;

    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError>;
}

#[async_trait]
impl<T: Component + Sync> DynComponent for T {
    fn spec(&self) -> &'static ComponentSpec {
        Component::spec(self)
    }

    fn name(&self) -> &'static str {
        Component::name(self)
    }

    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
        Component::execute(self, inputs).await
    }
}

/// Fail with [`ComponentError::MissingInput`] naming every required input
/// that is absent or empty.
pub fn check_inputs(spec: &ComponentSpec, inputs: &Ports) -> Result<(), ComponentError> {
    let missing = spec.missing_inputs(inputs);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ComponentError::MissingInput(missing.join(", ")))
    }
}

/// Check required inputs, then execute the component.
#[instrument(skip_all, fields(component = component.name()))]
pub async fn run_component(
    component: &dyn DynComponent,
    inputs: &Ports,
) -> Result<Ports, ComponentError> {
    check_inputs(component.spec(), inputs)?;
    let outputs = component.execute(inputs).await?;
    debug!(outputs = outputs.len(), "component finished");
    Ok(outputs)
}
