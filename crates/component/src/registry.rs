use std::collections::HashMap;
use std::sync::Arc;

use twilink_core::{ComponentSpec, Ports};

use crate::component::{DynComponent, run_component};
use crate::error::ComponentError;

/// A registry that maps component names to their implementations.
///
/// Built once at startup, then shared immutably.
pub struct ComponentRegistry {
    components: HashMap<String, Arc<dyn DynComponent>>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
        }
    }

    /// Register a component under its spec name, replacing any existing one.
    pub fn register(&mut self, component: Arc<dyn DynComponent>) {
        self.components
            .insert(component.name().to_owned(), component);
    }

    /// Look up a component by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn DynComponent>> {
        self.components.get(name).cloned()
    }

    /// Return a sorted list of all registered component names.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Specs of all registered components, sorted by name.
    pub fn specs(&self) -> Vec<&'static ComponentSpec> {
        let mut specs: Vec<_> = self.components.values().map(|c| c.spec()).collect();
        specs.sort_unstable_by_key(|s| s.name);
        specs
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Look up a component, check its required inputs, and execute it.
    pub async fn run(&self, name: &str, inputs: &Ports) -> Result<Ports, ComponentError> {
        let component = self
            .get(name)
            .ok_or_else(|| ComponentError::NotFound(name.to_owned()))?;
        run_component(component.as_ref(), inputs).await
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use twilink_core::PortSpec;

    use super::*;
    use crate::component::Component;

    static STUB_A: ComponentSpec = ComponentSpec {
        name: "stub_a",
        description: "",
        inputs: &[PortSpec::required("x", "")],
        outputs: &[PortSpec::optional("x", "")],
    };

    static STUB_B: ComponentSpec = ComponentSpec {
        name: "stub_b",
        description: "",
        inputs: &[],
        outputs: &[],
    };

    struct Stub(&'static ComponentSpec);

    impl Component for Stub {
        fn spec(&self) -> &'static ComponentSpec {
            self.0
        }

        async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
            Ok(inputs.clone())
        }
    }

    #[test]
    fn empty_registry() {
        let reg = ComponentRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
        assert!(reg.list().is_empty());
    }

    #[test]
    fn register_and_list_sorted() {
        let mut reg = ComponentRegistry::new();
        reg.register(Arc::new(Stub(&STUB_B)));
        reg.register(Arc::new(Stub(&STUB_A)));
        assert_eq!(reg.list(), vec!["stub_a", "stub_b"]);
        assert_eq!(reg.specs()[0].name, "stub_a");
        assert!(reg.get("stub_c").is_none());
    }

    #[test]
    fn register_replaces_existing() {
        let mut reg = ComponentRegistry::new();
        reg.register(Arc::new(Stub(&STUB_A)));
        reg.register(Arc::new(Stub(&STUB_A)));
        assert_eq!(reg.len(), 1);
    }

    #[tokio::test]
    async fn run_through_registry() {
        let mut reg = ComponentRegistry::new();
        reg.register(Arc::new(Stub(&STUB_A)));
        let out = reg
            .run("stub_a", &Ports::new().with("x", "1"))
            .await
            .unwrap();
        assert_eq!(out.string("x").unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn run_unknown_component() {
        let reg = ComponentRegistry::new();
        let err = reg.run("nope", &Ports::new()).await.unwrap_err();
        assert!(matches!(err, ComponentError::NotFound(_)));
    }

    #[tokio::test]
    async fn run_checks_required_inputs() {
        let mut reg = ComponentRegistry::new();
        reg.register(Arc::new(Stub(&STUB_A)));
        let err = reg.run("stub_a", &Ports::new()).await.unwrap_err();
        assert!(matches!(err, ComponentError::MissingInput(_)));
    }
}
