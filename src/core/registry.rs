use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::core::agent::TaskAgent;

/// Lookup table from task-type identifier to the agent responsible for it.
///
/// An explicit object, not a process-wide singleton: it is constructed
/// once at startup, populated, and then only read during dispatch. Tests
/// build their own isolated registries.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn TaskAgent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent under its task type. Registering the same task
    /// type twice replaces the earlier agent.
    pub fn register(&mut self, agent: Arc<dyn TaskAgent>) {
        let task_type = agent.task_type().to_string();
        if self.agents.insert(task_type.clone(), agent).is_some() {
            warn!(task_type = %task_type, "replacing previously registered agent");
        }
    }

    pub fn get(&self, task_type: &str) -> Option<Arc<dyn TaskAgent>> {
        self.agents.get(task_type).cloned()
    }

    pub fn task_types(&self) -> Vec<&str> {
        self.agents.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::agent::JobAgent;
    use crate::core::backend::LoopbackBackend;
    use crate::core::bridge::TypeBridge;

    fn loopback_agent(task_type: &str) -> Arc<dyn TaskAgent> {
        Arc::new(JobAgent::new(
            task_type,
            LoopbackBackend::new(Duration::ZERO),
            LoopbackBackend::status_map(),
            TypeBridge::new(LoopbackBackend::native_types()),
        ))
    }

    #[test]
    fn lookup_routes_by_task_type() {
        let mut registry = AgentRegistry::new();
        registry.register(loopback_agent("alpha_task"));
        registry.register(loopback_agent("beta_task"));

        assert_eq!(registry.get("alpha_task").unwrap().task_type(), "alpha_task");
        assert_eq!(registry.get("beta_task").unwrap().task_type(), "beta_task");
        assert!(registry.get("gamma_task").is_none());
    }

    #[test]
    fn registering_a_task_type_twice_replaces_the_agent() {
        let mut registry = AgentRegistry::new();
        registry.register(loopback_agent("alpha_task"));
        registry.register(loopback_agent("alpha_task"));
        assert_eq!(registry.task_types().len(), 1);
    }

    #[test]
    fn registries_are_isolated_per_instance() {
        let mut a = AgentRegistry::new();
        a.register(loopback_agent("alpha_task"));
        let b = AgentRegistry::new();
        assert!(b.is_empty());
        assert!(b.get("alpha_task").is_none());
        assert!(!a.is_empty());
    }
}
