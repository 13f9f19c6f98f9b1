use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::controller::Controller;

/// Container the router consults to resolve controllers and services.
///
/// Injected once at router construction; both lookups return `None` for
/// unknown names.
pub trait ServiceRegistry: Send + Sync {
    /// Resolve a controller by id.
    fn controller(&self, id: &str) -> Option<Arc<dyn Controller>>;

    /// Resolve a service by type name, for object-typed handler parameters.
    fn service(&self, type_name: &str) -> Option<Arc<dyn Any + Send + Sync>>;
}

/// HashMap-backed [`ServiceRegistry`].
///
/// Registration happens during application setup, before any router is built.
///
/// ```rust
/// use micro_router::handler::{Registry, Resource, ServiceRegistry};
/// use std::sync::Arc;
///
/// let mut registry = Registry::new();
/// registry.register_controller("Users", Arc::new(Resource::new("Users")));
/// registry.register_service("Clock", Arc::new(42_u64));
/// assert!(registry.controller("Users").is_some());
/// assert!(registry.service("Clock").is_some());
/// ```
#[derive(Default, Clone)]
pub struct Registry {
    controllers: HashMap<String, Arc<dyn Controller>>,
    services: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller under `id`.
    ///
    /// **IMPORTANT**: an existing controller with the same id is replaced.
    pub fn register_controller(&mut self, id: impl Into<String>, controller: Arc<dyn Controller>) {
        let id = id.into();
        if self.controllers.insert(id.clone(), controller).is_some() {
            debug!(controller_id = %id, "Replaced registered controller");
        }
    }

    /// Register a service under `type_name`, replacing any earlier one.
    pub fn register_service<T: Any + Send + Sync>(&mut self, type_name: impl Into<String>, service: Arc<T>) {
        self.services.insert(type_name.into(), service);
    }

    /// Registered controller ids, sorted.
    #[must_use]
    pub fn controller_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.controllers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl ServiceRegistry for Registry {
    fn controller(&self, id: &str) -> Option<Arc<dyn Controller>> {
        self.controllers.get(id).map(Arc::clone)
    }

    fn service(&self, type_name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.services.get(type_name).map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Resource;

    #[test]
    fn test_register_and_resolve() {
        let mut registry = Registry::new();
        registry.register_controller("Users", Arc::new(Resource::new("Users")));
        registry.register_controller("Posts", Arc::new(Resource::new("Posts")));
        registry.register_service("Greeting", Arc::new(String::from("hello")));

        assert_eq!(registry.controller_ids(), vec!["Posts", "Users"]);
        assert_eq!(
            registry.controller("Users").map(|c| c.name().to_string()),
            Some("Users".to_string())
        );
        assert!(registry.controller("Nope").is_none());

        let greeting = registry
            .service("Greeting")
            .and_then(|s| s.downcast::<String>().ok());
        assert_eq!(greeting.as_deref().map(String::as_str), Some("hello"));
    }

    #[test]
    fn test_register_controller_replaces() {
        let mut registry = Registry::new();
        registry.register_controller("Users", Arc::new(Resource::new("Old")));
        registry.register_controller("Users", Arc::new(Resource::new("New")));
        assert_eq!(
            registry.controller("Users").map(|c| c.name().to_string()),
            Some("New".to_string())
        );
    }
}
