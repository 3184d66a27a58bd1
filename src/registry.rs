//! Startup-resolved registry of gateway definitions.
//!
//! Applications declare their tables once, at process start, and open
//! gateways by logical name afterwards. Resolution is a plain map lookup;
//! an unknown name is an error, never a dynamically constructed type.

use crate::config::GatewayConfig;
use crate::executor::Executor;
use crate::gateway::TableGateway;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

fn default_id_column() -> String {
    "id".to_string()
}

/// The declared shape of one gateway: everything `Registry::open` needs
/// to construct it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayDef {
    /// Table the gateway fronts
    pub table: String,
    /// Identity column used for dispatch and default updates
    #[serde(default = "default_id_column")]
    pub id_column: String,
    /// Override for the authorization capability key
    #[serde(default)]
    pub resource_id: Option<String>,
    /// Column carrying row ownership, when the table has one
    #[serde(default)]
    pub owner_column: Option<String>,
}

impl GatewayDef {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id_column: default_id_column(),
            resource_id: None,
            owner_column: None,
        }
    }

    pub fn id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = column.into();
        self
    }

    pub fn resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn owner_column(mut self, column: impl Into<String>) -> Self {
        self.owner_column = Some(column.into());
        self
    }
}

/// Registry error type
#[derive(Debug)]
pub enum RegistryError {
    /// No definition registered under the requested name
    Unknown(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Unknown(name) => {
                write!(f, "no gateway registered under `{name}`")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Logical name to [`GatewayDef`] map, built once at startup.
///
/// # Example
///
/// ```
/// use gatehouse::{GatewayDef, Registry};
///
/// let mut registry = Registry::new();
/// registry.register("users", GatewayDef::new("users").owner_column("user_id"));
/// assert!(registry.contains("users"));
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    defs: HashMap<String, GatewayDef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from loaded configuration
    pub fn from_config(config: &GatewayConfig) -> Self {
        let mut registry = Registry::new();
        for (name, def) in &config.tables {
            registry.register(name.clone(), def.clone());
        }
        registry
    }

    /// Register a definition under a logical name. Re-registering a name
    /// replaces the previous definition.
    pub fn register(&mut self, name: impl Into<String>, def: GatewayDef) {
        let name = name.into();
        log::debug!("registered gateway `{name}` for table `{}`", def.table);
        self.defs.insert(name, def);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Registered logical names, unordered
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    /// Construct the gateway registered under `name` over the given
    /// executor.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Unknown` when the name was never
    /// registered.
    pub fn open<E: Executor>(&self, name: &str, executor: E) -> Result<TableGateway<E>, RegistryError> {
        let def = self
            .defs
            .get(name)
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))?;
        let mut gateway = TableGateway::new(executor, def.table.as_str())
            .with_id_column(def.id_column.as_str());
        if let Some(resource_id) = &def.resource_id {
            gateway = gateway.with_resource_id(resource_id.as_str());
        }
        if let Some(owner_column) = &def.owner_column {
            gateway = gateway.with_owner_column(owner_column.as_str());
        }
        Ok(gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::test_helpers::MockExecutor;

    #[test]
    fn test_open_applies_the_definition() {
        let mut registry = Registry::new();
        registry.register(
            "users",
            GatewayDef::new("cms_users")
                .resource_id("cms.users")
                .owner_column("user_id"),
        );

        let mock = MockExecutor::new();
        let gateway = registry.open("users", &mock).unwrap();
        assert_eq!(gateway.table(), "cms_users");
        assert_eq!(gateway.resource_id(), "cms.users");

        let record = Record::new().with("user_id", 3);
        assert_eq!(gateway.owner_id(&record), Some(sea_query::Value::from(3)));
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        let registry = Registry::new();
        let mock = MockExecutor::new();
        let err = registry.open("missing", &mock).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_reregistering_replaces() {
        let mut registry = Registry::new();
        registry.register("users", GatewayDef::new("users_v1"));
        registry.register("users", GatewayDef::new("users_v2"));

        let mock = MockExecutor::new();
        let gateway = registry.open("users", &mock).unwrap();
        assert_eq!(gateway.table(), "users_v2");
        assert_eq!(registry.names().count(), 1);
    }
}
