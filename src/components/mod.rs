//! Component registry en evaluatie-logica.

use std::collections::{BTreeMap, HashMap};

use crate::geom::MeshError;
use crate::graph::node::{MetaMap, Node};
use crate::graph::value::{Value, ValueError};

pub mod coerce;
pub mod project;

pub use project::ComponentKind;

/// Output-map van een component: pinnickname → waarde.
pub type OutputMap = BTreeMap<String, Value>;

/// Fouttype voor component-evaluaties.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComponentError {
    /// Een generieke fout met een bericht.
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Value(#[from] ValueError),
    /// De aangeleverde mesh kon niet worden opgebouwd.
    #[error("ongeldige mesh: {0}")]
    Mesh(#[from] MeshError),
}

impl ComponentError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Resultaat van een component-executie.
pub type ComponentResult = Result<OutputMap, ComponentError>;

/// Trait die alle componentimplementaties dienen te implementeren.
pub trait Component {
    fn evaluate(&self, inputs: &[Value], meta: &MetaMap) -> ComponentResult;
}

/// Registry die componentimplementaties opzoekt op GUID of naam.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    by_guid: HashMap<String, ComponentKind>,
    by_name: HashMap<String, ComponentKind>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        for registration in project::REGISTRATIONS {
            for guid in registration.guids {
                registry.register_guid(guid, registration.kind);
            }
            registry.register_names(registration.names, registration.kind);
        }
        registry
    }
}

impl ComponentRegistry {
    /// Lege registry zonder componenten.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_guid: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn register_guid(&mut self, guid: &str, kind: ComponentKind) {
        self.by_guid.insert(normalize_guid(guid), kind);
    }

    pub fn register_names(&mut self, names: &[&str], kind: ComponentKind) {
        for name in names {
            self.by_name.insert(normalize_name(name), kind);
        }
    }

    #[must_use]
    pub fn lookup_guid(&self, guid: &str) -> Option<ComponentKind> {
        self.by_guid.get(&normalize_guid(guid)).copied()
    }

    #[must_use]
    pub fn lookup_name(&self, name: &str) -> Option<ComponentKind> {
        self.by_name.get(&normalize_name(name)).copied()
    }

    /// Zoek het component van een node, eerst op GUID en daarna op naam.
    #[must_use]
    pub fn resolve(&self, node: &Node) -> Option<ComponentKind> {
        node.guid
            .as_deref()
            .and_then(|guid| self.lookup_guid(guid))
            .or_else(|| node.name.as_deref().and_then(|name| self.lookup_name(name)))
    }
}

fn normalize_guid(guid: &str) -> String {
    guid.chars()
        .filter(|c| *c != '{' && *c != '}')
        .flat_map(char::to_lowercase)
        .collect()
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
