//! Evaluatie van projectienodes.
//!
//! Nodes zijn onafhankelijk van elkaar: elke node leest zijn eigen inputs en
//! meta, en er zijn geen verbindingen tussen nodes.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::components::project::SCHEMA;
use crate::components::{Component, ComponentError, ComponentRegistry, OutputMap};
use crate::graph::node::{Node, NodeId};
use crate::graph::value::Value;

/// Resultaat van een evaluatie-run.
#[derive(Debug, Default, Clone)]
pub struct EvaluationResult {
    /// Uitgangen per node.
    pub node_outputs: BTreeMap<NodeId, OutputMap>,
}

/// Fouttype voor evaluatieproblemen.
#[derive(Debug)]
pub enum EvaluationError {
    /// De node heeft geen bijbehorend component.
    ComponentNotFound {
        node_id: NodeId,
        guid: Option<String>,
        name: Option<String>,
    },
    /// Een vereiste input ontbreekt.
    MissingInput { node_id: NodeId, pin: String },
    /// Het component gaf een foutmelding tijdens evaluatie.
    ComponentFailed {
        node_id: NodeId,
        component: String,
        source: ComponentError,
    },
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ComponentNotFound {
                node_id,
                guid,
                name,
            } => write!(
                f,
                "geen component gevonden voor node {} (guid={:?}, name={:?})",
                node_id.0, guid, name
            ),
            Self::MissingInput { node_id, pin } => {
                write!(f, "node {} mist verplichte input `{pin}`", node_id.0)
            }
            Self::ComponentFailed {
                node_id,
                component,
                source,
            } => write!(
                f,
                "component `{component}` (node {}) faalde: {}",
                node_id.0, source
            ),
        }
    }
}

impl std::error::Error for EvaluationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ComponentFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Verzamel de inputs van een node in schemavolgorde. Ontbrekende optionele
/// pinnen worden als `Null` doorgegeven.
pub fn gather_inputs(node: &Node) -> Result<Vec<Value>, EvaluationError> {
    SCHEMA
        .inputs
        .iter()
        .map(|pin| match node.input(pin.nickname) {
            Some(value) => Ok(value.clone()),
            None if pin.optional => Ok(Value::Null),
            None => Err(EvaluationError::MissingInput {
                node_id: node.id,
                pin: pin.nickname.to_owned(),
            }),
        })
        .collect()
}

/// Evalueer één node zonder hem te wijzigen.
pub fn evaluate_node(node: &Node, registry: &ComponentRegistry) -> Result<OutputMap, EvaluationError> {
    let component = registry
        .resolve(node)
        .ok_or_else(|| EvaluationError::ComponentNotFound {
            node_id: node.id,
            guid: node.guid.clone(),
            name: node.name.clone(),
        })?;

    let inputs = gather_inputs(node)?;
    log::debug!("evalueer node {} als `{}`", node.id.0, component.name());

    component
        .evaluate(&inputs, &node.meta)
        .map_err(|error| EvaluationError::ComponentFailed {
            node_id: node.id,
            component: component.name().to_owned(),
            source: error,
        })
}

/// Evalueer een verzameling onafhankelijke nodes.
pub fn evaluate(nodes: &[Node], registry: &ComponentRegistry) -> Result<EvaluationResult, EvaluationError> {
    let node_outputs = evaluate_all(nodes, registry)?.into_iter().collect();
    Ok(EvaluationResult { node_outputs })
}

#[cfg(feature = "parallel")]
fn evaluate_all(
    nodes: &[Node],
    registry: &ComponentRegistry,
) -> Result<Vec<(NodeId, OutputMap)>, EvaluationError> {
    nodes
        .par_iter()
        .map(|node| evaluate_node(node, registry).map(|outputs| (node.id, outputs)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_all(
    nodes: &[Node],
    registry: &ComponentRegistry,
) -> Result<Vec<(NodeId, OutputMap)>, EvaluationError> {
    nodes
        .iter()
        .map(|node| evaluate_node(node, registry).map(|outputs| (node.id, outputs)))
        .collect()
}

/// Wijzig een input en verwijder de outputs die ervan afhangen.
pub fn set_input(node: &mut Node, pin: &str, value: Value) {
    for output in SCHEMA.affected_outputs(pin) {
        node.outputs.remove(output);
    }
    node.set_input(pin, value);
}

/// Evalueer een node en sla de outputs erop op.
pub fn update_node(node: &mut Node, registry: &ComponentRegistry) -> Result<(), EvaluationError> {
    let outputs = evaluate_node(node, registry)?;
    node.outputs = outputs;
    Ok(())
}
