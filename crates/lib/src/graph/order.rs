//! Static verification of a build's declaration trace.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use crate::resource::{ResourceId, ResourceKind, ResourceNode};

use super::BuildStage;

/// A resource was referenced before (or without) being declared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyOrderError {
  #[error("cannot reach stage {attempted} from {current}")]
  OutOfSequence { current: BuildStage, attempted: BuildStage },

  #[error("{kind} '{name}' references {missing}, which was not declared in this build")]
  UndeclaredReference {
    kind: ResourceKind,
    name: String,
    missing: ResourceId,
  },

  #[error("'{name}' depends on {dependency}, which was declared after it")]
  TraceViolation { name: String, dependency: ResourceId },

  #[error("identifier {0} was assigned to more than one node")]
  DuplicateIdentifier(ResourceId),

  #[error("dependency cycle detected")]
  Cycle,
}

/// Check that every node only depends on nodes declared before it.
///
/// Builds a dependency graph over the trace. Cycles are reported before
/// ordering violations.
pub fn verify_declaration_order(nodes: &[ResourceNode]) -> Result<(), DependencyOrderError> {
  let mut graph: DiGraph<usize, ()> = DiGraph::new();
  let mut positions: HashMap<&ResourceId, (usize, NodeIndex)> = HashMap::new();

  for (position, node) in nodes.iter().enumerate() {
    let idx = graph.add_node(position);
    if positions.insert(&node.id, (position, idx)).is_some() {
      return Err(DependencyOrderError::DuplicateIdentifier(node.id.clone()));
    }
  }

  for node in nodes {
    let (_, node_idx) = positions[&node.id];
    for dep in &node.depends_on {
      let Some(&(_, dep_idx)) = positions.get(dep) else {
        return Err(DependencyOrderError::UndeclaredReference {
          kind: node.kind,
          name: node.logical_name.clone(),
          missing: dep.clone(),
        });
      };

      // Edge from dependency to dependent
      graph.add_edge(dep_idx, node_idx, ());
    }
  }

  toposort(&graph, None).map_err(|_| DependencyOrderError::Cycle)?;

  for (position, node) in nodes.iter().enumerate() {
    for dep in &node.depends_on {
      let (dep_position, _) = positions[dep];
      if dep_position >= position {
        return Err(DependencyOrderError::TraceViolation {
          name: node.logical_name.clone(),
          dependency: dep.clone(),
        });
      }
    }
  }

  Ok(())
}
