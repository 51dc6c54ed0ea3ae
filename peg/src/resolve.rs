use std::collections::HashMap;

use cranelift_entity::EntitySet;
use log::debug;
use parsegen::{Graph, NodeId, NodeKind};

use crate::error::Error;
use crate::parser::Rule;

/// Point every reference in the grammar at the rule it names. Returns the
/// start rule.
///
/// Rules are walked starting from the first one, so the start rule is
/// resolved first. Every node is visited once, cycles through references
/// included.
pub fn resolve(graph: &mut Graph, rules: &[Rule]) -> Result<NodeId, Error> {
    let root = rules.first().ok_or(Error::EmptyGrammar)?.node;
    let env: HashMap<&str, NodeId> = rules.iter().map(|r| (r.name.as_str(), r.node)).collect();

    let mut visited = EntitySet::new();
    for rule in rules {
        resolve_from(graph, rule.node, &env, &mut visited)?;
    }
    Ok(root)
}

fn resolve_from(
    graph: &mut Graph,
    start: NodeId,
    env: &HashMap<&str, NodeId>,
    visited: &mut EntitySet<NodeId>,
) -> Result<(), Error> {
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if visited.contains(id) {
            continue;
        }
        visited.insert(id);

        let node = &graph[id];
        match &node.kind {
            NodeKind::Reference {
                resolved: Some(target),
                ..
            } => stack.push(*target),
            NodeKind::Reference {
                target,
                resolved: None,
            } => {
                let resolved = match env.get(target.as_str()) {
                    Some(&resolved) => resolved,
                    None => {
                        return Err(Error::UnresolvedRule {
                            name: target.clone(),
                            referenced_by: node.name.clone(),
                        })
                    }
                };
                debug!("resolved {} -> {}", node.name, target);
                graph.resolve(id, resolved);
                stack.push(resolved);
            }
            _ => stack.extend(graph.children(id).into_iter().rev()),
        }
    }
    Ok(())
}
