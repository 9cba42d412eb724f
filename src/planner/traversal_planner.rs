//! Seed selection and graph linearization (`spec.md` §4.2), grounded in
//! `original_source/TravSHACL/core/GraphTraversal.py`.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::shape::{Schema, ShapeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphTraversal {
    Bfs,
    Dfs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegreeHeuristic {
    In,
    Out,
    InOut,
    OutIn,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertiesHeuristic {
    Small,
    Big,
    None,
}

/// The `--heuristics` record, applied in fixed precedence: `target`, then
/// `degree`, then `properties`.
#[derive(Debug, Clone)]
pub struct Heuristics {
    pub target: bool,
    pub degree: DegreeHeuristic,
    pub properties: PropertiesHeuristic,
}

impl Default for Heuristics {
    fn default() -> Self {
        Heuristics {
            target: false,
            degree: DegreeHeuristic::None,
            properties: PropertiesHeuristic::None,
        }
    }
}

pub struct TraversalPlanner;

impl TraversalPlanner {
    /// Picks a seed and linearizes the whole schema into an evaluation
    /// order, restarting from an arbitrary remaining shape whenever the
    /// graph is disconnected, until every shape appears exactly once.
    pub fn plan(schema: &Schema, traversal: GraphTraversal, heuristics: &Heuristics) -> Vec<ShapeId> {
        if schema.is_empty() {
            return Vec::new();
        }

        let forward = Self::forward_edges(schema);
        let reverse = Self::reverse_edges(&forward);

        let mut order = Vec::with_capacity(schema.len());
        let mut visited: HashSet<ShapeId> = HashSet::new();

        let seed = Self::select_seed(schema, heuristics);
        Self::traverse_component(seed, &forward, &reverse, schema.len(), traversal, &mut order, &mut visited);

        // Disconnected components: restart from the lowest-id unvisited shape.
        for id in schema.ids() {
            if !visited.contains(&id) {
                Self::traverse_component(id, &forward, &reverse, schema.len(), traversal, &mut order, &mut visited);
            }
        }

        order
    }

    fn forward_edges(schema: &Schema) -> HashMap<ShapeId, Vec<ShapeId>> {
        let mut edges = HashMap::new();
        for shape in schema.iter() {
            let mut targets: Vec<ShapeId> = shape.referenced_shapes.keys().copied().collect();
            targets.sort_by_key(|id| id.0);
            edges.insert(shape.id, targets);
        }
        edges
    }

    fn reverse_edges(forward: &HashMap<ShapeId, Vec<ShapeId>>) -> HashMap<ShapeId, Vec<ShapeId>> {
        let mut reverse: HashMap<ShapeId, Vec<ShapeId>> = HashMap::new();
        for (&from, targets) in forward {
            for &to in targets {
                reverse.entry(to).or_default().push(from);
            }
        }
        for targets in reverse.values_mut() {
            targets.sort_by_key(|id| id.0);
        }
        reverse
    }

    fn select_seed(schema: &Schema, heuristics: &Heuristics) -> ShapeId {
        let mut candidates: Vec<ShapeId> = schema.ids().collect();

        if heuristics.target {
            let filtered: Vec<ShapeId> = candidates
                .iter()
                .copied()
                .filter(|&id| schema.get(id).has_target_selector())
                .collect();
            if !filtered.is_empty() {
                candidates = filtered;
            }
        }

        candidates = match heuristics.degree {
            DegreeHeuristic::None => candidates,
            DegreeHeuristic::In => Self::keep_max(schema, candidates, |s| s.in_degree),
            DegreeHeuristic::Out => Self::keep_max(schema, candidates, |s| s.out_degree),
            DegreeHeuristic::InOut => {
                let by_in = Self::keep_max(schema, candidates, |s| s.in_degree);
                Self::keep_max(schema, by_in, |s| s.out_degree)
            }
            DegreeHeuristic::OutIn => {
                let by_out = Self::keep_max(schema, candidates, |s| s.out_degree);
                Self::keep_max(schema, by_out, |s| s.in_degree)
            }
        };

        candidates = match heuristics.properties {
            PropertiesHeuristic::None => candidates,
            PropertiesHeuristic::Small => Self::keep_min(schema, candidates, |s| s.constraints.len()),
            PropertiesHeuristic::Big => Self::keep_max(schema, candidates, |s| s.constraints.len()),
        };

        // Ties are broken by the parser's insertion order.
        candidates.sort_by_key(|id| id.0);
        candidates.into_iter().next().unwrap_or(ShapeId(0))
    }

    fn keep_max<F, K>(schema: &Schema, candidates: Vec<ShapeId>, key: F) -> Vec<ShapeId>
    where
        F: Fn(&crate::model::shape::Shape) -> K,
        K: Ord,
    {
        let best = candidates.iter().map(|&id| key(schema.get(id))).max();
        match best {
            Some(best) => candidates
                .into_iter()
                .filter(|&id| key(schema.get(id)) == best)
                .collect(),
            None => candidates,
        }
    }

    fn keep_min<F, K>(schema: &Schema, candidates: Vec<ShapeId>, key: F) -> Vec<ShapeId>
    where
        F: Fn(&crate::model::shape::Shape) -> K,
        K: Ord,
    {
        let best = candidates.iter().map(|&id| key(schema.get(id))).min();
        match best {
            Some(best) => candidates
                .into_iter()
                .filter(|&id| key(schema.get(id)) == best)
                .collect(),
            None => candidates,
        }
    }

    fn traverse_component(
        seed: ShapeId,
        forward: &HashMap<ShapeId, Vec<ShapeId>>,
        reverse: &HashMap<ShapeId, Vec<ShapeId>>,
        total: usize,
        traversal: GraphTraversal,
        order: &mut Vec<ShapeId>,
        visited: &mut HashSet<ShapeId>,
    ) {
        if visited.contains(&seed) {
            return;
        }
        match traversal {
            GraphTraversal::Bfs => Self::bfs(seed, forward, reverse, order, visited),
            GraphTraversal::Dfs => Self::dfs(seed, forward, reverse, total, order, visited),
        }
    }

    fn bfs(
        seed: ShapeId,
        forward: &HashMap<ShapeId, Vec<ShapeId>>,
        reverse: &HashMap<ShapeId, Vec<ShapeId>>,
        order: &mut Vec<ShapeId>,
        visited: &mut HashSet<ShapeId>,
    ) {
        let mut queue = VecDeque::new();
        queue.push_back(seed);
        visited.insert(seed);
        while let Some(current) = queue.pop_front() {
            order.push(current);
            let mut neighbours: Vec<ShapeId> = forward.get(&current).cloned().unwrap_or_default();
            neighbours.extend(reverse.get(&current).cloned().unwrap_or_default());
            for neighbour in neighbours {
                if visited.insert(neighbour) {
                    queue.push_back(neighbour);
                }
            }
        }
    }

    fn dfs(
        seed: ShapeId,
        forward: &HashMap<ShapeId, Vec<ShapeId>>,
        reverse: &HashMap<ShapeId, Vec<ShapeId>>,
        total: usize,
        order: &mut Vec<ShapeId>,
        visited: &mut HashSet<ShapeId>,
    ) {
        visited.insert(seed);
        order.push(seed);

        if let Some(forward_neighbours) = forward.get(&seed) {
            for &neighbour in forward_neighbours {
                if !visited.contains(&neighbour) {
                    Self::dfs(neighbour, forward, reverse, total, order, visited);
                }
            }
        }

        // Falls back to reverse edges only while shapes remain unvisited.
        if visited.len() < total {
            if let Some(reverse_neighbours) = reverse.get(&seed) {
                for &neighbour in reverse_neighbours {
                    if !visited.contains(&neighbour) {
                        Self::dfs(neighbour, forward, reverse, total, order, visited);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::path::Path;

    fn linear_schema() -> Schema {
        let mut schema = Schema::new();
        let a = schema.insert("A");
        let b = schema.insert("B");
        let c = schema.insert("C");
        schema.get_mut(a).referenced_shapes.insert(b, Path::forward("p"));
        schema.get_mut(b).referenced_shapes.insert(c, Path::forward("q"));
        schema.recompute_degrees();
        schema
    }

    #[test]
    fn bfs_and_dfs_both_cover_every_shape_exactly_once() {
        let schema = linear_schema();
        let bfs_order = TraversalPlanner::plan(&schema, GraphTraversal::Bfs, &Heuristics::default());
        let dfs_order = TraversalPlanner::plan(&schema, GraphTraversal::Dfs, &Heuristics::default());
        assert_eq!(bfs_order.len(), 3);
        assert_eq!(dfs_order.len(), 3);
        let mut sorted_bfs = bfs_order.clone();
        sorted_bfs.sort_by_key(|id| id.0);
        assert_eq!(sorted_bfs, vec![ShapeId(0), ShapeId(1), ShapeId(2)]);
    }

    #[test]
    fn disconnected_components_are_all_visited() {
        let mut schema = Schema::new();
        schema.insert("A");
        schema.insert("B");
        schema.recompute_degrees();
        let order = TraversalPlanner::plan(&schema, GraphTraversal::Bfs, &Heuristics::default());
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn target_heuristic_prefers_shapes_with_a_target_selector() {
        let mut schema = Schema::new();
        let a = schema.insert("A");
        let b = schema.insert("B");
        schema.get_mut(b).target_def = Some("?x a :B .".to_string());
        schema.recompute_degrees();
        let heuristics = Heuristics {
            target: true,
            ..Heuristics::default()
        };
        let seed = TraversalPlanner::select_seed(&schema, &heuristics);
        assert_eq!(seed, b);
        let _ = a;
    }
}
