//! The validation engine (`spec.md` §2/§4.3–§4.6): owns `ValidationState`,
//! drives the per-shape evaluation loop, and registers targets as valid or
//! violated.

pub mod interleave;
pub mod report;
pub mod retrieval;
pub mod saturate;
pub mod state;

use std::collections::HashMap;
use std::time::Instant;

use crate::config::Config;
use crate::endpoint::Endpoint;
use crate::err::Result;
use crate::model::query::Query;
use crate::model::shape::{Schema, ShapeId};
use crate::planner::{QueryPlanner, TraversalPlanner, VariableGenerator};
use crate::stats::ValidationStats;
use report::ValidationReport;
use state::ValidationState;

/// A shape's constraint queries, materialized once before validation begins
/// and never mutated afterward.
#[derive(Debug, Clone, Default)]
pub struct ShapeQueries {
    pub target: Option<Query>,
    pub min: Option<Query>,
    pub max: Vec<Query>,
    pub disjunction: Option<Query>,
}

pub struct ValidationEngine {
    schema: Schema,
    endpoint: Endpoint,
    config: Config,
    state: ValidationState,
    stats: ValidationStats,
    queries: HashMap<ShapeId, ShapeQueries>,
}

impl ValidationEngine {
    pub fn new(schema: Schema, endpoint: Endpoint, config: Config) -> Self {
        let mut variables = VariableGenerator::new();
        let mut queries = HashMap::with_capacity(schema.len());
        for id in schema.ids() {
            let shape = schema.get(id);
            queries.insert(
                id,
                ShapeQueries {
                    target: QueryPlanner::target_query(shape),
                    min: QueryPlanner::min_query(shape, &mut variables),
                    max: QueryPlanner::max_queries(shape, &mut variables),
                    disjunction: QueryPlanner::disjunction_query(shape, &mut variables),
                },
            );
        }
        ValidationEngine {
            schema,
            endpoint,
            config,
            state: ValidationState::new(),
            stats: ValidationStats::new(),
            queries,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn stats(&self) -> &ValidationStats {
        &self.stats
    }

    /// Drives the full evaluation loop: TraversalPlanner order, then for
    /// each shape: target retrieval, interleave, saturate. On termination,
    /// any target left unclassified is recorded as valid (closed-world
    /// default, `spec.md` §4.5).
    pub fn exec(&mut self) -> Result<ValidationReport> {
        let order = TraversalPlanner::plan(&self.schema, self.config.graph_traversal, &self.config.heuristics);
        log::info!("evaluation order: {} shape(s)", order.len());

        for shape_id in order {
            self.validate_shape(shape_id)?;
            self.state.visited_shapes.insert(shape_id);
        }

        self.finalize_remaining_targets();
        self.stats.record_rule_numbers(self.state.rule_number, self.state.total_rule_number);
        for shape in self.schema.iter() {
            for _ in &shape.targets.valid {
                self.stats.record_classification(true);
            }
            for _ in &shape.targets.violated {
                self.stats.record_classification(false);
            }
        }

        Ok(ValidationReport::from_schema(&self.schema))
    }

    fn validate_shape(&mut self, shape_id: ShapeId) -> Result<()> {
        let shape_name = self.schema.get(shape_id).name.clone();
        if !self.schema.get(shape_id).has_target_selector() {
            return Ok(());
        }

        let queries = self
            .queries
            .get(&shape_id)
            .cloned()
            .expect("queries are precomputed for every shape during ValidationEngine::new");
        let Some(target_query) = &queries.target else {
            return Ok(());
        };

        let outcome = retrieval::retrieve_next_targets(
            &self.schema,
            &self.endpoint,
            &mut self.state,
            shape_id,
            target_query,
            queries.disjunction.as_ref(),
            self.config.selective,
            self.config.max_split_size,
        )?;
        self.stats.record_query();

        let shape_rule = QueryPlanner::shape_rule_pattern(
            self.schema.get(shape_id),
            queries.min.as_ref().map(|q| q.id.as_str()),
            &queries.max.iter().map(|q| q.id.clone()).collect::<Vec<_>>(),
        );

        let interleave_start = Instant::now();
        let mut constraint_queries: Vec<&Query> = Vec::new();
        if let Some(min) = &queries.min {
            constraint_queries.push(min);
        }
        constraint_queries.extend(queries.max.iter());

        for query in &constraint_queries {
            interleave::interleave_query(&self.schema, &self.endpoint, &mut self.state, shape_id, query, &shape_rule)?;
            self.stats.record_query();
        }
        interleave::synthesize_defensive_rules(&mut self.state, shape_id, &shape_rule, &outcome.pending);
        let interleave_elapsed = interleave_start.elapsed();

        // Exposes this shape's own classification predicate to the atoms
        // other shapes ground against it (`shape_rule_pattern`'s head). Must
        // happen after the defensive rules are synthesized so this shape's
        // own still-pending targets have a rule_map entry before
        // `negate_unmatchable_heads` can treat the predicate as settled.
        self.state.register_predicate(format!("shape_{}", shape_id.0), shape_id);

        let saturate_start = Instant::now();
        saturate::saturate(&mut self.state);
        let saturate_elapsed = saturate_start.elapsed();

        self.stats.record_shape_timing(shape_name, interleave_elapsed, saturate_elapsed);
        self.sync_shape_targets(shape_id);

        Ok(())
    }

    /// Copies the shape-state's registered classifications into the
    /// owning `Shape.targets` field for the report writer and CLI output.
    fn sync_shape_targets(&mut self, shape_id: ShapeId) {
        if let Some(shape_state) = self.state.shape_state_ref(shape_id) {
            let valid: Vec<String> = shape_state.registered_targets.valid.iter().cloned().collect();
            let violated: Vec<String> = shape_state.registered_targets.violated.iter().cloned().collect();
            let shape = self.schema.get_mut(shape_id);
            for target in valid {
                shape.targets.register_valid(target);
            }
            for target in violated {
                shape.targets.register_violated(target);
            }
        }
    }

    /// After the last shape's saturation, any target still in
    /// `remaining_targets` is recorded as valid (`spec.md` §4.5/§7 totality
    /// guarantee).
    fn finalize_remaining_targets(&mut self) {
        let leftovers: Vec<(ShapeId, String)> = self
            .state
            .remaining_targets
            .iter()
            .filter_map(|atom| {
                let shape_id = atom.predicate.strip_prefix("shape_")?.parse::<usize>().ok()?;
                Some((ShapeId(shape_id), atom.individual.clone()))
            })
            .collect();
        for (shape_id, target) in leftovers {
            self.state.register_target(shape_id, &target, true);
        }
        self.sync_all_targets();
    }

    fn sync_all_targets(&mut self) {
        let ids: Vec<ShapeId> = self.schema.ids().collect();
        for id in ids {
            self.sync_shape_targets(id);
        }
    }
}
