//! Dependency graph over obligations.
//!
//! Records "must be placed no later than" edges from a dependent event to
//! its prerequisites. Every edge addition is validated by a reachability
//! search so the graph can never hold a cycle; `find_cycle` re-checks a
//! graph that arrived over the wire.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};
use crate::models::Event;

/// Directed acyclic "must-precede" relation, keyed by event id.
///
/// `BTreeMap`/`BTreeSet` storage keeps iteration order deterministic, which
/// keeps placement order deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `dependent` must not be placed before `prerequisite`.
    ///
    /// Fails with `CircularDependency` when the edge would close a cycle —
    /// that is, when `dependent` is already reachable from `prerequisite`
    /// over existing edges (the self-edge included). The graph is unchanged
    /// on failure. Duplicate edges collapse under set semantics.
    pub fn add_dependency(
        &mut self,
        dependent: impl Into<String>,
        prerequisite: impl Into<String>,
    ) -> ScheduleResult<()> {
        let dependent = dependent.into();
        let prerequisite = prerequisite.into();

        if dependent == prerequisite || self.reaches(&prerequisite, &dependent) {
            return Err(ScheduleError::CircularDependency {
                dependent,
                prerequisite,
            });
        }

        self.edges.entry(dependent).or_default().insert(prerequisite);
        Ok(())
    }

    /// Prerequisites recorded for `id`, in deterministic order.
    pub fn prerequisites<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges
            .get(id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// All (dependent, prerequisite) edges in deterministic order.
    pub fn iter_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges
            .iter()
            .flat_map(|(dep, prereqs)| prereqs.iter().map(move |p| (dep.as_str(), p.as_str())))
    }

    /// Whether any edges are recorded.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Whether `target` is reachable from `start` over prerequisite edges.
    fn reaches(&self, start: &str, target: &str) -> bool {
        let mut stack = vec![start];
        let mut visited: BTreeSet<&str> = BTreeSet::new();

        while let Some(node) = stack.pop() {
            if node == target {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            if let Some(prereqs) = self.edges.get(node) {
                stack.extend(prereqs.iter().map(String::as_str));
            }
        }
        false
    }

    /// Finds a cycle in the graph, if any, as one of its (dependent,
    /// prerequisite) edges.
    ///
    /// Normally never fires — `add_dependency` rejects cycles up front —
    /// but a graph reconstructed from the wire is re-checked with this.
    pub fn find_cycle(&self) -> Option<(String, String)> {
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut in_stack: BTreeSet<&str> = BTreeSet::new();

        for node in self.edges.keys() {
            if !visited.contains(node.as_str()) {
                if let Some(edge) = self.cycle_dfs(node, &mut visited, &mut in_stack) {
                    return Some(edge);
                }
            }
        }
        None
    }

    fn cycle_dfs<'a>(
        &'a self,
        node: &'a str,
        visited: &mut BTreeSet<&'a str>,
        in_stack: &mut BTreeSet<&'a str>,
    ) -> Option<(String, String)> {
        visited.insert(node);
        in_stack.insert(node);

        if let Some(prereqs) = self.edges.get(node) {
            for next in prereqs {
                if in_stack.contains(next.as_str()) {
                    return Some((node.to_string(), next.clone()));
                }
                if !visited.contains(next.as_str()) {
                    if let Some(edge) = self.cycle_dfs(next, visited, in_stack) {
                        return Some(edge);
                    }
                }
            }
        }

        in_stack.remove(node);
        None
    }

    /// Fails with `CircularDependency` if the graph holds a cycle.
    pub fn validate_acyclic(&self) -> ScheduleResult<()> {
        match self.find_cycle() {
            Some((dependent, prerequisite)) => Err(ScheduleError::CircularDependency {
                dependent,
                prerequisite,
            }),
            None => Ok(()),
        }
    }

    /// Prerequisite-first ordering of `ids` (Kahn's algorithm over the
    /// induced subgraph).
    ///
    /// Ids tie-break lexicographically; the planner's strategies impose
    /// their own keys on top of the freedom this order leaves. Fails with
    /// `CircularDependency` if the induced subgraph holds a cycle.
    pub fn topological_order<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a str>,
    ) -> ScheduleResult<Vec<String>> {
        let ids: BTreeSet<&str> = ids.into_iter().collect();

        // In-degree = number of prerequisites inside the id set.
        let mut indegree: BTreeMap<&str, usize> = ids.iter().map(|&id| (id, 0)).collect();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for &id in &ids {
            for prereq in self.prerequisites(id) {
                if ids.contains(prereq) {
                    *indegree.get_mut(id).unwrap() += 1;
                    dependents.entry(prereq).or_default().push(id);
                }
            }
        }

        let mut ready: BTreeSet<&str> = indegree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut order = Vec::with_capacity(ids.len());

        while let Some(id) = ready.pop_first() {
            order.push(id.to_string());
            if let Some(deps) = dependents.get(id) {
                for &dep in deps {
                    let deg = indegree.get_mut(dep).unwrap();
                    *deg -= 1;
                    if *deg == 0 {
                        ready.insert(dep);
                    }
                }
            }
        }

        if order.len() != ids.len() {
            // Some id never reached in-degree zero: a cycle within the set.
            return self.validate_acyclic().map(|_| order);
        }
        Ok(order)
    }

    /// Exports the graph keyed by display name, the shape the persistence
    /// boundary speaks.
    ///
    /// Name keying is a compatibility shim: two events sharing a name
    /// collapse onto one key. Ids are the primary identity everywhere else.
    pub fn to_name_map(&self, events: &[Event]) -> HashMap<String, Vec<String>> {
        let names: HashMap<&str, &str> = events.iter().map(|e| (e.id(), e.name())).collect();
        let resolve = |id: &str| names.get(id).map(|&n| n.to_string());

        let mut map = HashMap::new();
        for (dependent, prereqs) in &self.edges {
            if let Some(dep_name) = resolve(dependent) {
                let prereq_names: Vec<String> =
                    prereqs.iter().filter_map(|p| resolve(p)).collect();
                map.insert(dep_name, prereq_names);
            }
        }
        map
    }

    /// Rebuilds a graph from the name-keyed wire shape.
    ///
    /// Fails with `UnknownEvent` when a name resolves to no event in
    /// `events`, and with `CircularDependency` when the mapping holds a
    /// cycle.
    pub fn from_name_map(
        map: &HashMap<String, Vec<String>>,
        events: &[Event],
    ) -> ScheduleResult<Self> {
        let ids: HashMap<&str, &str> = events.iter().map(|e| (e.name(), e.id())).collect();
        let resolve = |name: &str| -> ScheduleResult<&str> {
            ids.get(name)
                .copied()
                .ok_or_else(|| ScheduleError::UnknownEvent { id: name.into() })
        };

        let mut graph = Self::new();
        // Deterministic insertion order regardless of HashMap iteration.
        let mut entries: Vec<(&String, &Vec<String>)> = map.iter().collect();
        entries.sort();
        for (dependent, prereqs) in entries {
            let dep_id = resolve(dependent)?;
            for prereq in prereqs {
                graph.add_dependency(dep_id, resolve(prereq)?)?;
            }
        }
        Ok(graph)
    }
}
