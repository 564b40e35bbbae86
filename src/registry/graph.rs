//! Directed dependency graph between mocks
//!
//! Edges point from a mock to the mocks it depends on. Reverse lookups scan
//! the forward edges instead of keeping a second index in sync.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    edges: IndexMap<String, IndexSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    /// Replace all outgoing edges of `node`
    pub fn set_dependencies(&mut self, node: &str, dependencies: &[String]) {
        let targets = self.edges.entry(node.to_string()).or_default();
        targets.clear();
        targets.extend(dependencies.iter().cloned());
    }

    /// Remove `node` and its outgoing edges; edges pointing at it remain
    pub fn remove_node(&mut self, node: &str) {
        self.edges.shift_remove(node);
    }

    pub fn contains(&self, node: &str) -> bool {
        self.edges.contains_key(node)
    }

    pub fn dependencies(&self, node: &str) -> Vec<&str> {
        self.edges
            .get(node)
            .map(|targets| targets.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Nodes with an edge to `node`, in insertion order
    pub fn dependents(&self, node: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, targets)| targets.contains(node))
            .map(|(source, _)| source.as_str())
            .collect()
    }

    pub fn has_cycle(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// Find any cycle, returned as the path that closes it (`a -> b -> a`).
    ///
    /// Depth-first search tracking the current recursion stack.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        self.edges
            .keys()
            .find_map(|node| self.visit(node, &mut visited, &mut stack))
    }

    fn visit<'a>(
        &'a self,
        node: &'a str,
        visited: &mut HashSet<&'a str>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        if let Some(pos) = stack.iter().position(|n| *n == node) {
            let mut cycle: Vec<String> = stack[pos..].iter().map(|n| n.to_string()).collect();
            cycle.push(node.to_string());
            return Some(cycle);
        }
        if !visited.insert(node) {
            return None;
        }

        stack.push(node);
        let found = self
            .edges
            .get(node)
            .and_then(|targets| {
                targets
                    .iter()
                    .find_map(|next| self.visit(next, visited, stack))
            });
        stack.pop();
        found
    }

    /// The cycle that giving `node` these dependencies would close, if any.
    ///
    /// Only cycles through `node` are reported; the graph is not modified.
    pub fn would_create_cycle(&self, node: &str, dependencies: &[String]) -> Option<Vec<String>> {
        dependencies.iter().find_map(|dependency| {
            let mut path = self.path_between(dependency, node)?;
            path.insert(0, node.to_string());
            Some(path)
        })
    }

    /// A path `from -> ... -> to` along existing edges
    fn path_between(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        self.walk_to(from, to, &mut visited, &mut path)
            .then(|| path.into_iter().map(str::to_string).collect())
    }

    fn walk_to<'a>(
        &'a self,
        current: &'a str,
        target: &str,
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if visited.insert(current) {
            if let Some(targets) = self.edges.get(current) {
                for next in targets {
                    if self.walk_to(next, target, visited, path) {
                        return true;
                    }
                }
            }
        }
        path.pop();
        false
    }

    /// `node` followed by everything it transitively depends on, pre-order,
    /// each name once
    pub fn transitive_closure(&self, node: &str) -> Vec<String> {
        let mut seen = IndexSet::new();
        self.collect_preorder(node, &mut seen);
        seen.into_iter().map(str::to_string).collect()
    }

    fn collect_preorder<'a>(&'a self, node: &'a str, seen: &mut IndexSet<&'a str>) {
        if !seen.insert(node) {
            return;
        }
        if let Some(targets) = self.edges.get(node) {
            for next in targets {
                self.collect_preorder(next, seen);
            }
        }
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (node, targets) in edges {
            graph.set_dependencies(node, &deps(targets));
        }
        graph
    }

    #[test]
    fn acyclic_graph_has_no_cycle() {
        let graph = graph(&[("form", &["session", "toast"]), ("toast", &["theme"])]);

        assert!(!graph.has_cycle());
    }

    #[test]
    fn find_cycle_returns_closing_path() {
        let mut graph = graph(&[("a", &["b"]), ("b", &["c"])]);
        graph.add_edge("c", "a");

        assert_eq!(graph.find_cycle(), Some(deps(&["a", "b", "c", "a"])));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let graph = graph(&[("a", &["a"])]);

        assert_eq!(graph.find_cycle(), Some(deps(&["a", "a"])));
    }

    #[test]
    fn would_create_cycle_detects_back_edge_without_mutating() {
        let graph = graph(&[("a", &["b"]), ("b", &[])]);

        assert_eq!(
            graph.would_create_cycle("b", &deps(&["a"])),
            Some(deps(&["b", "a", "b"]))
        );
        assert_eq!(graph.would_create_cycle("b", &deps(&["c"])), None);
        assert!(graph.dependencies("b").is_empty());
    }

    #[test]
    fn would_create_cycle_follows_transitive_paths() {
        let graph = graph(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]);

        assert_eq!(
            graph.would_create_cycle("c", &deps(&["x", "a"])),
            Some(deps(&["c", "a", "b", "c"]))
        );
    }

    #[test]
    fn would_create_cycle_ignores_unrelated_existing_cycles() {
        let graph = graph(&[("a", &["b"]), ("b", &["a"])]);

        assert_eq!(graph.would_create_cycle("c", &deps(&["a"])), None);
    }

    #[test]
    fn dependents_are_computed_from_forward_edges() {
        let graph = graph(&[
            ("form", &["session", "toast"]),
            ("toast", &["theme"]),
            ("modal", &["theme"]),
        ]);

        assert_eq!(graph.dependents("theme"), vec!["toast", "modal"]);
        assert_eq!(graph.dependents("session"), vec!["form"]);
        assert!(graph.dependents("form").is_empty());
    }

    #[test]
    fn transitive_closure_is_preorder_without_duplicates() {
        let graph = graph(&[
            ("form", &["toast", "session"]),
            ("toast", &["theme"]),
            ("session", &["theme"]),
        ]);

        assert_eq!(
            graph.transitive_closure("form"),
            deps(&["form", "toast", "theme", "session"])
        );
    }

    #[test]
    fn transitive_closure_terminates_on_cycles() {
        let graph = graph(&[("a", &["b"]), ("b", &["a"])]);

        assert_eq!(graph.transitive_closure("a"), deps(&["a", "b"]));
    }

    #[test]
    fn set_dependencies_replaces_previous_edges() {
        let mut graph = graph(&[("a", &["b", "c"])]);

        graph.set_dependencies("a", &deps(&["d"]));

        assert_eq!(graph.dependencies("a"), vec!["d"]);
        assert!(graph.dependents("b").is_empty());
    }

    #[test]
    fn remove_node_keeps_incoming_edges() {
        let mut graph = graph(&[("a", &["b"]), ("b", &["c"])]);

        graph.remove_node("b");

        assert!(!graph.contains("b"));
        assert_eq!(graph.dependencies("a"), vec!["b"]);
        assert_eq!(graph.len(), 1);
    }
}
