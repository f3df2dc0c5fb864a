// src/graph.rs

//! Suite dependency graph and fetch-set expansion
//!
//! Edges are declared between architecture-independent [`SuiteKey`]s. When a
//! target is expanded, each declared dependency receives the target's
//! architecture.
//!
//! Expansion is single-hop: the dependencies of a dependency are not followed.
//! Multi-level chains are written out explicitly in the configuration, either
//! by listing every suite of the chain under the requested target or by
//! requesting the intermediate suite as a target of its own.

use crate::target::{SuiteKey, Target};
use std::collections::{BTreeSet, HashMap};

/// Read-only mapping from a suite to the suites it depends on
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: HashMap<SuiteKey, Vec<SuiteKey>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the dependencies of `suite`
    ///
    /// Duplicates are dropped, keeping the first occurrence, so background
    /// order follows the declaration.
    pub fn insert(&mut self, suite: SuiteKey, dependencies: impl IntoIterator<Item = SuiteKey>) {
        let entry = self.edges.entry(suite).or_default();
        for dep in dependencies {
            if !entry.contains(&dep) {
                entry.push(dep);
            }
        }
    }

    /// Declared dependencies of a suite; empty when the suite has no entry
    pub fn suite_dependencies(&self, suite: &SuiteKey) -> &[SuiteKey] {
        self.edges.get(suite).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Dependencies of `target` with the target's architecture attached
    pub fn dependencies_of(&self, target: &Target) -> Vec<Target> {
        self.suite_dependencies(&target.suite_key())
            .iter()
            .map(|dep| dep.with_arch(&target.architecture))
            .collect()
    }

    /// Every coordinate that must be fetched to check `targets`
    ///
    /// The result always contains the targets themselves plus one hop of
    /// declared dependencies.
    pub fn expand(&self, targets: &BTreeSet<Target>) -> BTreeSet<Target> {
        let mut result = targets.clone();
        for target in targets {
            result.extend(self.dependencies_of(target));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(repo: &str, dist: &str, suite: &str) -> SuiteKey {
        SuiteKey::new(repo, dist, suite)
    }

    fn sample_graph() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.insert(key("urepo", "sid", "main"), [key("debian", "sid", "main")]);
        graph.insert(
            key("urepo", "sid", "meta"),
            [key("debian", "sid", "main"), key("urepo", "sid", "main")],
        );
        graph
    }

    #[test]
    fn test_expand_contains_targets() {
        let graph = sample_graph();
        let targets: BTreeSet<_> = [
            Target::new("urepo", "sid", "main", "amd64"),
            Target::new("urepo", "sid", "meta", "i386"),
        ]
        .into_iter()
        .collect();

        let expanded = graph.expand(&targets);
        assert!(expanded.is_superset(&targets));
    }

    #[test]
    fn test_expand_unknown_suite_is_identity() {
        let graph = sample_graph();
        let target = Target::new("other", "bookworm", "main", "amd64");
        let targets: BTreeSet<_> = [target.clone()].into_iter().collect();

        let expanded = graph.expand(&targets);
        assert_eq!(expanded, targets);
        assert!(graph.dependencies_of(&target).is_empty());
    }

    #[test]
    fn test_expand_attaches_target_architecture() {
        let graph = sample_graph();
        let targets: BTreeSet<_> = [Target::new("urepo", "sid", "main", "arm64")]
            .into_iter()
            .collect();

        let expanded = graph.expand(&targets);
        assert!(expanded.contains(&Target::new("debian", "sid", "main", "arm64")));
        assert!(!expanded.contains(&Target::new("debian", "sid", "main", "amd64")));
        assert_eq!(expanded.len(), 2);
    }

    #[test]
    fn test_shared_dependency_fetched_once() {
        let graph = sample_graph();
        let targets: BTreeSet<_> = [
            Target::new("urepo", "sid", "main", "amd64"),
            Target::new("urepo", "sid", "meta", "amd64"),
        ]
        .into_iter()
        .collect();

        let expanded = graph.expand(&targets);
        let debian_main = Target::new("debian", "sid", "main", "amd64");
        assert_eq!(expanded.iter().filter(|t| **t == debian_main).count(), 1);
        // urepo/main is both a target and a dependency of urepo/meta
        assert_eq!(expanded.len(), 3);
    }

    #[test]
    fn test_expand_is_single_hop() {
        // imports -> meta -> main; only meta is declared for imports
        let mut graph = DependencyGraph::new();
        graph.insert(key("urepo", "sid", "imports"), [key("urepo", "sid", "meta")]);
        graph.insert(key("urepo", "sid", "meta"), [key("debian", "sid", "main")]);

        let targets: BTreeSet<_> = [Target::new("urepo", "sid", "imports", "amd64")]
            .into_iter()
            .collect();
        let expanded = graph.expand(&targets);

        assert!(expanded.contains(&Target::new("urepo", "sid", "meta", "amd64")));
        assert!(!expanded.contains(&Target::new("debian", "sid", "main", "amd64")));
        assert_eq!(expanded.len(), 2);
    }

    #[test]
    fn test_insert_dedupes_and_keeps_order() {
        let mut graph = DependencyGraph::new();
        graph.insert(
            key("urepo", "sid", "imports"),
            [
                key("debian", "sid", "main"),
                key("debian", "sid", "contrib"),
                key("debian", "sid", "main"),
            ],
        );

        let deps = graph.dependencies_of(&Target::new("urepo", "sid", "imports", "amd64"));
        assert_eq!(
            deps,
            vec![
                Target::new("debian", "sid", "main", "amd64"),
                Target::new("debian", "sid", "contrib", "amd64"),
            ]
        );
        assert_eq!(graph.edges.len(), 1);
    }
}
