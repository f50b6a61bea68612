//! Strongly connected component detection.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::hash::Hash;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

/// A directed graph cycle detection can run on.
pub trait CycleGraph {
    type Node: Copy + Ord + Hash;
    type Category: Ord + Clone;

    fn outgoing_edges(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Classification used to spot cycles spanning several categories.
    fn category(&self, _node: Self::Node) -> Option<Self::Category> {
        None
    }
}

/// A non-trivial strongly connected component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle<N, C> {
    /// Members, sorted
    pub nodes: Vec<N>,
    /// Distinct categories of the members
    pub categories: BTreeSet<C>,
}

impl<N, C> Cycle<N, C> {
    pub fn spans_categories(&self) -> bool {
        self.categories.len() > 1
    }
}

/// Collects the cycles reachable from a set of start nodes.
#[derive(Debug)]
pub struct CycleDetection<N, C> {
    cycles: Vec<Cycle<N, C>>,
}

impl<N: Copy + Ord + Hash, C: Ord + Clone> CycleDetection<N, C> {
    pub fn new() -> Self {
        CycleDetection { cycles: Vec::new() }
    }

    /// Find every component of size > 1, or with a self edge, among the
    /// nodes reachable from `nodes`.
    pub fn process<G>(&mut self, graph: &G, nodes: impl IntoIterator<Item = N>)
    where
        G: CycleGraph<Node = N, Category = C>,
    {
        let mut edges = DiGraphMap::<N, ()>::new();
        let mut seen = HashSet::new();
        let mut queue: VecDeque<N> = nodes.into_iter().collect();

        while let Some(node) = queue.pop_front() {
            if !seen.insert(node) {
                continue;
            }
            edges.add_node(node);
            for target in graph.outgoing_edges(node) {
                edges.add_edge(node, target, ());
                if !seen.contains(&target) {
                    queue.push_back(target);
                }
            }
        }

        let mut found: Vec<Cycle<N, C>> = tarjan_scc(&edges)
            .into_iter()
            .filter(|scc| scc.len() > 1 || edges.contains_edge(scc[0], scc[0]))
            .map(|mut scc| {
                scc.sort();
                let categories = scc.iter().filter_map(|n| graph.category(*n)).collect();
                Cycle {
                    nodes: scc,
                    categories,
                }
            })
            .collect();
        found.sort_by(|a, b| a.nodes.cmp(&b.nodes));
        self.cycles.extend(found);
    }

    pub fn cycles(&self) -> &[Cycle<N, C>] {
        &self.cycles
    }

    pub fn into_cycles(self) -> Vec<Cycle<N, C>> {
        self.cycles
    }
}

impl<N: Copy + Ord + Hash, C: Ord + Clone> Default for CycleDetection<N, C> {
    fn default() -> Self {
        Self::new()
    }
}
