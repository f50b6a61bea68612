//! A mergeable dependency graph.
//!
//! Elements are stored in an arena; every element starts out in its own
//! [`DependencyNode`]. Merging nodes retires all but the one with the
//! smallest index and redirects the retired ones to it, so a node handle
//! obtained before a merge stays usable. Node edges are derived from the
//! element edges of the current members, minus self loops.

pub mod cycles;
pub mod modules;

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use self::cycles::{Cycle, CycleDetection, CycleGraph};

pub use modules::{load_module_graph, ModuleGraph};

/// Something that can be put into a [`DependencyGraph`].
pub trait GraphElement {
    type Id: Clone + Eq + Hash + Ord + fmt::Debug;

    fn graph_id(&self) -> Self::Id;
}

/// Handle of a graph node. Handles of merged-away nodes keep redirecting to
/// the surviving node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyNode(usize);

impl DependencyNode {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DependencyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The graph still contains a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dependency graph contains a cycle through node {node}")]
pub struct CycleError {
    pub node: DependencyNode,
}

#[derive(Debug, Clone)]
pub struct DependencyGraph<E: GraphElement> {
    elements: Vec<E>,
    index_by_id: HashMap<E::Id, usize>,
    element_edges: Vec<BTreeSet<usize>>,
    reverse_edges: Vec<BTreeSet<usize>>,
    /// Redirect table; a node is live when it points to itself
    parent: Vec<usize>,
    /// Element indices of each live node
    members: Vec<Vec<usize>>,
}

impl<E: GraphElement> Default for DependencyGraph<E> {
    fn default() -> Self {
        DependencyGraph {
            elements: Vec::new(),
            index_by_id: HashMap::new(),
            element_edges: Vec::new(),
            reverse_edges: Vec::new(),
            parent: Vec::new(),
            members: Vec::new(),
        }
    }
}

impl<E: GraphElement> DependencyGraph<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `roots` and everything reachable through `dependencies_of`.
    /// Each element is asked for its dependencies exactly once.
    pub fn load<Err>(
        &mut self,
        roots: impl IntoIterator<Item = E>,
        mut dependencies_of: impl FnMut(&E) -> Result<Vec<E>, Err>,
    ) -> Result<(), Err> {
        let mut queue = VecDeque::new();
        for root in roots {
            let (index, added) = self.add_element(root);
            if added {
                queue.push_back(index);
            }
        }

        while let Some(index) = queue.pop_front() {
            for dependency in dependencies_of(&self.elements[index])? {
                let (target, added) = self.add_element(dependency);
                if added {
                    queue.push_back(target);
                }
                self.element_edges[index].insert(target);
                self.reverse_edges[target].insert(index);
            }
        }
        Ok(())
    }

    fn add_element(&mut self, element: E) -> (usize, bool) {
        let id = element.graph_id();
        if let Some(&index) = self.index_by_id.get(&id) {
            return (index, false);
        }
        let index = self.elements.len();
        self.elements.push(element);
        self.index_by_id.insert(id, index);
        self.element_edges.push(BTreeSet::new());
        self.reverse_edges.push(BTreeSet::new());
        self.parent.push(index);
        self.members.push(vec![index]);
        (index, true)
    }

    /// The live node `node` has been merged into, or `node` itself.
    pub fn merged_node(&self, node: DependencyNode) -> DependencyNode {
        DependencyNode(self.find(node.0))
    }

    fn find(&self, mut index: usize) -> usize {
        while self.parent[index] != index {
            index = self.parent[index];
        }
        index
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// All elements in load order.
    pub fn all_elements(&self) -> impl Iterator<Item = &E> {
        self.elements.iter()
    }

    /// Live nodes in index order.
    pub fn nodes(&self) -> Vec<DependencyNode> {
        (0..self.parent.len())
            .filter(|&i| self.parent[i] == i)
            .map(DependencyNode)
            .collect()
    }

    /// Live node containing the element with `id`.
    pub fn node_of(&self, id: &E::Id) -> Option<DependencyNode> {
        self.index_by_id
            .get(id)
            .map(|&index| DependencyNode(self.find(index)))
    }

    pub fn contains(&self, id: &E::Id) -> bool {
        self.index_by_id.contains_key(id)
    }

    /// Elements of the live node behind `node`, in load order.
    pub fn elements(&self, node: DependencyNode) -> impl Iterator<Item = &E> {
        let mut members = self.members[self.find(node.0)].clone();
        members.sort_unstable();
        members.into_iter().map(move |i| &self.elements[i])
    }

    /// Direct element-level dependencies of the element with `id`.
    pub fn element_dependencies(&self, id: &E::Id) -> Vec<&E> {
        self.index_by_id
            .get(id)
            .map(|&index| {
                self.element_edges[index]
                    .iter()
                    .map(|&t| &self.elements[t])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nodes the given node depends on.
    pub fn dependencies(&self, node: DependencyNode) -> BTreeSet<DependencyNode> {
        self.derived_edges(node, &self.element_edges)
    }

    /// Nodes depending on the given node.
    pub fn reverse_dependencies(&self, node: DependencyNode) -> BTreeSet<DependencyNode> {
        self.derived_edges(node, &self.reverse_edges)
    }

    fn derived_edges(
        &self,
        node: DependencyNode,
        edges: &[BTreeSet<usize>],
    ) -> BTreeSet<DependencyNode> {
        let root = self.find(node.0);
        self.members[root]
            .iter()
            .flat_map(|&m| edges[m].iter())
            .map(|&t| self.find(t))
            .filter(|&t| t != root)
            .map(DependencyNode)
            .collect()
    }

    /// Merge every node holding one of `ids` into one node. Unknown ids are
    /// skipped; `None` if none is known.
    pub fn merge_elements<'i>(
        &mut self,
        ids: impl IntoIterator<Item = &'i E::Id>,
    ) -> Option<DependencyNode>
    where
        E::Id: 'i,
    {
        let nodes: Vec<DependencyNode> = ids.into_iter().filter_map(|id| self.node_of(id)).collect();
        let (first, rest) = nodes.split_first()?;
        Some(
            rest.iter()
                .fold(*first, |merged, node| self.merge_nodes(merged, *node)),
        )
    }

    /// Merge two nodes. The smaller index survives.
    pub fn merge_nodes(&mut self, a: DependencyNode, b: DependencyNode) -> DependencyNode {
        let (a, b) = (self.find(a.0), self.find(b.0));
        if a == b {
            return DependencyNode(a);
        }
        let (survivor, retired) = if a < b { (a, b) } else { (b, a) };
        self.parent[retired] = survivor;
        let moved = std::mem::take(&mut self.members[retired]);
        self.members[survivor].extend(moved);
        DependencyNode(survivor)
    }

    /// Collapse every cycle into a single node. Returns the number of
    /// cycles merged.
    pub fn merge_cycles(&mut self) -> usize {
        let cycles = self.detect_cycles(|_| None::<()>);
        for cycle in &cycles {
            if let Some((first, rest)) = cycle.nodes.split_first() {
                rest.iter().fold(*first, |merged, node| self.merge_nodes(merged, *node));
            }
        }
        cycles.len()
    }

    /// Cycles among the live nodes, classified with `category`.
    pub fn detect_cycles<C: Ord + Clone>(
        &self,
        category: impl Fn(DependencyNode) -> Option<C>,
    ) -> Vec<Cycle<DependencyNode, C>> {
        let view = CategorizedGraph {
            graph: self,
            category,
        };
        let mut detection = CycleDetection::new();
        detection.process(&view, self.nodes());
        detection.into_cycles()
    }

    /// Live nodes with every node after all of its dependencies.
    pub fn topological_order(&self) -> Result<Vec<DependencyNode>, CycleError> {
        let mut graph: DiGraph<DependencyNode, ()> = DiGraph::new();
        let mut index: HashMap<DependencyNode, NodeIndex> = HashMap::new();
        for node in self.nodes() {
            index.insert(node, graph.add_node(node));
        }
        for node in self.nodes() {
            for dependency in self.dependencies(node) {
                graph.add_edge(index[&node], index[&dependency], ());
            }
        }

        let mut order: Vec<DependencyNode> = toposort(&graph, None)
            .map_err(|cycle| CycleError {
                node: graph[cycle.node_id()],
            })?
            .into_iter()
            .map(|i| graph[i])
            .collect();

        // edges point from dependent to dependency
        order.reverse();
        Ok(order)
    }
}

struct CategorizedGraph<'g, E: GraphElement, F> {
    graph: &'g DependencyGraph<E>,
    category: F,
}

impl<'g, E, F, C> CycleGraph for CategorizedGraph<'g, E, F>
where
    E: GraphElement,
    F: Fn(DependencyNode) -> Option<C>,
    C: Ord + Clone,
{
    type Node = DependencyNode;
    type Category = C;

    fn outgoing_edges(&self, node: DependencyNode) -> Vec<DependencyNode> {
        self.graph.dependencies(node).into_iter().collect()
    }

    fn category(&self, node: DependencyNode) -> Option<C> {
        (self.category)(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Item(&'static str);

    impl GraphElement for Item {
        type Id = &'static str;

        fn graph_id(&self) -> &'static str {
            self.0
        }
    }

    fn graph(edges: &[(&'static str, &'static str)]) -> DependencyGraph<Item> {
        let mut map: BTreeMap<&str, Vec<Item>> = BTreeMap::new();
        let mut roots = Vec::new();
        for (from, to) in edges {
            map.entry(*from).or_default().push(Item(*to));
            roots.push(Item(*from));
        }
        let mut graph = DependencyGraph::new();
        graph
            .load(roots, |item| {
                Ok::<_, ()>(map.get(item.0).cloned().unwrap_or_default())
            })
            .unwrap();
        graph
    }

    fn names(graph: &DependencyGraph<Item>, node: DependencyNode) -> Vec<&'static str> {
        graph.elements(node).map(|i| i.0).collect()
    }

    fn order(graph: &DependencyGraph<Item>) -> Vec<Vec<&'static str>> {
        graph
            .topological_order()
            .unwrap()
            .into_iter()
            .map(|n| names(graph, n))
            .collect()
    }

    #[test]
    fn test_load_follows_dependencies() {
        let g = graph(&[("a", "b"), ("b", "c")]);
        assert_eq!(g.element_count(), 3);
        assert_eq!(g.nodes().len(), 3);

        let a = g.node_of(&"a").unwrap();
        let b = g.node_of(&"b").unwrap();
        assert_eq!(g.dependencies(a), BTreeSet::from([b]));
        assert_eq!(g.reverse_dependencies(b), BTreeSet::from([a]));
        assert_eq!(order(&g), vec![vec!["c"], vec!["b"], vec!["a"]]);
    }

    #[test]
    fn test_merge_elements_is_idempotent() {
        let mut g = graph(&[("a", "b"), ("b", "c")]);
        let merged = g.merge_elements(&["a", "b"]).unwrap();
        assert_eq!(g.merge_elements(&["a", "b"]), Some(merged));
        assert_eq!(g.merge_elements(&["b"]), Some(merged));
        assert_eq!(names(&g, merged), vec!["a", "b"]);
        assert_eq!(g.nodes().len(), 2);
        assert_eq!(g.merge_elements(&["unknown"]), None);
    }

    #[test]
    fn test_retired_nodes_redirect() {
        let mut g = graph(&[("a", "b"), ("b", "c")]);
        let b = g.node_of(&"b").unwrap();
        let c = g.node_of(&"c").unwrap();
        let survivor = g.merge_nodes(c, b);

        assert_eq!(survivor, b);
        assert_eq!(g.merged_node(c), b);
        assert_eq!(g.node_of(&"c"), Some(b));

        // the b -> c edge became internal
        assert!(g.dependencies(b).is_empty());
    }

    #[test]
    fn test_merge_cycles() {
        let mut g = graph(&[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")]);
        assert!(g.topological_order().is_err());

        assert_eq!(g.merge_cycles(), 1);
        assert_eq!(g.merge_cycles(), 0);
        assert_eq!(order(&g), vec![vec!["d"], vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_partition_is_preserved() {
        let mut g = graph(&[("a", "b"), ("b", "a"), ("c", "d"), ("e", "f")]);
        g.merge_cycles();
        g.merge_elements(&["c", "e"]);

        let mut all: Vec<&str> = g.nodes().into_iter().flat_map(|n| names(&g, n)).collect();
        all.sort();
        assert_eq!(all, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_detect_cycles_with_categories() {
        let g = graph(&[("a", "b"), ("b", "a")]);
        let cycles = g.detect_cycles(|n| Some(names(&g, n)[0]));
        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].spans_categories());
    }
}
