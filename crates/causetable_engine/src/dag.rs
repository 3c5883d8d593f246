//! Directed acyclic graphs fitted from observations.
//!
//! A [`Dag`] pairs an observation [`Dataset`] with a set of directed edges
//! between its columns. The edge index is persistent, so cloning a graph is
//! O(1) and every mutation returns a new graph that shares structure with
//! the old one.
//!
//! # Example
//!
//! ```
//! use causetable_engine::Dag;
//! use causetable_storage::Dataset;
//!
//! let data = Dataset::from_columns([
//!     ("rain", vec![0, 1, 1, 0]),
//!     ("wet", vec![0, 1, 1, 1]),
//! ])?;
//! let dag = Dag::new(data).add_edge("rain", "wet")?;
//! assert!(dag.parents("wet")?.contains("rain"));
//! # Ok::<(), causetable_foundation::Error>(())
//! ```

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use causetable_foundation::{Error, Result, Value};
use causetable_storage::{Dataset, ProbabilityTable};
use im::{OrdMap, OrdSet};

use crate::paths::{Arrow, DirectedPath};

/// Cached per-node tables of a baked graph.
type TableCache = OrdMap<Arc<str>, Arc<ProbabilityTable>>;

/// A causal graph over the columns of a dataset.
///
/// Nodes are fixed at construction (one per dataset column). Edges are
/// added with [`Dag::add_edge`], which refuses any edge that would close a
/// cycle. A baked graph (see [`Dag::bake`]) caches every node's conditional
/// table and refuses further edge changes.
#[derive(Clone, Debug)]
pub struct Dag {
    /// The observations the graph is fitted from.
    dataset: Arc<Dataset>,
    /// Node names in declaration order.
    nodes: Arc<[Arc<str>]>,
    /// Forward index: parent -> children.
    children: OrdMap<Arc<str>, OrdSet<Arc<str>>>,
    /// Reverse index: child -> parents.
    parents: OrdMap<Arc<str>, OrdSet<Arc<str>>>,
    /// Node tables, present once baked.
    cache: Option<TableCache>,
}

impl Dag {
    /// Creates a graph with one node per dataset column and no edges.
    #[must_use]
    pub fn new(dataset: impl Into<Arc<Dataset>>) -> Self {
        let dataset = dataset.into();
        let nodes: Arc<[Arc<str>]> = dataset.columns().into();
        Self {
            dataset,
            nodes,
            children: OrdMap::new(),
            parents: OrdMap::new(),
            cache: None,
        }
    }

    /// Returns the observations behind this graph.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Returns a shared handle to the observations.
    #[must_use]
    pub fn shared_dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }

    /// Iterates over node names in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes.iter().map(AsRef::as_ref)
    }

    /// Checks whether a node exists.
    #[must_use]
    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.as_ref() == name)
    }

    fn node_key(&self, name: &str) -> Result<Arc<str>> {
        self.nodes
            .iter()
            .find(|n| n.as_ref() == name)
            .cloned()
            .ok_or_else(|| Error::unknown_variable(name))
    }

    fn node_index(&self, name: &str) -> Result<usize> {
        self.nodes
            .iter()
            .position(|n| n.as_ref() == name)
            .ok_or_else(|| Error::unknown_variable(name))
    }

    /// Members of `set` in declaration order.
    fn ordered<'a>(&'a self, set: Option<&OrdSet<Arc<str>>>) -> Vec<&'a Arc<str>> {
        let Some(set) = set else {
            return Vec::new();
        };
        self.nodes.iter().filter(|n| set.contains(*n)).collect()
    }

    /// Returns every edge as `(source, sink)`, sources in declaration order.
    #[must_use]
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.nodes
            .iter()
            .flat_map(|source| {
                self.ordered(self.children.get(source))
                    .into_iter()
                    .map(move |sink| (source.as_ref(), sink.as_ref()))
            })
            .collect()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.children.values().map(OrdSet::len).sum()
    }

    /// Checks whether the edge `source -> sink` exists.
    #[must_use]
    pub fn has_edge(&self, source: &str, sink: &str) -> bool {
        self.children
            .get(source)
            .is_some_and(|set| set.contains(sink))
    }

    /// Returns true once [`Dag::bake`] has cached the node tables.
    #[must_use]
    pub fn is_baked(&self) -> bool {
        self.cache.is_some()
    }

    // =========================================================================
    // Edge Mutation
    // =========================================================================

    /// Returns a graph with the edge `source -> sink` added.
    ///
    /// Adding an existing edge is a no-op. The receiver is never modified.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The graph is baked
    /// - Either endpoint is not a node
    /// - The edge would create a cycle (including a self loop)
    pub fn add_edge(&self, source: &str, sink: &str) -> Result<Self> {
        if self.is_baked() {
            return Err(Error::state("cannot add edges to a baked graph"));
        }
        let from = self.node_key(source)?;
        let to = self.node_key(sink)?;
        if self.has_edge(source, sink) {
            return Ok(self.clone());
        }
        if source == sink || self.reaches(sink, source) {
            return Err(Error::cycle(source, sink));
        }

        let children_of = self.children.get(source).cloned().unwrap_or_default();
        let parents_of = self.parents.get(sink).cloned().unwrap_or_default();
        tracing::debug!(source = %source, sink = %sink, "edge added");

        Ok(Self {
            children: self.children.update(from.clone(), children_of.update(to.clone())),
            parents: self.parents.update(to, parents_of.update(from)),
            ..self.clone()
        })
    }

    /// Adds several edges in order.
    ///
    /// # Errors
    ///
    /// Fails on the first edge [`Dag::add_edge`] rejects.
    pub fn add_edges<'e, I>(&self, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'e str, &'e str)>,
    {
        edges
            .into_iter()
            .try_fold(self.clone(), |dag, (source, sink)| dag.add_edge(source, sink))
    }

    /// Returns a graph with the edge `source -> sink` removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph is baked, either endpoint is not a
    /// node, or the edge does not exist.
    pub fn remove_edge(&self, source: &str, sink: &str) -> Result<Self> {
        if self.is_baked() {
            return Err(Error::state("cannot remove edges from a baked graph"));
        }
        let from = self.node_key(source)?;
        let to = self.node_key(sink)?;
        if !self.has_edge(source, sink) {
            return Err(Error::not_connected(source, sink));
        }
        tracing::debug!(source = %source, sink = %sink, "edge removed");
        Ok(self.without_edge(&from, &to))
    }

    fn without_edge(&self, source: &Arc<str>, sink: &Arc<str>) -> Self {
        let mut children = self.children.clone();
        if let Some(set) = self.children.get(&**source) {
            children.insert(source.clone(), set.without(&**sink));
        }
        let mut parents = self.parents.clone();
        if let Some(set) = self.parents.get(&**sink) {
            parents.insert(sink.clone(), set.without(&**source));
        }
        Self {
            children,
            parents,
            ..self.clone()
        }
    }

    /// Returns a graph with every incoming edge of `node` removed.
    ///
    /// This is the graph surgery behind an intervention. Unlike
    /// [`Dag::remove_edge`] it also works on baked graphs: the cached table
    /// of `node` is recomputed and every other cached table is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` does not exist.
    pub fn cut_incoming(&self, node: &str) -> Result<Self> {
        let key = self.node_key(node)?;
        let parents: Vec<Arc<str>> = self
            .parents
            .get(node)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        if parents.is_empty() {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        for parent in &parents {
            tracing::debug!(source = %parent, sink = %node, "edge cut by intervention");
            next = next.without_edge(parent, &key);
        }
        if let Some(cache) = &self.cache {
            let table = next.compute_node_table(&key)?;
            next.cache = Some(cache.update(key, Arc::new(table)));
        }
        Ok(next)
    }

    /// Returns a graph with the same edges fitted on other observations.
    ///
    /// The result is not baked.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if an edge endpoint is not a column
    /// of `dataset`.
    pub fn with_dataset(&self, dataset: impl Into<Arc<Dataset>>) -> Result<Self> {
        Self::new(dataset).add_edges(self.edges())
    }

    /// Returns a finalized copy with every node table computed and cached.
    ///
    /// Baking an already baked graph returns it unchanged.
    ///
    /// # Errors
    ///
    /// Propagates errors from computing a node table.
    pub fn bake(&self) -> Result<Self> {
        if self.is_baked() {
            return Ok(self.clone());
        }
        let mut cache = TableCache::new();
        for node in self.nodes.iter() {
            cache.insert(node.clone(), Arc::new(self.compute_node_table(node)?));
        }
        tracing::debug!(nodes = self.nodes.len(), "graph baked");
        Ok(Self {
            cache: Some(cache),
            ..self.clone()
        })
    }

    // =========================================================================
    // Structure Queries
    // =========================================================================

    /// Returns true if a directed path leads from `from` to `to`.
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(children) = self.children.get(current) {
                stack.extend(children.iter().map(AsRef::as_ref));
            }
        }
        false
    }

    /// Returns the parents of a node.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if the node does not exist.
    pub fn parents(&self, node: &str) -> Result<BTreeSet<&str>> {
        self.node_key(node)?;
        Ok(self
            .parents
            .get(node)
            .map(|set| set.iter().map(AsRef::as_ref).collect())
            .unwrap_or_default())
    }

    /// Returns the children of a node.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if the node does not exist.
    pub fn children(&self, node: &str) -> Result<BTreeSet<&str>> {
        self.node_key(node)?;
        Ok(self
            .children
            .get(node)
            .map(|set| set.iter().map(AsRef::as_ref).collect())
            .unwrap_or_default())
    }

    /// Returns the parents and children of a node.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if the node does not exist.
    pub fn connections(&self, node: &str) -> Result<BTreeSet<&str>> {
        let mut out = self.parents(node)?;
        out.extend(self.children(node)?);
        Ok(out)
    }

    /// Parents of a node in declaration order.
    fn ordered_parents(&self, node: &str) -> Vec<Arc<str>> {
        self.ordered(self.parents.get(node))
            .into_iter()
            .cloned()
            .collect()
    }

    /// Returns the nodes without incoming edges, in declaration order.
    #[must_use]
    pub fn origin_nodes(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| self.parents.get(*n).is_none_or(OrdSet::is_empty))
            .map(AsRef::as_ref)
            .collect()
    }

    /// Returns the direction of the edge between two nodes.
    ///
    /// [`Arrow::Backward`] means `b` is a parent of `a`; [`Arrow::Forward`]
    /// means `a` is a parent of `b`.
    ///
    /// # Errors
    ///
    /// Returns an error if either node does not exist or there is no edge
    /// between them.
    pub fn edge_direction(&self, a: &str, b: &str) -> Result<Arrow> {
        if self.parents(a)?.contains(b) {
            return Ok(Arrow::Backward);
        }
        if self.parents(b)?.contains(a) {
            return Ok(Arrow::Forward);
        }
        Err(Error::not_connected(a, b))
    }

    /// Returns every simple path between two nodes, ignoring direction.
    ///
    /// Neighbours are explored in declaration order. The number of paths can
    /// grow exponentially with the size of the graph.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if either node does not exist.
    pub fn undirected_paths(&self, a: &str, b: &str) -> Result<Vec<Vec<&str>>> {
        let start = self.node_index(a)?;
        let goal = self.node_index(b)?;
        let mut paths = Vec::new();
        if start != goal {
            let mut stack = vec![start];
            self.walk(goal, &mut stack, &mut paths);
        }
        Ok(paths)
    }

    fn neighbours(&self, index: usize) -> Vec<usize> {
        let name = &self.nodes[index];
        let parents = self.parents.get(name);
        let children = self.children.get(name);
        (0..self.nodes.len())
            .filter(|&i| {
                let other = &self.nodes[i];
                parents.is_some_and(|s| s.contains(other))
                    || children.is_some_and(|s| s.contains(other))
            })
            .collect()
    }

    fn walk<'a>(&'a self, goal: usize, stack: &mut Vec<usize>, out: &mut Vec<Vec<&'a str>>) {
        let Some(&current) = stack.last() else {
            return;
        };
        for next in self.neighbours(current) {
            if stack.contains(&next) {
                continue;
            }
            stack.push(next);
            if next == goal {
                out.push(stack.iter().map(|&i| self.nodes[i].as_ref()).collect());
            } else {
                self.walk(goal, stack, out);
            }
            stack.pop();
        }
    }

    /// Returns every simple path between two nodes with each step annotated
    /// by its edge direction.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if either node does not exist.
    pub fn directed_paths(&self, a: &str, b: &str) -> Result<Vec<DirectedPath>> {
        self.undirected_paths(a, b)?
            .into_iter()
            .map(|nodes| {
                let mut path = DirectedPath::default();
                for pair in nodes.windows(2) {
                    path.push_node(pair[0]);
                    path.push_arrow(self.edge_direction(pair[0], pair[1])?);
                }
                if let Some(last) = nodes.last() {
                    path.push_node(*last);
                }
                tracing::trace!(path = %path, "found directed path");
                Ok(path)
            })
            .collect()
    }

    /// Returns the directed paths between two nodes that are not blocked
    /// when conditioning on `given`.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if either node does not exist.
    pub fn active_paths<S: AsRef<str>>(
        &self,
        a: &str,
        b: &str,
        given: &[S],
    ) -> Result<Vec<DirectedPath>> {
        let mut active = Vec::new();
        for path in self.directed_paths(a, b)? {
            if !path.is_blocked(given)? {
                active.push(path);
            }
        }
        Ok(active)
    }

    /// Checks whether two nodes are d-separated given `given`.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if either node does not exist.
    pub fn is_independent<S: AsRef<str>>(&self, a: &str, b: &str, given: &[S]) -> Result<bool> {
        Ok(self.active_paths(a, b, given)?.is_empty())
    }

    // =========================================================================
    // Probability Tables
    // =========================================================================

    /// Returns the distinct observed values of a node.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if the node does not exist.
    pub fn values_for_node(&self, name: &str) -> Result<BTreeSet<Value>> {
        self.dataset.values_for(name)
    }

    /// Returns `P(name | parents(name))` estimated from observation counts.
    ///
    /// Columns are the parents in declaration order followed by `name`.
    /// Baked graphs return the cached table.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if the node does not exist.
    pub fn calc_node_table(&self, name: &str) -> Result<ProbabilityTable> {
        let key = self.node_key(name)?;
        if let Some(table) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            return Ok(ProbabilityTable::clone(table));
        }
        self.compute_node_table(&key)
    }

    #[allow(clippy::cast_precision_loss)]
    fn compute_node_table(&self, node: &Arc<str>) -> Result<ProbabilityTable> {
        let parents = self.ordered_parents(node);
        let mut columns = parents.clone();
        columns.push(node.clone());

        let joint = self.dataset.count_by(&columns)?;
        let parent_counts = self.dataset.count_by(&parents)?;
        let rows = joint.into_iter().map(|(values, count)| {
            let total = parent_counts
                .get(&values[..parents.len()])
                .copied()
                .unwrap_or(count);
            (values, count as f64 / total as f64)
        });
        let table = ProbabilityTable::from_rows(columns, rows)?;

        tracing::debug!(
            node = %node,
            parents = parents.len(),
            rows = table.len(),
            "node table computed"
        );
        Ok(table)
    }

    /// Returns the joint distribution over every node.
    ///
    /// Starts from the last declared node's table and merges the others in
    /// declaration order with [`Dag::merge_probs`].
    ///
    /// # Errors
    ///
    /// Returns a zero support error if the dataset is empty.
    pub fn marginal_table(&self) -> Result<ProbabilityTable> {
        let mut tables = self
            .nodes()
            .map(|n| self.calc_node_table(n))
            .collect::<Result<Vec<_>>>()?;
        let Some(mut marginal) = tables.pop() else {
            return Ok(ProbabilityTable::unit());
        };
        for table in &tables {
            marginal = self.merge_probs(&marginal, table)?;
        }
        tracing::debug!(rows = marginal.len(), "marginal table built");
        Ok(marginal)
    }

    /// Merges two probability tables into one normalized table.
    ///
    /// Tables sharing columns are joined on them and their mass multiplied.
    /// If they share nothing, `this` is first expanded with every observed
    /// value of each of `that`'s columns. Value combinations missing from
    /// either side carry no mass and are dropped.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if `that` has a column that is not
    /// a node, or a zero support error if the merge carries no mass.
    pub fn merge_probs(
        &self,
        this: &ProbabilityTable,
        that: &ProbabilityTable,
    ) -> Result<ProbabilityTable> {
        if !this.shared_columns(that).is_empty() {
            return this.join(that)?.normalized();
        }
        let mut expanded = this.clone();
        for column in that.columns() {
            let values = self.values_for_node(column)?;
            expanded = expanded.expand(column.clone(), &values)?;
        }
        expanded.join(that)?.normalized()
    }
}
