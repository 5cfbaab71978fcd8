use indexmap::{IndexMap, IndexSet};
use once_cell::sync::OnceCell;
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;
use tracing::{debug, warn};

/// A vertex of the constraint graph: a component or one of the two sentinels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node<C> {
    Start,
    End,
    Item(C),
}

impl<C> From<C> for Node<C> {
    fn from(item: C) -> Self {
        Node::Item(item)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// The constraints cannot be linearised.
    #[error("sort loop detected: {unresolved:?} cannot be ordered")]
    Cycle { unresolved: Vec<String> },
    /// An edge leaving `End` or entering `Start`.
    #[error("invalid edge: {0}")]
    InvalidEdge(&'static str),
}

/// Before/after constraint graph over components.
///
/// The sorted order is cached until the next [`add`](Self::add).
#[derive(Debug)]
pub struct ComponentsTopology<C> {
    graph: IndexMap<Node<C>, IndexSet<Node<C>>>,
    sorted: OnceCell<Vec<C>>,
}

impl<C> Default for ComponentsTopology<C>
where
    C: Clone + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for ComponentsTopology<C>
where
    C: Clone + Eq + Hash + Debug,
{
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            sorted: self.sorted.clone(),
        }
    }
}

impl<C> ComponentsTopology<C>
where
    C: Clone + Eq + Hash + Debug,
{
    #[must_use]
    pub fn new() -> Self {
        let mut graph = IndexMap::new();
        graph.insert(Node::Start, IndexSet::new());
        graph.insert(Node::End, IndexSet::new());
        Self {
            graph,
            sorted: OnceCell::new(),
        }
    }

    fn edge(&mut self, from: Node<C>, to: Node<C>) -> Result<(), TopologyError> {
        if from == Node::End {
            return Err(TopologyError::InvalidEdge("nothing can follow the end marker"));
        }
        if to == Node::Start {
            return Err(TopologyError::InvalidEdge("nothing can precede the start marker"));
        }
        // Targets become vertices too, so unreachable ones are counted at sort time.
        self.graph.entry(to.clone()).or_default();
        self.graph.entry(from).or_default().insert(to);
        Ok(())
    }

    /// Place `component` after `after` and before `before`.
    ///
    /// Constraints naming components that are never added themselves leave
    /// those components unreachable, which fails the next sort.
    pub fn add(
        &mut self,
        component: C,
        before: Node<C>,
        after: Node<C>,
    ) -> Result<(), TopologyError> {
        let node = Node::Item(component);
        self.edge(after, node.clone())?;
        self.edge(node, before)?;
        self.sorted = OnceCell::new();
        Ok(())
    }

    /// Add `component` with no constraint other than the sentinels.
    pub fn insert(&mut self, component: C) -> Result<(), TopologyError> {
        self.add(component, Node::End, Node::Start)
    }

    /// Number of distinct components known to the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.len() - 2
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, component: &C) -> bool {
        self.graph.contains_key(&Node::Item(component.clone()))
    }

    /// Components in an order consistent with every recorded constraint.
    pub fn sorted(&self) -> Result<&[C], TopologyError> {
        self.sorted
            .get_or_try_init(|| Self::sort(&self.graph))
            .map(Vec::as_slice)
    }

    /// Iterate over the sorted components.
    pub fn iter(&self) -> Result<std::slice::Iter<'_, C>, TopologyError> {
        Ok(self.sorted()?.iter())
    }

    fn sort(graph: &IndexMap<Node<C>, IndexSet<Node<C>>>) -> Result<Vec<C>, TopologyError> {
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'g, C: Clone + Eq + Hash + Debug>(
            graph: &'g IndexMap<Node<C>, IndexSet<Node<C>>>,
            node: &'g Node<C>,
            marks: &mut IndexMap<&'g Node<C>, Mark>,
            postorder: &mut Vec<&'g Node<C>>,
        ) -> Result<(), TopologyError> {
            marks.insert(node, Mark::Visiting);
            if let Some(targets) = graph.get(node) {
                // Latest edges first, so that the reversed post-order keeps
                // unconstrained siblings in insertion order.
                for target in targets.iter().rev() {
                    match marks.get(target) {
                        None => visit(graph, target, marks, postorder)?,
                        Some(Mark::Visiting) => {
                            return Err(TopologyError::Cycle {
                                unresolved: vec![format!("{node:?}"), format!("{target:?}")],
                            })
                        }
                        Some(Mark::Done) => {}
                    }
                }
            }
            marks.insert(node, Mark::Done);
            postorder.push(node);
            Ok(())
        }

        let mut marks = IndexMap::with_capacity(graph.len());
        let mut postorder = Vec::with_capacity(graph.len());
        let start = Node::Start;
        let root = graph
            .get_key_value(&start)
            .map(|(k, _)| k)
            .ok_or(TopologyError::InvalidEdge("missing start marker"))?;

        if let Err(err) = visit(graph, root, &mut marks, &mut postorder) {
            warn!(error = %err, "Topology sort failed");
            return Err(err);
        }

        if postorder.len() != graph.len() {
            let unresolved: Vec<String> = graph
                .keys()
                .filter(|n| !marks.contains_key(n))
                .map(|n| format!("{n:?}"))
                .collect();
            warn!(unresolved = ?unresolved, "Topology sort left nodes unreachable");
            return Err(TopologyError::Cycle { unresolved });
        }

        let sorted: Vec<C> = postorder
            .into_iter()
            .rev()
            .filter_map(|n| match n {
                Node::Item(c) => Some(c.clone()),
                Node::Start | Node::End => None,
            })
            .collect();
        debug!(components = sorted.len(), "Topology sorted");
        Ok(sorted)
    }
}
