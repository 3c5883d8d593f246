//! Directed paths and d-separation.
//!
//! A [`DirectedPath`] alternates nodes and arrows, e.g. `a -> b <- c`. Each
//! interior node plays a [`NodeRole`] determined by the arrows on either side
//! of it, and the role together with the conditioning set decides whether
//! the node blocks the flow of information along the path.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use causetable_foundation::{Error, Result};

/// Direction of one step along a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arrow {
    /// `->`: the step follows the edge direction.
    Forward,
    /// `<-`: the step walks against the edge direction.
    Backward,
}

impl Arrow {
    /// Returns the textual form of the arrow.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "->",
            Self::Backward => "<-",
        }
    }
}

impl fmt::Display for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arrow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "->" => Ok(Self::Forward),
            "<-" => Ok(Self::Backward),
            other => Err(Error::shape(format!("not an arrow: {other}"))),
        }
    }
}

/// One element of a [`DirectedPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathElement {
    /// A variable.
    Node(Arc<str>),
    /// A step between two variables.
    Arrow(Arrow),
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(name) => f.write_str(name),
            Self::Arrow(arrow) => arrow.fmt(f),
        }
    }
}

/// The structural role of an interior path node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// `-> x ->` or `<- x <-`.
    Chain,
    /// `<- x ->`: a common cause.
    Fork,
    /// `-> x <-`: a common effect.
    Collider,
}

impl NodeRole {
    /// Classifies a node from the elements immediately around it.
    ///
    /// # Errors
    ///
    /// Returns an invalid path error if either neighbour is not an arrow.
    pub fn classify(before: &PathElement, after: &PathElement) -> Result<Self> {
        match (before, after) {
            (PathElement::Arrow(Arrow::Backward), PathElement::Arrow(Arrow::Forward)) => {
                Ok(Self::Fork)
            }
            (PathElement::Arrow(Arrow::Forward), PathElement::Arrow(Arrow::Backward)) => {
                Ok(Self::Collider)
            }
            (PathElement::Arrow(_), PathElement::Arrow(_)) => Ok(Self::Chain),
            _ => Err(Error::invalid_path(before.to_string(), after.to_string())),
        }
    }

    /// Decides whether a node in this role blocks the path.
    ///
    /// Chains and forks block when the node is conditioned on; colliders
    /// block when it is not. Descendants of a collider are not consulted.
    #[must_use]
    pub const fn is_blocking(self, given: bool) -> bool {
        match self {
            Self::Chain | Self::Fork => given,
            Self::Collider => !given,
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chain => f.write_str("chain"),
            Self::Fork => f.write_str("fork"),
            Self::Collider => f.write_str("collider"),
        }
    }
}

/// An alternating sequence of nodes and arrows.
///
/// Paths produced by [`Dag::directed_paths`](crate::Dag::directed_paths) are
/// always well formed. Paths parsed from text are taken as written, so a
/// malformed path is only reported when it is checked for blocking.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct DirectedPath {
    elements: Vec<PathElement>,
}

impl DirectedPath {
    /// Creates a path from its elements.
    #[must_use]
    pub fn new(elements: Vec<PathElement>) -> Self {
        Self { elements }
    }

    /// Appends a node.
    pub fn push_node(&mut self, name: impl Into<Arc<str>>) {
        self.elements.push(PathElement::Node(name.into()));
    }

    /// Appends an arrow.
    pub fn push_arrow(&mut self, arrow: Arrow) {
        self.elements.push(PathElement::Arrow(arrow));
    }

    /// Returns the elements in order.
    #[must_use]
    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    /// Returns the number of elements (nodes and arrows).
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the path has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over the node names along the path.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.elements.iter().filter_map(|e| match e {
            PathElement::Node(name) => Some(name.as_ref()),
            PathElement::Arrow(_) => None,
        })
    }

    /// Finds the first interior node that blocks this path under `given`.
    ///
    /// # Errors
    ///
    /// Returns an invalid path error if an interior node is not surrounded
    /// by arrows.
    pub fn blocking_node<S: AsRef<str>>(&self, given: &[S]) -> Result<Option<(&str, NodeRole)>> {
        let last = self.elements.len().saturating_sub(1);
        for idx in 1..last {
            let PathElement::Node(name) = &self.elements[idx] else {
                continue;
            };
            let role = NodeRole::classify(&self.elements[idx - 1], &self.elements[idx + 1])?;
            let conditioned = given.iter().any(|g| g.as_ref() == name.as_ref());
            if role.is_blocking(conditioned) {
                tracing::debug!(
                    node = %name,
                    role = %role,
                    path = %self,
                    "path blocked"
                );
                return Ok(Some((name.as_ref(), role)));
            }
        }
        Ok(None)
    }

    /// Checks whether any interior node blocks this path under `given`.
    ///
    /// # Errors
    ///
    /// Returns an invalid path error if an interior node is not surrounded
    /// by arrows.
    pub fn is_blocked<S: AsRef<str>>(&self, given: &[S]) -> Result<bool> {
        Ok(self.blocking_node(given)?.is_some())
    }
}

impl fmt::Display for DirectedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            element.fmt(f)?;
        }
        Ok(())
    }
}

impl FromStr for DirectedPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let elements: Vec<PathElement> = s
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<Arrow>()
                    .map_or_else(|_| PathElement::Node(token.into()), PathElement::Arrow)
            })
            .collect();
        if elements.is_empty() {
            return Err(Error::shape("empty path"));
        }
        Ok(Self { elements })
    }
}
