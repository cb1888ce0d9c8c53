//! meld DOM - Document Object Model
//!
//! Arena-based DOM tree the meld client runtime reads directives from and
//! patches server fragments into.

mod attributes;
mod builder;
mod classlist;
mod document;
mod events;
mod forms;
mod node;
mod query;
mod tree;

pub use attributes::{Attr, NamedNodeMap};
pub use builder::{el, ElementBuilder, NodeSpec};
pub use classlist::DOMTokenList;
pub use document::Document;
pub use events::Event;
pub use forms::ControlValue;
pub use node::{ElementData, Node, NodeData};
pub use query::SimpleSelector;
pub use tree::DomTree;

/// Node identifier: arena slot plus the slot's generation, so an id kept
/// past its node's removal never resolves to whatever reuses the slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId::new(0, 0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId::new(u32::MAX, 0);

    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    pub fn index(self) -> u32 {
        self.index
    }

    /// Reuse count of the arena slot
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::NONE
    }
}

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node not found: {0:?}")]
    NotFound(NodeId),

    #[error("Hierarchy request error: {0:?} cannot be inserted here")]
    HierarchyRequest(NodeId),

    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),
}
