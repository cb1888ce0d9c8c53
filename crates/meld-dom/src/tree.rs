//! DOM Tree (arena-based allocation)
//!
//! Nodes live in generation-tagged slots. Detached nodes stay allocated so
//! they can be re-inserted; [`DomTree::remove_children`] frees the removed
//! subtrees and their slots are reused under a new generation, so a stale
//! `NodeId` never aliases a live node.

use crate::{DomError, DomResult, ElementData, Node, NodeId};

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::document()),
            }],
            free: Vec::new(),
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Element data, if `id` is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Number of live nodes, attached or not
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocated slots, live or free
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn push(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId::new(index, 0)
    }

    /// Allocate a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    fn link(&mut self, id: NodeId, update: impl FnOnce(&mut Node)) {
        if let Some(node) = self.get_mut(id) {
            update(node);
        }
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.get(parent).is_none() {
            return Err(DomError::NotFound(parent));
        }
        if self.get(child).is_none() {
            return Err(DomError::NotFound(child));
        }
        if child == NodeId::ROOT || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest(child));
        }

        self.detach(child);
        self.append_detached(parent, child);
        Ok(child)
    }

    /// Link an already detached `child` as the last child of `parent`
    pub(crate) fn append_detached(&mut self, parent: NodeId, child: NodeId) {
        let last = self.get(parent).map_or(NodeId::NONE, |n| n.last_child);

        self.link(child, |node| {
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        });
        if last.is_valid() {
            self.link(last, |node| node.next_sibling = child);
        } else {
            self.link(parent, |node| node.first_child = child);
        }
        self.link(parent, |node| node.last_child = child);
    }

    /// Remove `child` from `parent`. The node stays allocated.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        match self.get(child) {
            None => Err(DomError::NotFound(child)),
            Some(node) if node.parent != parent => Err(DomError::NotAChild { parent, child }),
            Some(_) => {
                self.detach(child);
                Ok(child)
            }
        }
    }

    /// Unlink a node from its parent and siblings
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);

        if prev.is_valid() {
            self.link(prev, |node| node.next_sibling = next);
        } else if parent.is_valid() {
            self.link(parent, |node| node.first_child = next);
        }
        if next.is_valid() {
            self.link(next, |node| node.prev_sibling = prev);
        } else if parent.is_valid() {
            self.link(parent, |node| node.last_child = prev);
        }

        self.link(id, |node| {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        });
    }

    /// Detach every child of `parent` and free the removed subtrees. Their
    /// ids go stale.
    pub fn remove_children(&mut self, parent: NodeId) {
        for child in self.children(parent) {
            self.detach(child);
            self.free_subtree(child);
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            stack.extend(self.children(id));
            let Some(slot) = self.slots.get_mut(id.index as usize) else { continue };
            if slot.generation != id.generation || slot.node.is_none() {
                continue;
            }
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
    }

    /// Direct children in document order
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.get(parent).map_or(NodeId::NONE, |n| n.first_child);
        while cur.is_valid() {
            out.push(cur);
            cur = self.get(cur).map_or(NodeId::NONE, |n| n.next_sibling);
        }
        out
    }

    /// Whether `node` is `ancestor` or lies beneath it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = node;
        while let Some(current) = self.get(cur) {
            if cur == ancestor {
                return true;
            }
            cur = current.parent;
        }
        false
    }

    /// Whether the node is reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(NodeId::ROOT, id)
    }

    /// Element descendants of `root` in pre-order, `root` excluded
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            if self.get(id).is_some_and(Node::is_element) {
                out.push(id);
            }
            stack.extend(self.children(id).into_iter().rev());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_children() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let a = tree.create_element("span");
        let b = tree.create_text("hi");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, a).unwrap();
        tree.append_child(div, b).unwrap();

        assert_eq!(tree.children(div), vec![a, b]);
        assert_eq!(tree.parent(a), Some(div));
        assert!(tree.is_connected(b));
    }

    #[test]
    fn test_detach_relinks_siblings() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        let items: Vec<_> = (0..3).map(|_| tree.create_element("li")).collect();
        for &li in &items {
            tree.append_child(ul, li).unwrap();
        }

        tree.remove_child(ul, items[1]).unwrap();
        assert_eq!(tree.children(ul), vec![items[0], items[2]]);
        assert_eq!(tree.parent(items[1]), None);

        tree.remove_children(ul);
        assert!(tree.children(ul).is_empty());
    }

    #[test]
    fn test_hierarchy_errors() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        let inner = tree.create_element("div");
        tree.append_child(outer, inner).unwrap();

        assert_eq!(tree.append_child(inner, outer), Err(DomError::HierarchyRequest(outer)));
        assert!(matches!(
            tree.remove_child(inner, outer),
            Err(DomError::NotAChild { .. })
        ));
    }

    #[test]
    fn test_removed_children_free_their_slots() {
        let mut tree = DomTree::new();
        let list = tree.create_element("ul");
        tree.append_child(tree.root(), list).unwrap();

        let mut stale = Vec::new();
        for _ in 0..50 {
            tree.remove_children(list);
            let li = tree.create_element("li");
            let text = tree.create_text("row");
            tree.append_child(list, li).unwrap();
            tree.append_child(li, text).unwrap();
            stale.push(li);
        }

        // document, ul and one live li with its text
        assert_eq!(tree.len(), 4);
        assert!(tree.capacity() <= 6);
        let live = tree.children(list)[0];
        for &old in &stale[..stale.len() - 1] {
            assert!(tree.get(old).is_none());
            assert_ne!(old, live);
            assert!(!tree.contains(list, old));
        }
    }

    #[test]
    fn test_detached_node_can_be_reinserted() {
        let mut tree = DomTree::new();
        let a = tree.create_element("div");
        let b = tree.create_element("div");
        let child = tree.create_element("p");
        tree.append_child(a, child).unwrap();

        tree.remove_child(a, child).unwrap();
        tree.append_child(b, child).unwrap();
        assert_eq!(tree.children(b), vec![child]);
        assert!(tree.children(a).is_empty());
    }

    #[test]
    fn test_descendants_preorder_skips_text() {
        let mut tree = DomTree::new();
        let root = tree.create_element("div");
        let p = tree.create_element("p");
        let t = tree.create_text("x");
        let b = tree.create_element("b");
        let i = tree.create_element("i");
        tree.append_child(root, p).unwrap();
        tree.append_child(p, t).unwrap();
        tree.append_child(p, b).unwrap();
        tree.append_child(root, i).unwrap();

        assert_eq!(tree.descendants(root), vec![p, b, i]);
    }
}
