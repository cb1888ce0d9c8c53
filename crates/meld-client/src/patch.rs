//! Patch
//!
//! DOM reconciliation is supplied by the host: it morphs the live subtree at
//! `root` to match a server-rendered fragment.

use meld_dom::{Document, NodeId};

use crate::PatchError;

/// Reconciles a live subtree against a new fragment, in place
pub trait Patch {
    fn apply(&mut self, document: &mut Document, root: NodeId, fragment: &str) -> Result<(), PatchError>;
}

impl<F> Patch for F
where
    F: FnMut(&mut Document, NodeId, &str) -> Result<(), PatchError>,
{
    fn apply(&mut self, document: &mut Document, root: NodeId, fragment: &str) -> Result<(), PatchError> {
        self(document, root, fragment)
    }
}

/// Leaves the DOM untouched, for sessions that never request markup
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPatch;

impl Patch for NoopPatch {
    fn apply(&mut self, _document: &mut Document, root: NodeId, fragment: &str) -> Result<(), PatchError> {
        tracing::trace!("Ignoring {} byte fragment for {:?}", fragment.len(), root);
        Ok(())
    }
}
