//! Id-reference resolution and the ownership context
//!
//! `aria-labelledby`, `aria-describedby` and `aria-owns` hold whitespace
//! separated id lists. Following them leaves the DOM subtree being named, so
//! every followed reference opens a frame in the `OwnershipContext`:
//!
//! ```text
//! frame 0: top = root
//! frame 1: top = label target   (referrer = root)
//! frame 2: top = owned target   (referrer = node declaring aria-owns)
//! ```
//!
//! Ancestor walks stop at the current frame's `top` and continue from its
//! referrer, never into unrelated document ancestors.
//!
//! The owns ledger records each `aria-owns` id once per computation. A second
//! grant of the same id is rejected, which is what terminates cyclic
//! ownership graphs.

use crate::error::Result;
use crate::oracle::TreeAccessor;
use ahash::AHashSet;
use dom::NodeId;
use smallvec::SmallVec;

/// Split an id list on whitespace
pub fn split_ids(list: &str) -> impl Iterator<Item = &str> {
    list.split_whitespace()
}

/// Resolve an id list, skipping ids that match no element
pub fn resolve_ids(tree: &dyn TreeAccessor, list: &str) -> SmallVec<[NodeId; 4]> {
    split_ids(list)
        .filter_map(|id| {
            let found = tree.element_by_id(id);
            if found.is_none() {
                tracing::trace!(id, "unresolved id reference");
            }
            found
        })
        .collect()
}

/// One followed reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Boundary node of the frame
    pub top: NodeId,
    /// Node whose attribute pointed at `top`
    pub referrer: Option<NodeId>,
}

/// One `aria-owns` grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnsEntry {
    pub id: String,
    /// Reference node of the frame the grant was found in
    pub referencing: NodeId,
    /// Node carrying the `aria-owns` attribute
    pub declaring: NodeId,
    pub target: NodeId,
}

/// Frame chain plus owns ledger for one computation
#[derive(Debug)]
pub struct OwnershipContext {
    frames: Vec<Frame>,
    owns: Vec<OwnsEntry>,
}

impl OwnershipContext {
    pub fn new(root: NodeId) -> Self {
        Self {
            frames: vec![Frame {
                top: root,
                referrer: None,
            }],
            owns: Vec::new(),
        }
    }

    /// Node the computation started from
    pub fn root(&self) -> NodeId {
        self.frames[0].top
    }

    pub fn push_frame(&mut self, top: NodeId, referrer: Option<NodeId>) {
        self.frames.push(Frame { top, referrer });
    }

    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Record an `aria-owns` grant
    ///
    /// Returns `false` (and records nothing) when `id` is already in the
    /// ledger.
    pub fn enter_ownership(
        &mut self,
        id: &str,
        referencing: NodeId,
        declaring: NodeId,
        target: NodeId,
    ) -> bool {
        if self.owns.iter().any(|entry| entry.id == id) {
            tracing::trace!(id, declaring, "ownership already granted, not following");
            return false;
        }
        self.owns.push(OwnsEntry {
            id: id.to_string(),
            referencing,
            declaring,
            target,
        });
        true
    }

    /// Node that owns `target` through a recorded grant
    pub fn owner_of(&self, target: NodeId) -> Option<NodeId> {
        self.owns
            .iter()
            .find(|entry| entry.target == target)
            .map(|entry| entry.declaring)
    }

    pub fn ledger(&self) -> &[OwnsEntry] {
        &self.owns
    }

    /// Ancestors of `node` along the referencing chain
    ///
    /// Walks DOM parents up to the current frame's top, then continues from
    /// that frame's referrer in the enclosing frame, out to the root frame.
    /// The frame tops and referrers are included.
    pub fn referencing_ancestors(
        &self,
        tree: &dyn TreeAccessor,
        node: NodeId,
    ) -> Result<Vec<NodeId>> {
        let mut chain = Vec::new();
        let mut seen = AHashSet::new();
        let mut level = self.frames.len() - 1;
        let mut current = node;

        loop {
            if current == self.frames[level].top {
                match self.frames[level].referrer {
                    Some(referrer) if level > 0 => {
                        level -= 1;
                        current = referrer;
                    }
                    _ => break,
                }
            } else {
                match tree.parent(current)? {
                    Some(parent) => current = parent,
                    None => break,
                }
            }
            if !seen.insert(current) {
                break;
            }
            chain.push(current);
        }

        Ok(chain)
    }
}
