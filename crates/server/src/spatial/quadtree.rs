//! Region quadtree over arena entities.
//!
//! Each item is stored in the deepest node whose boundary fully contains
//! it. Items straddling a split line stay in the parent. The arena rebuilds
//! the tree from scratch every tick, so there is no in-place update.

use crate::geometry::{Rect, Shape};

/// An item stored in the QuadTree.
#[derive(Debug, Clone, Copy)]
pub struct QuadItem {
    /// Entity id.
    pub id: u32,
    /// Shape the item occupies.
    pub bound: Shape,
}

impl QuadItem {
    #[inline]
    pub fn new(id: u32, bound: impl Into<Shape>) -> Self {
        Self { id, bound: bound.into() }
    }
}

#[derive(Debug)]
struct QuadNode {
    boundary: Rect,
    depth: u32,
    items: Vec<QuadItem>,
    children: Option<Box<[QuadNode; 4]>>,
}

impl QuadNode {
    fn new(boundary: Rect, depth: u32) -> Self {
        Self {
            boundary,
            depth,
            items: Vec::new(),
            children: None,
        }
    }

    fn insert(&mut self, item: QuadItem, max_objects: usize, max_depth: u32) {
        if let Some(children) = self.children.as_deref_mut() {
            if let Some(child) = children.iter_mut().find(|c| item.bound.fits_within(&c.boundary)) {
                child.insert(item, max_objects, max_depth);
                return;
            }
        }

        self.items.push(item);

        if self.children.is_none() && self.items.len() > max_objects && self.depth < max_depth {
            self.split(max_objects, max_depth);
        }
    }

    fn split(&mut self, max_objects: usize, max_depth: u32) {
        let depth = self.depth + 1;
        let [a, b, c, d] = self.boundary.quadrants();
        self.children = Some(Box::new([
            QuadNode::new(a, depth),
            QuadNode::new(b, depth),
            QuadNode::new(c, depth),
            QuadNode::new(d, depth),
        ]));

        // Push down everything that now fits a child.
        for item in std::mem::take(&mut self.items) {
            self.insert(item, max_objects, max_depth);
        }
    }

    fn remove(&mut self, id: u32, bound: &Shape) -> bool {
        if let Some(pos) = self.items.iter().position(|i| i.id == id) {
            self.items.swap_remove(pos);
            self.collapse_if_empty();
            return true;
        }

        let removed = match self.children.as_deref_mut() {
            Some(children) => children
                .iter_mut()
                .filter(|c| bound.fits_within(&c.boundary))
                .any(|c| c.remove(id, bound)),
            None => false,
        };
        if removed {
            self.collapse_if_empty();
        }
        removed
    }

    fn collapse_if_empty(&mut self) {
        if self.children.is_some() && self.is_empty() {
            self.children = None;
        }
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
            && self
                .children
                .as_deref()
                .is_none_or(|children| children.iter().all(QuadNode::is_empty))
    }

    fn query(&self, shape: &Shape, out: &mut Vec<u32>) {
        if !shape.intersects(&Shape::Rect(self.boundary)) {
            return;
        }

        out.extend(self.items.iter().filter(|i| i.bound.intersects(shape)).map(|i| i.id));

        if let Some(children) = self.children.as_deref() {
            for child in children {
                child.query(shape, out);
            }
        }
    }

    fn max_depth(&self) -> u32 {
        match self.children.as_deref() {
            Some(children) => children.iter().map(QuadNode::max_depth).max().unwrap_or(self.depth),
            None => self.depth,
        }
    }
}

/// QuadTree for spatial queries over the arena.
#[derive(Debug)]
pub struct QuadTree {
    root: QuadNode,
    max_objects: usize,
    max_depth: u32,
    len: usize,
}

impl QuadTree {
    /// Create an empty tree covering `boundary`.
    ///
    /// A node splits once it holds more than `max_objects` items of its own,
    /// unless it is already at `max_depth` (the root is depth 1).
    pub fn new(boundary: Rect, max_objects: usize, max_depth: u32) -> Self {
        Self {
            root: QuadNode::new(boundary, 1),
            max_objects,
            max_depth: max_depth.max(1),
            len: 0,
        }
    }

    #[inline]
    pub fn boundary(&self) -> Rect {
        self.root.boundary
    }

    pub fn insert(&mut self, item: QuadItem) {
        self.root.insert(item, self.max_objects, self.max_depth);
        self.len += 1;
    }

    /// Remove the item with `id`, which must still occupy `bound`.
    ///
    /// Returns whether the item was found.
    pub fn remove(&mut self, id: u32, bound: &Shape) -> bool {
        let removed = self.root.remove(id, bound);
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Ids of every item whose shape intersects `shape`.
    pub fn query(&self, shape: &Shape) -> Vec<u32> {
        let mut out = Vec::new();
        self.query_into(shape, &mut out);
        out
    }

    /// Like [`QuadTree::query`] but appends into a caller-owned buffer.
    #[inline]
    pub fn query_into(&self, shape: &Shape, out: &mut Vec<u32>) {
        self.root.query(shape, out);
    }

    /// Deepest level currently in use.
    pub fn depth(&self) -> u32 {
        self.root.max_depth()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
