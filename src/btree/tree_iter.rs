use super::*;
use super::tree::Tree;
use std::collections::VecDeque;
use std::iter::FusedIterator;

/// Sorted iterator over the values of a `Tree`, following the element list.
/// Each step is O(1) and the nodes are never visited
pub struct Iter<'a, T> {
    tree: &'a Tree<T>,
    /// Next element to return from the front
    front: Option<ElemIdx>,
    /// Next element to return from the back
    back: Option<ElemIdx>,
    /// Elements left between `front` and `back`, both included
    len: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(
        tree: &'a Tree<T>,
        front: Option<ElemIdx>,
        back: Option<ElemIdx>,
        len: usize,
    ) -> Self {
        Iter {
            tree,
            front,
            back,
            len,
        }
    }
}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            len: self.len,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let elem = self.front?;
        self.len -= 1;
        self.front = self.tree.step(elem, false);
        Some(self.tree.value(elem))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let elem = self.back?;
        self.len -= 1;
        self.back = self.tree.step(elem, true);
        Some(self.tree.value(elem))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
impl<'a, T> FusedIterator for Iter<'a, T> {}

/// Level-order iterator over the values of a `Tree`
pub struct BreadthFirst<'a, T> {
    tree: &'a Tree<T>,
    /// Nodes waiting to be visited
    queue: VecDeque<NodeIdx>,
    /// The current node and the next element position to return
    current: Option<(NodeIdx, usize)>,
}

impl<'a, T> BreadthFirst<'a, T> {
    pub(super) fn new(tree: &'a Tree<T>, root: NodeIdx) -> Self {
        BreadthFirst {
            tree,
            queue: VecDeque::new(),
            current: Some((root, 0)),
        }
    }
}

impl<'a, T> Iterator for BreadthFirst<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        loop {
            if let Some((node_idx, pos)) = self.current {
                let node = tree.node(node_idx);
                match node.elements.get(pos) {
                    Some(&elem) => {
                        let element = tree.element(elem);
                        if let Some(child) = element.child {
                            self.queue.push_back(child);
                        }
                        self.current = Some((node_idx, pos + 1));
                        return Some(&element.value);
                    }
                    None => {
                        // Node exhausted: its last child goes after the others
                        if let Some(overflow) = node.overflow {
                            self.queue.push_back(overflow);
                        }
                    }
                }
            }
            self.current = Some((self.queue.pop_front()?, 0));
        }
    }
}

impl<'a, T> FusedIterator for BreadthFirst<'a, T> {}
