use super::cursor::{Cursor, CursorMut, Reverse};
use super::node::{Element, Node};
use super::tree_iter::{BreadthFirst, Iter};
use super::*;
use crate::error::{Error, Result};
use log::{debug, trace};
use std::fmt;
use std::iter::FromIterator;
use std::mem;

/// A sorted set stored as a multiway search tree.
///
/// Every element is also threaded into a doubly-linked list in sorted order,
/// so cursors and iterators move one element in O(1) whatever the shape of the
/// tree. Nodes are never split or rebalanced: when a node is full, new values
/// are pushed into a child hanging from the gap they fall in. Inserting sorted
/// runs into a full region therefore grows long chains of one-element nodes,
/// and `find`/`insert` degrade to O(depth).
///
/// All nodes and elements live in two arenas owned by the tree and refer to
/// each other by index, so dropping a tree never recurses.
pub struct Tree<T> {
    max_elements: usize,
    nodes: Vec<Node>,
    elements: Vec<Element<T>>,
    head: Option<ElemIdx>,
    tail: Option<ElemIdx>,
}

impl<T> Tree<T> {
    /// Create an empty tree whose nodes hold up to `DEFAULT_MAX_ELEMENTS` elements
    pub fn new() -> Self {
        Tree::empty(DEFAULT_MAX_ELEMENTS)
    }

    /// Create an empty tree whose nodes hold up to `max_elements` elements
    pub fn with_max_elements(max_elements: usize) -> Result<Self> {
        if max_elements == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(Tree::empty(max_elements))
    }

    fn empty(max_elements: usize) -> Self {
        Tree {
            max_elements,
            nodes: vec![Node::default()],
            elements: Vec::new(),
            head: None,
            tail: None,
        }
    }

    /// Return the node capacity this tree was built with
    pub fn max_elements(&self) -> usize {
        self.max_elements
    }

    /// Return the total number of values in the tree
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Return the smallest value
    pub fn first(&self) -> Option<&T> {
        self.head.map(|elem| self.value(elem))
    }

    /// Return the largest value
    pub fn last(&self) -> Option<&T> {
        self.tail.map(|elem| self.value(elem))
    }

    /// Move the whole content out, leaving an empty tree with the same
    /// capacity behind. No element is copied
    pub fn take(&mut self) -> Self {
        let max_elements = self.max_elements;
        mem::replace(self, Tree::empty(max_elements))
    }

    /// Return a sorted iterator over references to the values
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self, self.head, self.tail, self.len())
    }

    /// Return an iterator visiting the values level by level, starting from
    /// the root. Inside a node, the children are queued in element order and
    /// the overflow child last
    pub fn breadth_first(&self) -> BreadthFirst<'_, T> {
        BreadthFirst::new(self, ROOT)
    }

    /// Cursor at the smallest value, walking upwards
    pub fn begin(&mut self) -> CursorMut<'_, T> {
        let head = self.head;
        CursorMut::new(self, head)
    }

    /// Past-the-end cursor walking upwards
    pub fn end(&mut self) -> CursorMut<'_, T> {
        CursorMut::new(self, None)
    }

    /// Cursor at the largest value, walking downwards
    pub fn rbegin(&mut self) -> CursorMut<'_, T, Reverse> {
        let tail = self.tail;
        CursorMut::new(self, tail)
    }

    /// Past-the-end cursor walking downwards
    pub fn rend(&mut self) -> CursorMut<'_, T, Reverse> {
        CursorMut::new(self, None)
    }

    pub fn cbegin(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.head)
    }

    pub fn cend(&self) -> Cursor<'_, T> {
        Cursor::new(self, None)
    }

    pub fn crbegin(&self) -> Cursor<'_, T, Reverse> {
        Cursor::new(self, self.tail)
    }

    pub fn crend(&self) -> Cursor<'_, T, Reverse> {
        Cursor::new(self, None)
    }

    pub(super) fn value(&self, elem: ElemIdx) -> &T {
        &self.elements[elem as usize].value
    }

    pub(super) fn node(&self, node: NodeIdx) -> &Node {
        &self.nodes[node as usize]
    }

    pub(super) fn element(&self, elem: ElemIdx) -> &Element<T> {
        &self.elements[elem as usize]
    }

    /// Return the element one step away from `elem` in list order,
    /// towards the tail or, if `reversed`, towards the head
    pub(super) fn step(&self, elem: ElemIdx, reversed: bool) -> Option<ElemIdx> {
        let element = self.element(elem);
        if reversed {
            element.prev
        } else {
            element.next
        }
    }

    /// Return the first element of the list read in the given direction
    pub(super) fn front(&self, reversed: bool) -> Option<ElemIdx> {
        if reversed {
            self.tail
        } else {
            self.head
        }
    }

    /// Advance a cursor position by one step.
    /// Panics if the position is already past the end
    pub(super) fn advance(&self, position: Option<ElemIdx>, reversed: bool) -> Option<ElemIdx> {
        match position {
            Some(elem) => self.step(elem, reversed),
            None => panic!("cannot advance a cursor that is past the end"),
        }
    }

    /// Move a cursor position one step back. From past the end this lands on
    /// the last element of the direction.
    /// Panics if there is nothing before the position
    pub(super) fn retreat(&self, position: Option<ElemIdx>, reversed: bool) -> Option<ElemIdx> {
        let target = match position {
            Some(elem) => self.step(elem, !reversed),
            None => self.front(!reversed),
        };
        assert!(
            target.is_some(),
            "cannot move a cursor before the first element"
        );
        target
    }

    /// Add an element with the given links to the arena
    fn push_element(
        &mut self,
        value: T,
        prev: Option<ElemIdx>,
        next: Option<ElemIdx>,
    ) -> ElemIdx {
        let elem = self.elements.len();
        assert!(elem < ElemIdx::MAX as usize, "too many elements in tree");
        self.elements.push(Element::new(value, prev, next));
        elem as ElemIdx
    }

    /// Add a node to the arena
    fn push_node(&mut self, node: Node) -> NodeIdx {
        let idx = self.nodes.len();
        assert!(idx < NodeIdx::MAX as usize, "too many nodes in tree");
        self.nodes.push(node);
        idx as NodeIdx
    }

    /// Create a new element and splice it into the list between `prev` and
    /// `next`, which must be adjacent. Head and tail follow
    fn link_element(&mut self, value: T, prev: Option<ElemIdx>, next: Option<ElemIdx>) -> ElemIdx {
        let elem = self.push_element(value, prev, next);
        match prev {
            Some(prev) => self.elements[prev as usize].next = Some(elem),
            None => self.head = Some(elem),
        }
        match next {
            Some(next) => self.elements[next as usize].prev = Some(elem),
            None => self.tail = Some(elem),
        }
        elem
    }

    /// Return the list neighbours of the gap at `index` in `node`.
    /// The node must not be empty
    fn gap_neighbours(&self, node: NodeIdx, index: usize) -> (Option<ElemIdx>, Option<ElemIdx>) {
        let elements = &self.node(node).elements;
        match elements.get(index) {
            Some(&next) => (self.element(next).prev, Some(next)),
            None => {
                let prev = elements[elements.len() - 1];
                (Some(prev), self.element(prev).next)
            }
        }
    }
}

impl<T: Ord> Tree<T> {
    /// Return a cursor at `value`, or the past-the-end cursor if it is absent
    pub fn find(&self, value: &T) -> Cursor<'_, T> {
        Cursor::new(self, self.find_element(value))
    }

    /// Same as `find`, returning a cursor that keeps exclusive access to the tree
    pub fn find_mut(&mut self, value: &T) -> CursorMut<'_, T> {
        let position = self.find_element(value);
        CursorMut::new(self, position)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.find_element(value).is_some()
    }

    /// Insert a value into the tree.
    /// Return a cursor at the stored value and whether it was actually inserted.
    /// An equal value already present is kept and the tree is left unchanged
    pub fn insert(&mut self, value: T) -> (CursorMut<'_, T>, bool) {
        let (elem, inserted) = self.insert_element(value);
        (CursorMut::new(self, Some(elem)), inserted)
    }

    /// Walk down from the root, following the child of the gap the value falls in
    pub(super) fn find_element(&self, value: &T) -> Option<ElemIdx> {
        let mut current = ROOT;
        loop {
            let node = self.node(current);
            match node.locate(&self.elements, value) {
                Located::Found(index) => return Some(node.elements[index]),
                Located::Vacant(index) => current = node.child_at(&self.elements, index)?,
            }
        }
    }

    /// Implementation of `insert`, returning the element index
    pub(super) fn insert_element(&mut self, value: T) -> (ElemIdx, bool) {
        if self.head.is_none() {
            // First value: sole element of the root, both head and tail
            let elem = self.link_element(value, None, None);
            self.nodes[ROOT as usize].elements.push(elem);
            return (elem, true);
        }

        let mut current = ROOT;
        loop {
            let node = self.node(current);
            let index = match node.locate(&self.elements, &value) {
                Located::Found(index) => return (node.elements[index], false),
                Located::Vacant(index) => index,
            };

            if node.len() < self.max_elements {
                // Room left: the value joins this node
                let (prev, next) = self.gap_neighbours(current, index);
                let elem = self.link_element(value, prev, next);
                self.nodes[current as usize].elements.insert(index, elem);
                return (elem, true);
            }

            match node.child_at(&self.elements, index) {
                Some(child) => current = child,
                None => {
                    // Full node without a child in that gap: grow one
                    let (prev, next) = self.gap_neighbours(current, index);
                    let elem = self.link_element(value, prev, next);
                    let child = self.push_node(Node::with_element(elem));
                    self.nodes[current as usize].set_child_at(&mut self.elements, index, child);
                    trace!(
                        "created node {} below full node {} at gap {}",
                        child,
                        current,
                        index
                    );
                    return (elem, true);
                }
            }
        }
    }
}

/// One unit of work of the deep copy
enum CopyStep {
    /// Copy the source node into the (already allocated) destination node
    Enter { source: NodeIdx, dest: NodeIdx },
    /// Append a copy of the source element to the destination node.
    /// `child` is the destination node its child subtree was copied into
    Append {
        source: ElemIdx,
        dest: NodeIdx,
        child: Option<NodeIdx>,
    },
}

impl<T: Clone> Tree<T> {
    /// Rebuild `dest` as a deep copy of `self`, reusing its allocations.
    ///
    /// Nodes are visited in pre-order with an explicit stack. A child subtree
    /// is fully copied before the element that owns it, so values come out in
    /// sorted order and each new element is linked right after the previously
    /// copied one, across subtree boundaries.
    fn copy_into(&self, dest: &mut Tree<T>) {
        dest.max_elements = self.max_elements;
        dest.nodes.clear();
        dest.elements.clear();
        dest.head = None;
        dest.tail = None;
        dest.nodes.reserve(self.nodes.len());
        dest.elements.reserve(self.elements.len());
        let root = dest.push_node(Node::default());

        let mut previous = None;
        let mut stack = vec![CopyStep::Enter {
            source: ROOT,
            dest: root,
        }];
        while let Some(step) = stack.pop() {
            match step {
                CopyStep::Enter { source, dest: node } => {
                    let source = self.node(source);
                    // Pushed in reverse, so the overflow child comes out last
                    if let Some(overflow) = source.overflow {
                        let copy = dest.push_node(Node::default());
                        dest.nodes[node as usize].overflow = Some(copy);
                        stack.push(CopyStep::Enter {
                            source: overflow,
                            dest: copy,
                        });
                    }
                    for &elem in source.elements.iter().rev() {
                        let child = self
                            .element(elem)
                            .child
                            .map(|child| (child, dest.push_node(Node::default())));
                        stack.push(CopyStep::Append {
                            source: elem,
                            dest: node,
                            child: child.map(|(_, copy)| copy),
                        });
                        if let Some((child, copy)) = child {
                            stack.push(CopyStep::Enter {
                                source: child,
                                dest: copy,
                            });
                        }
                    }
                }
                CopyStep::Append {
                    source,
                    dest: node,
                    child,
                } => {
                    let value = self.value(source).clone();
                    let elem = dest.link_element(value, previous, None);
                    dest.elements[elem as usize].child = child;
                    dest.nodes[node as usize].elements.push(elem);
                    previous = Some(elem);
                }
            }
        }
        debug!(
            "copied tree of {} elements in {} nodes",
            dest.elements.len(),
            dest.nodes.len()
        );
    }
}

impl<T: Clone> Clone for Tree<T> {
    fn clone(&self) -> Self {
        let mut tree = Tree::empty(self.max_elements);
        self.copy_into(&mut tree);
        tree
    }

    fn clone_from(&mut self, source: &Self) {
        source.copy_into(self);
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Tree::new()
    }
}

impl<T: Ord> FromIterator<T> for Tree<T> {
    /// Build a tree with the default capacity. Repeated values are kept once
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Tree::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for Tree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert_element(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Two trees are equal when they hold the same values, whatever their shape
impl<T: PartialEq> PartialEq for Tree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Tree<T> {}

impl<T: fmt::Debug> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Breadth-first dump of the values, separated by single spaces
impl<T: fmt::Display> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.breadth_first().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl<T: Ord + fmt::Debug> Tree<T> {
    /// Check every structural invariant against an independent in-order
    /// walk of the nodes. Panics on the first violation
    pub(crate) fn check_invariants(&self) {
        enum Visit {
            Node(NodeIdx),
            Element(ElemIdx),
        }

        // In-order walk of the node structure
        let mut in_order = Vec::with_capacity(self.len());
        let mut stack = vec![Visit::Node(ROOT)];
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Node(node) => {
                    let node = self.node(node);
                    assert!(node.len() <= self.max_elements, "node over capacity");
                    let has_children = node.overflow.is_some()
                        || node.elements.iter().any(|&e| self.element(e).child.is_some());
                    assert!(
                        !has_children || node.len() == self.max_elements,
                        "node with children is not full"
                    );
                    if let Some(overflow) = node.overflow {
                        stack.push(Visit::Node(overflow));
                    }
                    for &elem in node.elements.iter().rev() {
                        stack.push(Visit::Element(elem));
                        if let Some(child) = self.element(elem).child {
                            stack.push(Visit::Node(child));
                        }
                    }
                }
                Visit::Element(elem) => in_order.push(elem),
            }
        }
        assert_eq!(in_order.len(), self.len(), "unreachable elements");
        for pair in in_order.windows(2) {
            assert!(
                self.value(pair[0]) < self.value(pair[1]),
                "values out of order: {:?} then {:?}",
                self.value(pair[0]),
                self.value(pair[1])
            );
        }

        // The list must visit exactly the same elements
        assert_eq!(self.head, in_order.first().copied(), "wrong head");
        assert_eq!(self.tail, in_order.last().copied(), "wrong tail");
        let mut previous = None;
        let mut current = self.head;
        let mut listed = Vec::with_capacity(self.len());
        while let Some(elem) = current {
            assert_eq!(self.element(elem).prev, previous, "broken prev link");
            assert!(listed.len() < self.len(), "cycle in the list");
            listed.push(elem);
            previous = current;
            current = self.element(elem).next;
        }
        assert_eq!(listed, in_order, "list disagrees with the tree");
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn helper_tree<T: Ord + fmt::Debug>(max_elements: usize, values: Vec<T>) -> Tree<T> {
        let mut tree = Tree::with_max_elements(max_elements).unwrap();
        for value in values {
            tree.insert_element(value);
            tree.check_invariants();
        }
        tree
    }

    fn helper_collect<T: Clone>(tree: &Tree<T>) -> Vec<T> {
        tree.iter().cloned().collect()
    }

    /// Build a chain of `depth` one-element nodes linked through their overflow child
    fn helper_overflow_chain(depth: u32) -> Tree<u32> {
        let mut tree = Tree::with_max_elements(1).unwrap();
        let mut node = ROOT;
        for value in 0..depth {
            let tail = tree.tail;
            let elem = tree.link_element(value, tail, None);
            tree.nodes[node as usize].elements.push(elem);
            if value + 1 < depth {
                let next = tree.push_node(Node::default());
                tree.nodes[node as usize].overflow = Some(next);
                node = next;
            }
        }
        tree
    }

    #[test]
    fn zero_capacity() {
        assert_eq!(
            Tree::<i32>::with_max_elements(0).err(),
            Some(Error::ZeroCapacity)
        );
        assert_eq!(Tree::<i32>::with_max_elements(1).unwrap().max_elements(), 1);
        assert_eq!(Tree::<i32>::new().max_elements(), DEFAULT_MAX_ELEMENTS);
    }

    #[test]
    fn empty() {
        let tree: Tree<i32> = Tree::new();
        tree.check_invariants();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.first(), None);
        assert_eq!(tree.find_element(&3), None);
        assert_eq!(tree.to_string(), "");
    }

    #[test]
    fn fill_root() {
        let tree = helper_tree(4, vec![30, 10, 40, 20]);
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.node(ROOT).len(), 4);
        assert_eq!(helper_collect(&tree), vec![10, 20, 30, 40]);
    }

    #[test]
    fn grow_children() {
        let mut tree = helper_tree(2, vec![10, 20]);

        // One child per gap, created on demand
        tree.insert_element(5);
        tree.insert_element(15);
        tree.insert_element(25);
        tree.check_invariants();
        assert_eq!(tree.nodes.len(), 4);
        let root = tree.node(ROOT);
        assert_eq!(root.len(), 2);
        for (index, expected) in vec![5, 15, 25].into_iter().enumerate() {
            let child = root.child_at(&tree.elements, index).unwrap();
            assert_eq!(tree.node(child).len(), 1);
            assert_eq!(*tree.value(tree.node(child).elements[0]), expected);
        }

        // Children fill up before growing their own
        tree.insert_element(12);
        tree.insert_element(13);
        tree.check_invariants();
        assert_eq!(tree.nodes.len(), 5);
        assert_eq!(helper_collect(&tree), vec![5, 10, 12, 13, 15, 20, 25]);
        assert_eq!(tree.to_string(), "10 20 5 12 15 25 13");
    }

    #[test]
    fn head_and_tail() {
        let mut tree = helper_tree(1, vec![50]);
        tree.insert_element(40);
        assert_eq!(tree.first(), Some(&40));
        tree.insert_element(60);
        assert_eq!(tree.last(), Some(&60));
        tree.insert_element(30);
        tree.insert_element(70);
        tree.check_invariants();
        assert_eq!(tree.first(), Some(&30));
        assert_eq!(tree.last(), Some(&70));
    }

    #[test]
    fn duplicates() {
        let mut tree = helper_tree(2, vec![3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5]);
        assert_eq!(tree.len(), 7);
        let nodes = tree.nodes.len();
        let (elem, inserted) = tree.insert_element(9);
        assert!(!inserted);
        assert_eq!(*tree.value(elem), 9);
        assert_eq!(tree.nodes.len(), nodes);
        assert_eq!(helper_collect(&tree), vec![1, 2, 3, 4, 5, 6, 9]);
    }

    #[test]
    fn find_in_deep_tree() {
        let values = (0..500).map(|x| (x * 7919) % 1000).collect::<Vec<_>>();
        let tree = helper_tree(3, values.clone());
        for value in values {
            let elem = tree.find_element(&value).unwrap();
            assert_eq!(*tree.value(elem), value);
        }
        assert_eq!(tree.find_element(&-1), None);
        assert_eq!(tree.find_element(&1000), None);
    }

    #[test]
    fn copy() {
        let source = helper_tree(2, vec![20, 10, 15, 5, 25, 12, 13, 30, 1]);
        let copy = source.clone();
        copy.check_invariants();
        assert_eq!(copy.max_elements(), 2);
        assert_eq!(copy.nodes.len(), source.nodes.len());
        assert_eq!(helper_collect(&copy), helper_collect(&source));
        assert_eq!(copy.to_string(), source.to_string());
    }

    #[test]
    fn copy_from() {
        let source = helper_tree(3, (0..40).rev().collect());
        let mut dest = helper_tree(5, vec![100, 200]);
        dest.clone_from(&source);
        dest.check_invariants();
        assert_eq!(dest.max_elements(), 3);
        assert_eq!(helper_collect(&dest), (0..40).collect::<Vec<_>>());

        dest.clone_from(&Tree::new());
        dest.check_invariants();
        assert!(dest.is_empty());
        assert_eq!(dest.max_elements(), DEFAULT_MAX_ELEMENTS);
    }

    #[test]
    fn take() {
        let mut source = helper_tree(3, vec![8, 3, 5, 1]);
        let moved = source.take();
        source.check_invariants();
        moved.check_invariants();
        assert!(source.is_empty());
        assert_eq!(source.nodes.len(), 1);
        assert_eq!(source.max_elements(), 3);
        assert_eq!(helper_collect(&moved), vec![1, 3, 5, 8]);

        // The moved-from tree is still usable
        source.insert_element(2);
        source.check_invariants();
        assert_eq!(helper_collect(&source), vec![2]);
    }

    #[test]
    fn deep_chain() {
        let depth = 200_000;
        let mut tree = helper_overflow_chain(depth);
        tree.check_invariants();
        assert_eq!(tree.nodes.len(), depth as usize);

        let (elem, inserted) = tree.insert_element(depth);
        assert!(inserted);
        assert_eq!(tree.last(), Some(&depth));
        assert_eq!(tree.find_element(&depth), Some(elem));

        let copy = tree.clone();
        copy.check_invariants();
        assert_eq!(copy.len(), depth as usize + 1);
        drop(tree);
        drop(copy);
    }

    #[test]
    fn equality() {
        let a = helper_tree(1, vec![1, 2, 3]);
        let b = helper_tree(40, vec![3, 2, 1]);
        let c = helper_tree(40, vec![1, 2]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(format!("{:?}", a), "{1, 2, 3}");
    }

    #[test]
    fn from_iter() {
        let tree: Tree<i32> = vec![5, 3, 5, 1, 3].into_iter().collect();
        tree.check_invariants();
        assert_eq!(helper_collect(&tree), vec![1, 3, 5]);

        let mut tree = tree;
        tree.extend(vec![4, 2, 6]);
        tree.check_invariants();
        assert_eq!(helper_collect(&tree), vec![1, 2, 3, 4, 5, 6]);
    }
}
