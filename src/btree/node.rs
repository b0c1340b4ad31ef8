use super::*;

/// One stored value, threaded into the global sorted list
pub(super) struct Element<T> {
    pub(super) value: T,
    pub(super) prev: Option<ElemIdx>,
    pub(super) next: Option<ElemIdx>,
    /// Node holding the values between this element and the one before it in the same node
    pub(super) child: Option<NodeIdx>,
}

impl<T> Element<T> {
    pub(super) fn new(value: T, prev: Option<ElemIdx>, next: Option<ElemIdx>) -> Self {
        Element {
            value,
            prev,
            next,
            child: None,
        }
    }
}

/// One level of branching: a sorted run of elements plus the child
/// holding everything greater than the last of them
#[derive(Default)]
pub(super) struct Node {
    pub(super) elements: Vec<ElemIdx>,
    pub(super) overflow: Option<NodeIdx>,
}

impl Node {
    /// Build a node holding a single element
    pub(super) fn with_element(element: ElemIdx) -> Self {
        Node {
            elements: vec![element],
            overflow: None,
        }
    }

    /// Return the total number of elements in this node
    pub(super) fn len(&self) -> usize {
        self.elements.len()
    }

    /// Binary search for `value` among this node's elements.
    /// `arena` is the element storage the node indexes into
    pub(super) fn locate<T: Ord>(&self, arena: &[Element<T>], value: &T) -> Located {
        match self
            .elements
            .binary_search_by(|&elem| arena[elem as usize].value.cmp(value))
        {
            Ok(index) => Located::Found(index),
            Err(index) => Located::Vacant(index),
        }
    }

    /// Return the child covering the gap at `index`: the element's own child,
    /// or the overflow child for the position after the last element
    pub(super) fn child_at<T>(&self, arena: &[Element<T>], index: usize) -> Option<NodeIdx> {
        match self.elements.get(index) {
            Some(&elem) => arena[elem as usize].child,
            None => self.overflow,
        }
    }

    /// Attach `child` to the gap at `index`.
    /// Panics if that gap already has a child
    pub(super) fn set_child_at<T>(
        &mut self,
        arena: &mut [Element<T>],
        index: usize,
        child: NodeIdx,
    ) {
        let slot = match self.elements.get(index) {
            Some(&elem) => &mut arena[elem as usize].child,
            None => &mut self.overflow,
        };
        assert!(slot.is_none(), "gap {} already has a child", index);
        *slot = Some(child);
    }
}
