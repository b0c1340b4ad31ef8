use super::tree::Tree;
use super::*;
use std::fmt;
use std::marker::PhantomData;
use std::ptr;

mod private {
    pub trait Sealed {}
}

/// Direction in which a cursor walks the sorted element list
pub trait Direction: private::Sealed {
    /// Whether stepping forward follows the links towards the smallest value
    #[doc(hidden)]
    const REVERSED: bool;
}

/// Walk from the smallest value to the largest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forward;

/// Walk from the largest value to the smallest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reverse;

impl private::Sealed for Forward {}
impl private::Sealed for Reverse {}

impl Direction for Forward {
    const REVERSED: bool = false;
}

impl Direction for Reverse {
    const REVERSED: bool = true;
}

/// Read-only position in a `Tree`: either on an element or past the end.
///
/// Moving back from past the end lands on the last element of the direction.
/// Reading or advancing a cursor that is past the end panics, and so does
/// moving back from the first element.
pub struct Cursor<'a, T, D: Direction = Forward> {
    tree: &'a Tree<T>,
    position: Option<ElemIdx>,
    direction: PhantomData<D>,
}

impl<'a, T, D: Direction> Cursor<'a, T, D> {
    pub(super) fn new(tree: &'a Tree<T>, position: Option<ElemIdx>) -> Self {
        Cursor {
            tree,
            position,
            direction: PhantomData,
        }
    }

    /// Return the value under the cursor, or `None` past the end
    pub fn get(&self) -> Option<&'a T> {
        let tree = self.tree;
        self.position.map(|elem| tree.value(elem))
    }

    /// Return the value under the cursor.
    /// Panics if the cursor is past the end
    pub fn value(&self) -> &'a T {
        match self.get() {
            Some(value) => value,
            None => panic!("cannot read a cursor that is past the end"),
        }
    }

    pub fn is_end(&self) -> bool {
        self.position.is_none()
    }

    pub fn move_next(&mut self) {
        self.position = self.tree.advance(self.position, D::REVERSED);
    }

    pub fn move_prev(&mut self) {
        self.position = self.tree.retreat(self.position, D::REVERSED);
    }
}

impl<'a, T, D: Direction> Clone for Cursor<'a, T, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T, D: Direction> Copy for Cursor<'a, T, D> {}

/// Position in a `Tree` holding exclusive access to it.
///
/// Besides moving like a `Cursor`, it can insert new values. It turns into a
/// read-only cursor with `freeze`; there is no way back.
pub struct CursorMut<'a, T, D: Direction = Forward> {
    tree: &'a mut Tree<T>,
    position: Option<ElemIdx>,
    direction: PhantomData<D>,
}

impl<'a, T, D: Direction> CursorMut<'a, T, D> {
    pub(super) fn new(tree: &'a mut Tree<T>, position: Option<ElemIdx>) -> Self {
        CursorMut {
            tree,
            position,
            direction: PhantomData,
        }
    }

    /// Return the value under the cursor, or `None` past the end
    pub fn get(&self) -> Option<&T> {
        let tree = &*self.tree;
        self.position.map(|elem| tree.value(elem))
    }

    /// Return the value under the cursor.
    /// Panics if the cursor is past the end
    pub fn value(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => panic!("cannot read a cursor that is past the end"),
        }
    }

    pub fn is_end(&self) -> bool {
        self.position.is_none()
    }

    pub fn move_next(&mut self) {
        self.position = self.tree.advance(self.position, D::REVERSED);
    }

    pub fn move_prev(&mut self) {
        self.position = self.tree.retreat(self.position, D::REVERSED);
    }

    /// Borrow a read-only cursor at the same position
    pub fn as_cursor(&self) -> Cursor<'_, T, D> {
        Cursor::new(&*self.tree, self.position)
    }

    /// Give up exclusive access, keeping the position
    pub fn freeze(self) -> Cursor<'a, T, D> {
        Cursor::new(self.tree, self.position)
    }
}

impl<'a, T: Ord, D: Direction> CursorMut<'a, T, D> {
    /// Insert a value into the tree and move the cursor onto it, or onto the
    /// equal value already present. Return whether it was actually inserted
    pub fn insert(&mut self, value: T) -> bool {
        let (elem, inserted) = self.tree.insert_element(value);
        self.position = Some(elem);
        inserted
    }
}

impl<'a, T, D: Direction> From<CursorMut<'a, T, D>> for Cursor<'a, T, D> {
    fn from(cursor: CursorMut<'a, T, D>) -> Self {
        cursor.freeze()
    }
}

/// Cursors are equal when they are on the same element of the same tree,
/// or both past the end of it
impl<'a, 'b, T, D: Direction> PartialEq<Cursor<'b, T, D>> for Cursor<'a, T, D> {
    fn eq(&self, other: &Cursor<'b, T, D>) -> bool {
        ptr::eq(self.tree, other.tree) && self.position == other.position
    }
}

impl<'a, T, D: Direction> Eq for Cursor<'a, T, D> {}

impl<'a, 'b, T, D: Direction> PartialEq<Cursor<'b, T, D>> for CursorMut<'a, T, D> {
    fn eq(&self, other: &Cursor<'b, T, D>) -> bool {
        ptr::eq(&*self.tree, other.tree) && self.position == other.position
    }
}

impl<'a, 'b, T, D: Direction> PartialEq<CursorMut<'b, T, D>> for Cursor<'a, T, D> {
    fn eq(&self, other: &CursorMut<'b, T, D>) -> bool {
        other == self
    }
}

impl<'a, T: fmt::Debug, D: Direction> fmt::Debug for Cursor<'a, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get()).finish()
    }
}

impl<'a, T: fmt::Debug, D: Direction> fmt::Debug for CursorMut<'a, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.get()).finish()
    }
}
