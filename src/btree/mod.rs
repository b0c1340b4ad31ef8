mod cursor;
mod node;
mod tree;
mod tree_iter;

pub use cursor::{Cursor, CursorMut, Direction, Forward, Reverse};
pub use tree::Tree;
pub use tree_iter::{BreadthFirst, Iter};

/// Node capacity used by `Tree::new`
pub const DEFAULT_MAX_ELEMENTS: usize = 40;

/// Index into the node arena
type NodeIdx = u32;
/// Index into the element arena
type ElemIdx = u32;

/// The root node is always the first one in the arena
const ROOT: NodeIdx = 0;

/// Outcome of a binary search inside a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Located {
    /// The value is stored at this position
    Found(usize),
    /// The value is not in this node and would go at this position
    /// (`len` meaning after the last element)
    Vacant(usize),
}
