//! A sorted set built as a multiway search tree whose elements are also
//! threaded into one doubly-linked list in sorted order.
//!
//! Lookups and insertions walk the tree; iteration and cursor moves only follow
//! the list, so every step is O(1) whatever the shape of the tree.
//!
//! ```
//! use threaded_btree::Tree;
//!
//! let mut tree = Tree::with_max_elements(4).unwrap();
//! for letter in vec!['M', 'X', 'P', 'G'] {
//!     tree.insert(letter);
//! }
//! assert_eq!(tree.iter().collect::<String>(), "GMPX");
//! assert_eq!(tree.find(&'X').value(), &'X');
//! assert!(tree.find(&'Z').is_end());
//! assert!(!tree.insert('M').1);
//! ```


pub mod btree;

mod error;

pub use btree::{Cursor, CursorMut, Tree};
pub use error::{Error, Result};
