//! Sources that need no upstream client of their own.

pub mod todo;

pub use todo::PlaceholderTodos;
