pub mod edge;
pub mod editor;

pub use edge::*;
pub use editor::*;
