pub mod definition;
pub mod ingest;
pub mod registry;

pub use definition::*;
pub use ingest::*;
pub use registry::*;
