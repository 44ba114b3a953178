pub mod instance;
pub mod store;

pub use instance::*;
pub use store::*;
