pub mod commands;
pub mod error;
pub mod json;
pub mod memory;
pub mod records;
pub mod traits;

pub use commands::*;
pub use error::*;
pub use json::*;
pub use memory::*;
pub use traits::*;
