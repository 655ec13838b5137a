pub mod document;
pub mod error;
pub mod ids;
pub mod lifecycle;
pub mod model;
pub mod router;
pub mod state;
pub mod types;

pub use document::*;
pub use error::*;
pub use ids::*;
pub use model::*;
pub use router::*;
pub use state::*;
pub use types::*;
