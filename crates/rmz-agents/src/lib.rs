pub mod assets;
pub mod combat;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod generator;
pub mod role;
pub mod roster;
pub mod tester;
pub mod worker;
pub mod world;

pub use assets::*;
pub use combat::*;
pub use coordinator::*;
pub use error::*;
pub use events::*;
pub use generator::*;
pub use role::*;
pub use roster::*;
pub use tester::*;
pub use worker::*;
pub use world::*;
