pub mod case;
pub mod config;
pub mod execution;
pub mod fields;
pub mod schedule;
pub mod strategy;

pub use case::*;
pub use config::Config;
pub use execution::*;
pub use fields::*;
pub use schedule::*;
pub use strategy::*;
