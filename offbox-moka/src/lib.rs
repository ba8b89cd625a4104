#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod builder;
mod registry;
mod store;

pub use builder::MokaRegistryBuilder;
pub use registry::MokaRegistry;
pub use store::MokaStore;
