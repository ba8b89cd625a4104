#![doc = include_str!("../README.md")]

pub mod error;
pub mod offload;
pub mod scope;
pub mod stores;

pub use error::ConfigError;
pub use offload::ConfigOffload;
pub use scope::ConfigScope;
pub use stores::ConfigStores;

pub use offbox::OnTimeout;
