#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod origin;

pub use origin::ReqwestOrigin;
pub use reqwest_middleware;
