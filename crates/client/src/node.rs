//! Request and response types for the Node service.

mod get_info;
mod publish_volume;

pub use get_info::*;
pub use publish_volume::*;
