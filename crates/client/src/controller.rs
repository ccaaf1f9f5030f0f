//! Request and response types for the Controller service.

mod publish_volume;
mod unpublish_volume;

pub use publish_volume::*;
pub use unpublish_volume::*;
