#[allow(clippy::module_inception)]
mod config;
pub mod defaults;
mod endpoints;

pub use config::*;
pub use endpoints::Endpoints;
