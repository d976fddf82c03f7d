pub mod aggregate;
pub mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod store;
mod utils;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use config::Config;
pub use error::Error;
pub use error::Result;
