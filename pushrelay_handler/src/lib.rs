mod config;
mod error;
mod event;
mod handler;
mod request;

pub mod server;

pub use config::*;
pub use error::*;
pub use event::*;
pub use handler::*;
pub use request::*;
