pub mod auth;
pub mod config;
pub mod error;
pub mod io;
pub mod order;
pub mod parse;
pub mod paths;
pub mod seed;
pub mod session;
pub mod store;

pub use error::{NotchError, Result};
