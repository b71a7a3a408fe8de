//! Gateway request handlers

pub mod content;
pub mod service;
pub mod upload;

pub use content::*;
pub use service::*;
pub use upload::*;
