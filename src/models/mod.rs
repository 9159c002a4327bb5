//! Data Models
//!
//! Configuration structures and the response views returned by commands.

pub mod response;
pub mod settings;

pub use response::*;
pub use settings::*;
