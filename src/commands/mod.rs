//! Command Handlers
//!
//! Entry points invoked by the CLI. Each returns a [`CommandResponse`]
//! so callers can print either a human summary or JSON.
//!
//! [`CommandResponse`]: crate::models::response::CommandResponse

pub mod analyze;
pub mod export;
pub mod history;
pub mod settings;

pub use analyze::*;
pub use export::*;
pub use history::*;
pub use settings::*;
