//! Collaborators used by the batch export engine.
//!
//! - [`traits`] - The [`SessionStore`], [`FormatConverter`] and [`OutputWriter`] seams
//! - [`session_store`] - File-backed and in-memory session stores
//! - [`converter`] - Built-in format converter with an optional external PDF renderer
//! - [`filesystem`] - Local file writer with optional gzip compression
//! - [`factory`] - Builds the adapters described by the configuration
//!
//! # Design Pattern
//!
//! Adapters isolate the engine from storage and rendering so tests can swap
//! in in-memory or failing implementations.
//!
//! ```rust,no_run
//! use lectern::adapters::{FileSessionStore, SessionStore};
//! use lectern::domain::SessionId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileSessionStore::new("sessions");
//! let doc = store.get_session_content(&SessionId::new("intro")?).await?;
//! println!("{}", doc.title);
//! # Ok(())
//! # }
//! ```

pub mod converter;
pub mod factory;
pub mod filesystem;
pub mod session_store;
pub mod traits;

pub use converter::{BuiltinConverter, ExternalRenderer};
pub use factory::{create_adapters, Adapters};
pub use filesystem::LocalFileWriter;
pub use session_store::{FileSessionStore, InMemorySessionStore};
pub use traits::{FormatConverter, OutputWriter, SessionStore, WriteOutcome};
