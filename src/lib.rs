//! Thoughtline - hybrid search and timeline correlation over personal thoughts
//!
//! Parses a small query language, combines semantic, keyword, recency and
//! confidence signals into one relevance score, ranks results, and correlates
//! timeline entries through the entities extracted from them.

pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod search;
pub mod services;
pub mod sources;
pub mod thought;
pub mod timeline;

pub use error::{Error, Result};
