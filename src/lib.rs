pub mod core;
pub mod discovery;
pub mod extract;
pub mod scraping;

// --- Primary exports ---
pub use crate::core::types;
pub use crate::core::types::*;
pub use crate::core::{DiscoveryError, EngineConfig, ParseSkip, SourceError};
pub use discovery::{
    DetailStrategy, DiscoveryContext, Platform, ProfileEngine, SearchStrategy,
};

// --- Convenience module paths ---
pub use discovery::{reputation, strategies, synthetic};
pub use extract::name::extract_name;
pub use scraping::browser_manager;
