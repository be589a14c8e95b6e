//! Kernel module - server infrastructure and dependencies.

pub mod analyzer;
pub mod deps;
pub mod places;
pub mod scraper;
pub mod testing;
pub mod traits;

pub use analyzer::GeminiAnalyzer;
pub use deps::ServerDeps;
pub use places::GooglePlacesClient;
pub use scraper::SimpleScraper;
pub use traits::*;
