pub mod adapters;
pub mod collaborators;
pub mod error;
pub mod orchestrator;

pub use adapters::{assemble_products, PgStore};
pub use collaborators::{CatalogSource, ScrapeStore};
pub use error::RunError;
pub use orchestrator::{RunSummary, ScrapeOrchestrator};
