pub mod client;
pub mod error;
pub mod normalize;
pub mod rate_limit;
pub mod types;

pub use client::{CatalogClient, CatalogClientSettings};
pub use error::ScraperError;
pub use normalize::{normalize_offer, price_break_infos, product_info};
pub use types::{CatalogResponse, RawPriceBreak, RawVendorOffer};
