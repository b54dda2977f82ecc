pub mod fetchers;
pub mod page;
pub mod types;

pub use fetchers::FetcherRegistry;
pub use types::Metadata;
