pub mod fetcher;
pub mod traits;

pub use fetcher::HttpPriceSource;
pub use traits::PriceSource;
