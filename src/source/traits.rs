use crate::model::SourceError;

#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetches the raw market-chart payload covering the full price history.
    async fn fetch(&self) -> Result<String, SourceError>;
}
