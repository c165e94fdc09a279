use crate::domain::model::EnrichmentOutcome;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Produces translations and a calorie estimate for one food item.
///
/// Implementations never fail: every problem is reported as
/// [`EnrichmentOutcome::Unavailable`] so the caller keeps the item unenriched.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, name: &str, description: &str) -> EnrichmentOutcome;
}
