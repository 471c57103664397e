//! EngagementRepository trait definition.

use shurahub_types::engagement::{AnalyticsEvent, Feedback};
use shurahub_types::error::RepositoryError;

/// Storage for landing-page feedback and analytics events.
pub trait EngagementRepository: Send + Sync {
    fn save_feedback(
        &self,
        feedback: &Feedback,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn record_event(
        &self,
        event: &AnalyticsEvent,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
