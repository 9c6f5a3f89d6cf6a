// Seam between the workflow controller and the transport.

use async_trait::async_trait;

use super::errors::ServiceError;
use super::protocol::{
    ConfirmFinalRequest, ConfirmFinalResponse, FilterOptionsRequest, FilterOptionsResponse,
    GenerateOptionsRequest, GenerateOptionsResponse,
};

/// The three endpoints of the dialogue service.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DialogueService: Send + Sync {
    /// `POST /generate_dialogue_options`
    async fn generate_options(
        &self,
        request: GenerateOptionsRequest,
    ) -> Result<GenerateOptionsResponse, ServiceError>;

    /// `POST /filter_dialogue_options`
    async fn filter_options(
        &self,
        request: FilterOptionsRequest,
    ) -> Result<FilterOptionsResponse, ServiceError>;

    /// `POST /confirm_final_dialogue`
    async fn confirm_final(
        &self,
        request: ConfirmFinalRequest,
    ) -> Result<ConfirmFinalResponse, ServiceError>;
}
