// Client side of the dialogue service contract: wire types, errors, the
// transport trait and its HTTP implementation.

pub mod errors;
pub mod http;
pub mod protocol;
pub mod traits;

pub use errors::ServiceError;
pub use http::HttpDialogueService;
pub use protocol::{
    ConfirmFinalRequest, ConfirmFinalResponse, Endpoint, FieldPayload, FilterOptionsRequest,
    FilterOptionsResponse, GenerateOptionsRequest, GenerateOptionsResponse, DEFAULT_SERVICE_URL,
    NO_DIALOGUE_FALLBACK,
};
pub use traits::DialogueService;

#[cfg(any(test, feature = "testing"))]
pub use traits::MockDialogueService;
