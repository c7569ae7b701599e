//! Client side of the CSV validation service: endpoint resolution, the upload
//! transport, and the submission lifecycle a front end renders from.

pub mod config;
pub mod controller;
pub mod endpoint;
pub mod error;
pub mod transport;

pub use config::{load_settings, ClientSettings};
pub use controller::{
    read_selected_file, ControllerView, RequestLifecycleState, SubmissionController,
    SubmitDisposition,
};
pub use endpoint::{EndpointResolver, ServiceEndpoint};
pub use error::{ConfigError, SubmitError, TransportError};
pub use transport::{HttpTransport, RawResponse, ValidationTransport};
