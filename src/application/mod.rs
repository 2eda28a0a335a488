// Application layer: the charge ledger use cases.
// Clients (HTTP API, CLI) talk to `ChargeService`; nothing above this layer
// touches the repository directly.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
