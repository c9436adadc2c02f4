//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the client core and the outside
//! world. Adapters in the infrastructure layer implement them.

mod clock;
mod transport;

pub use clock::Clock;
pub use transport::{
    HttpMethod, HttpTransport, TransportBody, TransportError, TransportRequest, TransportResponse,
};
