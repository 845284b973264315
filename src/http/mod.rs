pub mod client;
pub mod method;
pub mod negotiation;
pub mod request;
pub mod response;

pub use client::{ReqwestTransport, Transport};
pub use method::HttpMethod;
pub use negotiation::{AcceptMode, ContentTypeMode};
pub use request::{Headers, RequestInput};
pub use response::ResponseOutcome;
