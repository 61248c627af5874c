//! CDP (Chrome DevTools Protocol) backend
//!
//! Single WebSocket connection, one flattened session per driven tab.

pub mod client;
pub mod driver;
pub mod protocol;
pub mod session;

pub use client::{CDPClient, CDPError};
pub use driver::CdpDriver;
pub use protocol::{CDPEvent, CDPRequest, CDPResponse};
pub use session::CDPSession;
