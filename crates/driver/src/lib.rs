//! Browser Automation Driver - the boundary a page object talks to
//!
//! This crate defines what a page object may ask of a browser and nothing more:
//! element lookup, clicking, keystrokes, attribute reads, history navigation,
//! the active element, and a script escape hatch.
//!
//! # Architecture
//!
//! 1. **One trait, many backends**: [`WebDriver`] is the seam. Page objects never
//!    see CDP, WebSockets, or JSON.
//! 2. **Handles are ephemeral**: an [`ElementHandle`] is only valid for the DOM it
//!    was found in. Re-query after anything that re-renders.
//! 3. **Fail fast**: no retries, no implicit waits. Let the caller decide.
//!
//! ```text
//! TodoPage → WebDriver ─┬─ CdpDriver → CDPSession → CDPClient → WebSocket → Chrome
//!                       └─ MockDriver (records calls, for tests)
//! ```

pub mod cdp;
pub mod config;
pub mod error;
pub mod keys;
pub mod mock;
pub mod webdriver;

pub use cdp::{CDPClient, CDPSession, CdpDriver};
pub use config::DriverConfig;
pub use error::{DriverError, Result};
pub use keys::{Key, KeyRun, Keys, Keystroke};
pub use mock::{DriverCall, MockDriver};
pub use url::Url;
pub use webdriver::{By, ElementHandle, ScriptArg, WebDriver};
