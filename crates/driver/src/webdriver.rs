//! WebDriver trait - the capability set a page object consumes
//!
//! Deliberately small. Anything a page object needs that is not here goes
//! through [`WebDriver::execute_script`], and that should stay rare.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::error::Result;
use crate::keys::Keys;

/// Element query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum By {
    /// XPath 1.0 expression, evaluated against the document
    XPath(String),
    /// CSS selector
    Css(String),
}

impl By {
    pub fn xpath(expr: impl Into<String>) -> Self {
        By::XPath(expr.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        By::Css(selector.into())
    }

    /// The raw query text, without the strategy
    pub fn query(&self) -> &str {
        match self {
            By::XPath(q) | By::Css(q) => q,
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            By::XPath(q) => write!(f, "xpath={q}"),
            By::Css(q) => write!(f, "css={q}"),
        }
    }
}

/// Opaque reference to a live DOM node
///
/// Valid only until the DOM re-renders, and never past a navigation (the CDP
/// backend releases its handles then). Do not hold one across actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    id: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Backend-specific id (a CDP remote object id for [`CdpDriver`](crate::CdpDriver))
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Argument passed to an injected script as `arguments[n]`
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptArg {
    Element(ElementHandle),
    Value(Value),
}

impl From<ElementHandle> for ScriptArg {
    fn from(element: ElementHandle) -> Self {
        ScriptArg::Element(element)
    }
}

impl From<Value> for ScriptArg {
    fn from(value: Value) -> Self {
        ScriptArg::Value(value)
    }
}

/// Browser automation driver
///
/// Every call is one round-trip to the browser. Callers compose them
/// sequentially; there is no ordering guarantee across concurrent callers.
#[async_trait]
pub trait WebDriver: Send + Sync {
    /// All matches in document order. Empty when nothing matches, never an error.
    async fn find_elements(&self, by: &By) -> Result<Vec<ElementHandle>>;

    /// First match, or [`DriverError::NoSuchElement`](crate::DriverError::NoSuchElement)
    async fn find_element(&self, by: &By) -> Result<ElementHandle> {
        self.find_elements(by)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| crate::DriverError::NoSuchElement {
                query: by.to_string(),
            })
    }

    async fn click(&self, element: &ElementHandle) -> Result<()>;

    async fn send_keys(&self, element: &ElementHandle, keys: &Keys) -> Result<()>;

    /// `None` when the attribute is absent
    async fn get_attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>>;

    /// Go one entry back in session history
    async fn navigate_back(&self) -> Result<()>;

    /// The element that currently has focus (`document.activeElement`)
    async fn active_element(&self) -> Result<ElementHandle>;

    /// Run `source` as a function body; arguments are visible as `arguments[n]`.
    ///
    /// This is an escape hatch for gestures the driver does not expose natively
    /// (double-click). Don't reach for it when a real primitive exists.
    async fn execute_script(&self, source: &str, args: &[ScriptArg]) -> Result<Value>;
}
