//! Element Finder - existence semantics on top of `find_elements`
//!
//! The driver has no "does this exist" call. Instead there are two lookups:
//! [`ElementFinder::find_required`] for elements that must be there, and
//! [`ElementFinder::find_optional`] for elements that legitimately come and go.

use driver::{By, ElementHandle, WebDriver};
use std::sync::Arc;

use crate::error::{PageError, Result};

pub struct ElementFinder<D> {
    driver: Arc<D>,
}

impl<D> Clone for ElementFinder<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
        }
    }
}

impl<D: WebDriver> ElementFinder<D> {
    pub fn new(driver: Arc<D>) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// First match in document order, or [`PageError::ElementNotFound`]
    pub async fn find_required(&self, by: &By) -> Result<ElementHandle> {
        self.find_optional(by)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PageError::ElementNotFound {
                query: by.to_string(),
            })
    }

    /// Every match; empty when nothing matches
    pub async fn find_optional(&self, by: &By) -> Result<Vec<ElementHandle>> {
        let found = self.driver.find_elements(by).await?;
        tracing::debug!(query = %by, found = found.len(), "lookup");
        Ok(found)
    }
}
