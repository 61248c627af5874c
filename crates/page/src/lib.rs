//! TodoMVC Page Object
//!
//! Stable, semantic operations ("enter item", "toggle item 2", "show completed")
//! over whatever markup the TodoMVC implementation under test renders.
//!
//! ## Layers
//!
//! ```text
//! TodoPage (actions) → ElementFinder (required / optional) → WebDriver
//!        ↓                        ↑
//!    Locators ── SelectorMode ────┘ (detected once, per page)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let page = TodoPage::new(Arc::new(driver));
//! page.ensure_app_is_visible().await?;
//! page.enter_item("buy milk").await?;
//! page.toggle_item_at_index(0).await?;
//! page.filter_by_completed_items().await?;
//! ```

pub mod config;
pub mod error;
pub mod finder;
pub mod locator;
pub mod page;

pub use config::PageConfig;
pub use error::{PageError, Result};
pub use finder::ElementFinder;
pub use locator::{Locators, LogicalRegion, SelectorMode};
pub use page::{Filter, TodoPage};
