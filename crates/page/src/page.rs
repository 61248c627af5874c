//! TodoPage - the surface tests talk to
//!
//! Every method is one sequential async task: look something up, act on it,
//! return. Handles are never kept between calls because most actions re-render
//! the list.
//!
//! Two lookup policies, picked per target:
//! - targets that only exist in some states (item toggles, the clear-completed
//!   button) use optional lookups, and absence means "nothing to do";
//! - targets that must always exist (the new-item input, labels of items the
//!   test created) use required lookups, and absence is an error.

use driver::{By, ElementHandle, Key, Keys, Keystroke, ScriptArg, WebDriver};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::config::PageConfig;
use crate::error::{PageError, Result};
use crate::finder::ElementFinder;
use crate::locator::{Locators, LogicalRegion, SelectorMode};

/// Synthesizes a double-click on `arguments[0]`. The driver has no native
/// double-click, so the event is dispatched directly on the element.
pub const DOUBLE_CLICK_SCRIPT: &str = "var evt = document.createEvent('MouseEvents');\
    evt.initMouseEvent('dblclick', true, true, window, 0, 0, 0, 0, 0, \
    false, false, false, false, 0, null);\
    arguments[0].dispatchEvent(evt);";

/// Position of each filter link in the footer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn position(self) -> usize {
        match self {
            Filter::All => 0,
            Filter::Active => 1,
            Filter::Completed => 2,
        }
    }
}

/// Page object for a TodoMVC application
pub struct TodoPage<D> {
    finder: ElementFinder<D>,
    mode: OnceCell<SelectorMode>,
    config: PageConfig,
}

impl<D: WebDriver> TodoPage<D> {
    pub fn new(driver: Arc<D>) -> Self {
        Self::with_config(driver, PageConfig::default())
    }

    /// A preset `selector_mode` counts as already resolved
    pub fn with_config(driver: Arc<D>, config: PageConfig) -> Self {
        Self {
            finder: ElementFinder::new(driver),
            mode: OnceCell::new_with(config.selector_mode),
            config,
        }
    }

    pub fn driver(&self) -> &D {
        self.finder.driver()
    }

    pub fn finder(&self) -> &ElementFinder<D> {
        &self.finder
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Resolved mode, or `IdBased` until detection has run
    pub fn mode(&self) -> SelectorMode {
        self.mode.get().copied().unwrap_or_default()
    }

    pub fn locators(&self) -> Locators {
        Locators::new(self.mode())
    }

    /// Detect the selector convention once; later calls return it without
    /// touching the driver.
    pub async fn detect_mode(&self) -> Result<SelectorMode> {
        let mode = self
            .mode
            .get_or_try_init(|| async {
                let mode = SelectorMode::detect(&self.finder).await?;
                tracing::info!(mode = %mode, "Resolved selector mode");
                Ok::<_, PageError>(mode)
            })
            .await?;
        Ok(*mode)
    }

    /// Fails with [`PageError::RootNotFound`] when the app is not loaded.
    /// Must be awaited before anything else on a page without a preset mode.
    pub async fn ensure_app_is_visible(&self) -> Result<SelectorMode> {
        self.detect_mode().await
    }

    // ----------------- navigation

    pub async fn back(&self) -> Result<()> {
        self.driver().navigate_back().await?;
        Ok(())
    }

    // ----------------- optional lookups

    async fn try_xpath(&self, xpath: String) -> Result<Vec<ElementHandle>> {
        self.finder.find_optional(&By::XPath(xpath)).await
    }

    async fn xpath(&self, xpath: String) -> Result<ElementHandle> {
        self.finder.find_required(&By::XPath(xpath)).await
    }

    pub async fn try_main_section(&self) -> Result<Vec<ElementHandle>> {
        self.try_xpath(self.locators().region(LogicalRegion::MainSection))
            .await
    }

    pub async fn try_footer(&self) -> Result<Vec<ElementHandle>> {
        self.try_xpath(self.locators().region(LogicalRegion::FooterSection))
            .await
    }

    pub async fn try_clear_complete_button(&self) -> Result<Vec<ElementHandle>> {
        self.try_xpath(self.locators().region(LogicalRegion::ClearCompletedButton))
            .await
    }

    pub async fn try_toggle_for_item_at_index(&self, index: usize) -> Result<Vec<ElementHandle>> {
        self.try_xpath(self.locators().item_toggle(index)).await
    }

    pub async fn try_item_label_at_index(&self, index: usize) -> Result<Vec<ElementHandle>> {
        self.try_xpath(self.locators().item_label(index)).await
    }

    pub async fn item_elements(&self) -> Result<Vec<ElementHandle>> {
        self.try_xpath(self.locators().items()).await
    }

    pub async fn non_completed_item_elements(&self) -> Result<Vec<ElementHandle>> {
        self.try_xpath(self.locators().non_completed_items()).await
    }

    pub async fn item_labels(&self) -> Result<Vec<ElementHandle>> {
        self.try_xpath(self.locators().item_labels()).await
    }

    pub async fn filter_elements(&self) -> Result<Vec<ElementHandle>> {
        self.try_xpath(self.locators().region(LogicalRegion::FilterLinks))
            .await
    }

    // ----------------- required lookups

    pub async fn item_input_field(&self) -> Result<ElementHandle> {
        self.xpath(self.locators().region(LogicalRegion::NewItemInput))
            .await
    }

    pub async fn mark_all_completed_check_box(&self) -> Result<ElementHandle> {
        self.xpath(self.locators().region(LogicalRegion::ToggleAllCheckbox))
            .await
    }

    pub async fn items_count_element(&self) -> Result<ElementHandle> {
        self.xpath(self.locators().region(LogicalRegion::ItemCount))
            .await
    }

    pub async fn item_label_at_index(&self, index: usize) -> Result<ElementHandle> {
        self.xpath(self.locators().item_label(index)).await
    }

    pub async fn edit_input_for_item_at_index(&self, index: usize) -> Result<ElementHandle> {
        self.xpath(self.locators().item_edit_input(index)).await
    }

    /// `id` (or `class`, in class-based markup) of the focused element
    pub async fn focused_element_id(&self) -> Result<Option<String>> {
        let active = self.driver().active_element().await?;
        let value = self
            .driver()
            .get_attribute(&active, self.locators().focus_attribute())
            .await?;
        Ok(value)
    }

    // ----------------- actions

    pub async fn click_mark_all_completed_check_box(&self) -> Result<()> {
        let checkbox = self.mark_all_completed_check_box().await?;
        self.driver().click(&checkbox).await?;
        Ok(())
    }

    /// Clicks the button if it is rendered, otherwise does nothing
    pub async fn click_clear_complete_button(&self) -> Result<()> {
        let Some(button) = self.try_clear_complete_button().await?.into_iter().next() else {
            tracing::debug!("No clear-completed button rendered, nothing to click");
            return Ok(());
        };
        self.driver().click(&button).await?;
        Ok(())
    }

    /// Type `text` into the new-item field and submit it
    pub async fn enter_item(&self, text: &str) -> Result<()> {
        let field = self.item_input_field().await?;
        self.driver().send_keys(&field, &Keys::from(text)).await?;
        self.driver().send_keys(&field, &Keys::from(Key::Enter)).await?;
        tracing::debug!(text, "Entered item");
        Ok(())
    }

    /// Clicks the item's toggle if it is rendered, otherwise does nothing
    pub async fn toggle_item_at_index(&self, index: usize) -> Result<()> {
        let Some(toggle) = self
            .try_toggle_for_item_at_index(index)
            .await?
            .into_iter()
            .next()
        else {
            tracing::debug!(index, "No toggle rendered for item, nothing to click");
            return Ok(());
        };
        self.driver().click(&toggle).await?;
        Ok(())
    }

    /// Clear the item's edit field and type `text` into it
    pub async fn edit_item_at_index(&self, index: usize, text: &str) -> Result<()> {
        let field = self.edit_input_for_item_at_index(index).await?;

        // Item text length is unknown, so delete generously in both directions
        let clear: Keys = (0..self.config.clear_keystroke_pairs)
            .flat_map(|_| [Keystroke::Key(Key::Backspace), Keystroke::Key(Key::Delete)])
            .collect();
        self.driver().send_keys(&field, &clear).await?;
        self.driver().send_keys(&field, &Keys::from(text)).await?;
        Ok(())
    }

    pub async fn double_click_item_at_index(&self, index: usize) -> Result<()> {
        let label = self.item_label_at_index(index).await?;
        self.driver()
            .execute_script(DOUBLE_CLICK_SCRIPT, &[ScriptArg::Element(label)])
            .await?;
        Ok(())
    }

    /// Click the filter link for `filter`.
    ///
    /// Fails with [`PageError::FilterLinkMissing`] when fewer links render than
    /// the position needs, rather than silently clicking nothing.
    pub async fn filter_by(&self, filter: Filter) -> Result<()> {
        let position = filter.position();
        let links = self.filter_elements().await?;
        let available = links.len();
        let link = links
            .into_iter()
            .nth(position)
            .ok_or(PageError::FilterLinkMissing {
                position,
                available,
            })?;
        self.driver().click(&link).await?;
        Ok(())
    }

    pub async fn filter_by_all_items(&self) -> Result<()> {
        self.filter_by(Filter::All).await
    }

    pub async fn filter_by_active_items(&self) -> Result<()> {
        self.filter_by(Filter::Active).await
    }

    pub async fn filter_by_completed_items(&self) -> Result<()> {
        self.filter_by(Filter::Completed).await
    }
}
