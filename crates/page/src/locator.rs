//! Locator strategy resolution
//!
//! TodoMVC implementations come in two markup flavours: the older one addresses
//! everything by `id`, the newer one by `class`. [`SelectorMode`] records which
//! one the app under test renders, and [`Locators`] turns logical regions into
//! XPath for that mode.
//!
//! The table in [`LogicalRegion::xpath`] is the markup contract. If an
//! implementation renders something else, this is the one place to change.

use driver::{By, WebDriver};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PageError, Result};
use crate::finder::ElementFinder;

/// Which attribute the app uses to address its elements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorMode {
    #[default]
    IdBased,
    ClassBased,
}

impl SelectorMode {
    /// Probe the page for the app root, id convention first.
    ///
    /// `IdBased` if `#todoapp` renders, `ClassBased` if only `.todoapp` does,
    /// [`PageError::RootNotFound`] if neither.
    pub async fn detect<D: WebDriver>(finder: &ElementFinder<D>) -> Result<Self> {
        let id_root = Locators::new(SelectorMode::IdBased).root();
        if !finder.find_optional(&id_root).await?.is_empty() {
            return Ok(SelectorMode::IdBased);
        }

        let class_root = Locators::new(SelectorMode::ClassBased).root();
        if !finder.find_optional(&class_root).await?.is_empty() {
            return Ok(SelectorMode::ClassBased);
        }

        Err(PageError::RootNotFound {
            id_query: id_root.to_string(),
            class_query: class_root.to_string(),
        })
    }
}

impl fmt::Display for SelectorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorMode::IdBased => f.write_str("id-based"),
            SelectorMode::ClassBased => f.write_str("class-based"),
        }
    }
}

/// Named UI regions of a TodoMVC app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalRegion {
    TodoList,
    MainSection,
    FooterSection,
    ClearCompletedButton,
    NewItemInput,
    ToggleAllCheckbox,
    ItemCount,
    FilterLinks,
}

impl LogicalRegion {
    pub const ALL: [LogicalRegion; 8] = [
        LogicalRegion::TodoList,
        LogicalRegion::MainSection,
        LogicalRegion::FooterSection,
        LogicalRegion::ClearCompletedButton,
        LogicalRegion::NewItemInput,
        LogicalRegion::ToggleAllCheckbox,
        LogicalRegion::ItemCount,
        LogicalRegion::FilterLinks,
    ];

    /// XPath for this region under `mode`
    pub fn xpath(self, mode: SelectorMode) -> &'static str {
        use LogicalRegion::*;
        use SelectorMode::*;

        match (self, mode) {
            (TodoList, IdBased) => r#"//ul[@id="todo-list"]"#,
            (TodoList, ClassBased) => r#"//ul[@class="todo-list"]"#,
            (MainSection, IdBased) => r#"//section[@id="main"]"#,
            (MainSection, ClassBased) => r#"//section[contains(@class, "main")]"#,
            (FooterSection, IdBased) => r#"//footer[@id="footer"]"#,
            (FooterSection, ClassBased) => r#"//footer[contains(@class, "footer")]"#,
            (ClearCompletedButton, IdBased) => r#"//button[@id="clear-completed"]"#,
            (ClearCompletedButton, ClassBased) => {
                r#"//button[contains(@class, "clear-completed")]"#
            }
            (NewItemInput, IdBased) => r#"//input[@id="new-todo"]"#,
            (NewItemInput, ClassBased) => r#"//input[contains(@class,"new-todo")]"#,
            (ToggleAllCheckbox, IdBased) => r#"//input[@id="toggle-all"]"#,
            (ToggleAllCheckbox, ClassBased) => r#"//input[contains(@class,"toggle-all")]"#,
            (ItemCount, IdBased) => r#"//span[@id="todo-count"]"#,
            (ItemCount, ClassBased) => r#"//span[contains(@class, "todo-count")]"#,
            (FilterLinks, IdBased) => r#"//ul[@id="filters"]//a"#,
            (FilterLinks, ClassBased) => r#"//ul[contains(@class, "filters")]//a"#,
        }
    }
}

/// 1-based XPath position of a zero-based index, widened so `usize::MAX` fits
fn position(index: usize) -> u128 {
    index as u128 + 1
}

/// Locator factory for one selector mode. Pure: same inputs, same string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locators {
    mode: SelectorMode,
}

impl Locators {
    pub const fn new(mode: SelectorMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SelectorMode {
        self.mode
    }

    /// CSS selector for the app root
    pub fn root(&self) -> By {
        match self.mode {
            SelectorMode::IdBased => By::css("#todoapp"),
            SelectorMode::ClassBased => By::css(".todoapp"),
        }
    }

    pub fn region(&self, region: LogicalRegion) -> String {
        region.xpath(self.mode).to_string()
    }

    /// Region locator, optionally narrowed to the `index`-th (zero-based) match.
    ///
    /// For the todo list the index selects an item row (`/li[n]`); for every
    /// other region it selects among the region's own matches (`(...)[n]`).
    pub fn locator_for(&self, region: LogicalRegion, index: Option<usize>) -> String {
        match (region, index) {
            (_, None) => self.region(region),
            (LogicalRegion::TodoList, Some(index)) => self.item_at(index),
            (_, Some(index)) => format!("({})[{}]", region.xpath(self.mode), position(index)),
        }
    }

    /// The `index`-th item row. XPath positions are 1-based.
    pub fn item_at(&self, index: usize) -> String {
        format!("{}/li[{}]", self.region(LogicalRegion::TodoList), position(index))
    }

    pub fn items(&self) -> String {
        format!("{}/li", self.region(LogicalRegion::TodoList))
    }

    pub fn non_completed_items(&self) -> String {
        format!(
            r#"{}/li[not(contains(@class,"completed"))]"#,
            self.region(LogicalRegion::TodoList)
        )
    }

    pub fn item_labels(&self) -> String {
        format!("{}/li//label", self.region(LogicalRegion::TodoList))
    }

    pub fn item_toggle(&self, index: usize) -> String {
        format!(r#"{}//input[contains(@class,"toggle")]"#, self.item_at(index))
    }

    pub fn item_label(&self, index: usize) -> String {
        format!("{}//label", self.item_at(index))
    }

    pub fn item_edit_input(&self, index: usize) -> String {
        format!(r#"{}//input[contains(@class,"edit")]"#, self.item_at(index))
    }

    /// Attribute that identifies the focused element in this markup
    pub fn focus_attribute(&self) -> &'static str {
        match self.mode {
            SelectorMode::IdBased => "id",
            SelectorMode::ClassBased => "class",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driver::MockDriver;
    use std::sync::Arc;

    const ID: Locators = Locators::new(SelectorMode::IdBased);
    const CLASS: Locators = Locators::new(SelectorMode::ClassBased);

    #[test]
    fn test_item_index_is_one_based() {
        assert_eq!(ID.item_at(0), r#"//ul[@id="todo-list"]/li[1]"#);
        assert_eq!(ID.item_at(4), r#"//ul[@id="todo-list"]/li[5]"#);
        assert_eq!(CLASS.item_at(0), r#"//ul[@class="todo-list"]/li[1]"#);
    }

    #[test]
    fn test_largest_index_does_not_overflow() {
        assert_eq!(
            ID.item_at(usize::MAX),
            format!(r#"//ul[@id="todo-list"]/li[{}]"#, usize::MAX as u128 + 1)
        );
        assert!(CLASS
            .locator_for(LogicalRegion::FilterLinks, Some(usize::MAX))
            .ends_with(&format!(")[{}]", usize::MAX as u128 + 1)));
    }

    #[test]
    fn test_locator_for_is_deterministic() {
        for region in LogicalRegion::ALL {
            for locators in [ID, CLASS] {
                for index in [None, Some(0), Some(3)] {
                    assert_eq!(
                        locators.locator_for(region, index),
                        locators.locator_for(region, index)
                    );
                }
            }
        }
    }

    #[test]
    fn test_modes_never_share_a_locator() {
        for region in LogicalRegion::ALL {
            assert_ne!(region.xpath(SelectorMode::IdBased), region.xpath(SelectorMode::ClassBased));
        }
    }

    #[test]
    fn test_locator_for_with_index() {
        assert_eq!(
            ID.locator_for(LogicalRegion::TodoList, Some(2)),
            r#"//ul[@id="todo-list"]/li[3]"#
        );
        assert_eq!(
            CLASS.locator_for(LogicalRegion::FilterLinks, Some(0)),
            r#"(//ul[contains(@class, "filters")]//a)[1]"#
        );
        assert_eq!(
            ID.locator_for(LogicalRegion::ItemCount, None),
            r#"//span[@id="todo-count"]"#
        );
    }

    #[test]
    fn test_item_parts() {
        assert_eq!(
            ID.item_toggle(1),
            r#"//ul[@id="todo-list"]/li[2]//input[contains(@class,"toggle")]"#
        );
        assert_eq!(CLASS.item_label(0), r#"//ul[@class="todo-list"]/li[1]//label"#);
        assert_eq!(
            ID.item_edit_input(0),
            r#"//ul[@id="todo-list"]/li[1]//input[contains(@class,"edit")]"#
        );
        assert_eq!(
            CLASS.non_completed_items(),
            r#"//ul[@class="todo-list"]/li[not(contains(@class,"completed"))]"#
        );
        assert_eq!(ID.item_labels(), r#"//ul[@id="todo-list"]/li//label"#);
    }

    #[test]
    fn test_focus_attribute_follows_mode() {
        assert_eq!(ID.focus_attribute(), "id");
        assert_eq!(CLASS.focus_attribute(), "class");
    }

    #[tokio::test]
    async fn test_detect_prefers_id_root() {
        let driver = Arc::new(MockDriver::new());
        driver.render(By::css("#todoapp"), 1);
        driver.render(By::css(".todoapp"), 1);

        let finder = ElementFinder::new(driver.clone());
        assert_eq!(SelectorMode::detect(&finder).await.unwrap(), SelectorMode::IdBased);
        // Found on the first probe, so the class probe is never sent
        assert_eq!(driver.queries(), vec![By::css("#todoapp")]);
    }

    #[tokio::test]
    async fn test_detect_falls_back_to_class_root() {
        let driver = Arc::new(MockDriver::new());
        driver.render(By::css(".todoapp"), 1);

        let finder = ElementFinder::new(driver);
        assert_eq!(SelectorMode::detect(&finder).await.unwrap(), SelectorMode::ClassBased);
    }

    #[tokio::test]
    async fn test_detect_without_root() {
        let finder = ElementFinder::new(Arc::new(MockDriver::new()));
        let err = SelectorMode::detect(&finder).await.unwrap_err();

        assert!(matches!(err, PageError::RootNotFound { .. }));
        assert!(err.to_string().contains("did you start your local server?"));
    }
}
