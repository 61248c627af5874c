//! End-to-end behaviour of TodoPage against a recording driver

use driver::{By, DriverCall, Key, Keystroke, MockDriver};
use page::{LogicalRegion, PageError, SelectorMode, TodoPage};
use std::sync::Arc;

fn setup() -> (Arc<MockDriver>, TodoPage<MockDriver>) {
    let driver = Arc::new(MockDriver::new());
    let page = TodoPage::new(driver.clone());
    (driver, page)
}

#[tokio::test]
async fn class_only_root_switches_every_locator() {
    let (driver, page) = setup();
    driver.render(By::css(".todoapp"), 1);

    assert_eq!(page.ensure_app_is_visible().await.unwrap(), SelectorMode::ClassBased);
    assert_eq!(
        page.locators().locator_for(LogicalRegion::TodoList, None),
        r#"//ul[@class="todo-list"]"#
    );

    let input = driver
        .render(By::xpath(r#"//input[contains(@class,"new-todo")]"#), 1)
        .remove(0);
    page.enter_item("walk the dog").await.unwrap();
    assert_eq!(driver.keystrokes(&input).len(), "walk the dog".len() + 1);
}

#[tokio::test]
async fn missing_root_is_reported() {
    let (_driver, page) = setup();

    let err = page.ensure_app_is_visible().await.unwrap_err();

    match err {
        PageError::RootNotFound {
            id_query,
            class_query,
        } => {
            assert_eq!(id_query, "css=#todoapp");
            assert_eq!(class_query, "css=.todoapp");
        }
        other => panic!("Expected RootNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn detection_runs_once() {
    let (driver, page) = setup();
    driver.render(By::css(".todoapp"), 1);

    page.ensure_app_is_visible().await.unwrap();
    let probes = driver.queries().len();
    assert_eq!(probes, 2);

    // Even if the DOM changes, the resolved mode stays and nothing is re-queried
    driver.render(By::css("#todoapp"), 1);
    assert_eq!(page.detect_mode().await.unwrap(), SelectorMode::ClassBased);
    assert_eq!(page.ensure_app_is_visible().await.unwrap(), SelectorMode::ClassBased);
    assert_eq!(driver.queries().len(), probes);
}

#[tokio::test]
async fn failed_detection_can_be_retried() {
    let (driver, page) = setup();
    assert!(page.ensure_app_is_visible().await.is_err());

    driver.render(By::css("#todoapp"), 1);
    assert_eq!(page.ensure_app_is_visible().await.unwrap(), SelectorMode::IdBased);
}

#[tokio::test]
async fn toggle_without_control_is_a_noop() {
    let (driver, page) = setup();
    driver.render(By::css("#todoapp"), 1);
    page.ensure_app_is_visible().await.unwrap();
    driver.render(By::xpath(r#"//ul[@id="todo-list"]/li"#), 3);

    page.toggle_item_at_index(2).await.unwrap();

    assert!(driver.clicks().is_empty());
    assert!(driver
        .queries()
        .contains(&By::xpath(r#"//ul[@id="todo-list"]/li[3]//input[contains(@class,"toggle")]"#)));
}

#[tokio::test]
async fn edit_sends_deletion_burst_then_text() {
    let (driver, page) = setup();
    driver.render(By::css("#todoapp"), 1);
    page.ensure_app_is_visible().await.unwrap();
    let field = driver
        .render(
            By::xpath(r#"//ul[@id="todo-list"]/li[1]//input[contains(@class,"edit")]"#),
            1,
        )
        .remove(0);

    page.edit_item_at_index(0, "new text").await.unwrap();

    let strokes = driver.keystrokes(&field);
    assert_eq!(strokes.len(), 100 + "new text".len());

    let (deletions, text) = strokes.split_at(100);
    for pair in deletions.chunks(2) {
        assert_eq!(pair, [Keystroke::Key(Key::Backspace), Keystroke::Key(Key::Delete)]);
    }
    let typed: String = text
        .iter()
        .map(|stroke| match stroke {
            Keystroke::Char(c) => *c,
            other => panic!("Unexpected keystroke {other:?}"),
        })
        .collect();
    assert_eq!(typed, "new text");
}

#[tokio::test]
async fn edit_without_field_fails() {
    let (driver, page) = setup();
    driver.render(By::css("#todoapp"), 1);
    page.ensure_app_is_visible().await.unwrap();

    let err = page.edit_item_at_index(0, "new text").await.unwrap_err();

    assert!(matches!(err, PageError::ElementNotFound { .. }));
    assert!(!driver
        .calls()
        .iter()
        .any(|call| matches!(call, DriverCall::SendKeys(..))));
}

#[tokio::test]
async fn completed_filter_clicks_third_link_only() {
    let (driver, page) = setup();
    driver.render(By::css("#todoapp"), 1);
    page.ensure_app_is_visible().await.unwrap();
    let links = driver.render(By::xpath(r#"//ul[@id="filters"]//a"#), 3);

    page.filter_by_completed_items().await.unwrap();

    assert_eq!(driver.clicks(), vec![links[2].clone()]);
}

#[tokio::test]
async fn class_based_filters_resolve_links() {
    let (driver, page) = setup();
    driver.render(By::css(".todoapp"), 1);
    page.ensure_app_is_visible().await.unwrap();
    let links = driver.render(By::xpath(r#"//ul[contains(@class, "filters")]//a"#), 3);

    page.filter_by_active_items().await.unwrap();

    assert_eq!(driver.clicks(), vec![links[1].clone()]);
}

#[tokio::test]
async fn focused_element_uses_class_attribute_in_class_markup() {
    let (driver, page) = setup();
    driver.render(By::css(".todoapp"), 1);
    page.ensure_app_is_visible().await.unwrap();

    let input = driver
        .render(By::xpath(r#"//input[contains(@class,"new-todo")]"#), 1)
        .remove(0);
    driver.set_active(input.clone());
    driver.set_attribute(&input, "class", "new-todo");

    assert_eq!(
        page.focused_element_id().await.unwrap().as_deref(),
        Some("new-todo")
    );
}
