//! Drive a live TodoMVC app through Chrome
//!
//! Start Chrome with `--remote-debugging-port=9222`, serve a TodoMVC build, then:
//!
//! ```text
//! TODO_APP_URL=http://localhost:8000 CDP_URL=ws://localhost:9222/devtools/browser/<id> \
//!     cargo run -p page --example walkthrough
//! ```

use driver::{CdpDriver, DriverConfig};
use page::TodoPage;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut config = DriverConfig::default();
    if let Ok(cdp_url) = std::env::var("CDP_URL") {
        config.cdp_url = cdp_url;
    }
    let app_url =
        std::env::var("TODO_APP_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());

    let driver = Arc::new(CdpDriver::connect(config).await?);
    driver.goto_str(&app_url).await?;

    let page = TodoPage::new(driver.clone());
    let mode = page.ensure_app_is_visible().await?;
    println!("App renders {} markup", mode);

    for item in ["buy milk", "walk the dog", "write tests"] {
        page.enter_item(item).await?;
    }
    println!("Items: {}", page.item_elements().await?.len());

    page.toggle_item_at_index(1).await?;
    page.filter_by_active_items().await?;
    println!("Active: {}", page.item_elements().await?.len());

    page.filter_by_all_items().await?;
    page.double_click_item_at_index(0).await?;
    page.edit_item_at_index(0, "buy oat milk").await?;

    page.click_clear_complete_button().await?;
    println!("After clearing: {}", page.item_elements().await?.len());

    driver.close().await?;
    Ok(())
}
