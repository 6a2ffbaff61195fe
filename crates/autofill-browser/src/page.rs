//! [`FormPage`] over a chromiumoxide page and its owning browser.

use std::path::Path;
use std::time::Duration;

use chromiumoxide::browser::Browser;
use chromiumoxide::page::{Page, ScreenshotParams};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use autofill_core::{DriverError, FormPage};

use crate::element::ChromeElement;
use crate::protocol_error;

const LIVENESS_TIMEOUT: Duration = Duration::from_secs(2);

/// The single page a fill session drives.
///
/// Closing the page also closes the browser and stops its event loop.
pub struct ChromePage {
    page: Page,
    browser: Mutex<Browser>,
    events: JoinHandle<()>,
}

impl ChromePage {
    pub(crate) fn new(page: Page, browser: Mutex<Browser>, events: JoinHandle<()>) -> Self {
        Self { page, browser, events }
    }

    /// The event loop ends when the browser exits or its connection drops.
    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.events.is_finished() {
            Err(DriverError::Closed)
        } else {
            Ok(())
        }
    }
}

impl FormPage for ChromePage {
    type Element = ChromeElement;

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.ensure_open()?;
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ChromeElement>, DriverError> {
        self.ensure_open()?;
        let found = self.page.find_elements(selector).await.map_err(protocol_error)?;
        Ok(found.into_iter().map(ChromeElement::new).collect())
    }

    async fn screenshot(&self, path: &Path, full_page: bool) -> Result<(), DriverError> {
        self.ensure_open()?;
        let params = ScreenshotParams::builder().full_page(full_page).build();
        let png = self.page.screenshot(params).await.map_err(protocol_error)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, png).await?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        if self.ensure_open().is_err() {
            return false;
        }
        matches!(
            tokio::time::timeout(LIVENESS_TIMEOUT, self.page.get_title()).await,
            Ok(Ok(_))
        )
    }

    async fn close(&self) -> Result<(), DriverError> {
        if let Err(e) = self.page.clone().close().await {
            debug!("Page already closed: {}", e);
        }

        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            debug!("Browser already closed: {}", e);
        }
        if let Err(e) = browser.wait().await {
            debug!("Waiting for browser exit failed: {}", e);
        }
        self.events.abort();

        info!("Browser closed");
        Ok(())
    }
}
