//! One form-filling run over a page, from navigation to close.

use std::future::pending;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{FieldFiller, FieldMatcher, FormInspector, FormPage};
use crate::error::{DriverError, FillError};
use crate::models::config::FormConfig;
use crate::models::fields::FieldMap;
use crate::models::report::{FillReport, FillStatus, QuestionOutcome};

/// Lifecycle of a [`FormFillSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed over a launched browser's page, not yet run.
    Idle,
    BrowserLaunched,
    PageLoaded,
    Inspecting,
    Matching,
    Filling,
    ScreenshotCaptured,
    Holding,
    Closed,
    ClosedAfterError,
}

/// Prefix `https://` when the scheme is missing and open previews as the
/// fillable view.
pub fn normalize_form_url(url: &str) -> String {
    let url = url.trim();
    let url = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };
    url.replace("/preview", "/viewform")
}

/// Drives a page through load, fill, screenshot, hold and close.
pub struct FormFillSession<P: FormPage> {
    page: P,
    config: FormConfig,
    state: SessionState,
    inspector: FormInspector,
    matcher: FieldMatcher,
    filler: FieldFiller,
    interrupt: Option<oneshot::Receiver<()>>,
}

impl<P: FormPage> FormFillSession<P> {
    /// Session over a page of a freshly launched browser.
    pub fn new(page: P, config: FormConfig) -> Self {
        Self {
            page,
            inspector: FormInspector::new(Duration::from_secs(config.question_wait_secs)),
            matcher: FieldMatcher::new(),
            filler: FieldFiller::new(config.clone()),
            config,
            state: SessionState::Idle,
            interrupt: None,
        }
    }

    /// Channel that cancels the run, typically fed by Ctrl-C. It aborts
    /// filling and ends the hold early.
    pub fn with_interrupt(mut self, interrupt: oneshot::Receiver<()>) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Fill the form at `url` with `fields` and close the page.
    ///
    /// On a fatal error an error screenshot is attempted, the browser is held
    /// open if configured, and the page is closed before the error returns.
    /// When the interrupt fires during filling the page is closed at once.
    pub async fn run(&mut self, url: &str, fields: &FieldMap) -> Result<FillReport, FillError> {
        self.state = SessionState::BrowserLaunched;
        let mut interrupt = self.interrupt.take();
        let filled = tokio::select! {
            result = self.fill(url, fields) => Some(result),
            _ = interrupted(&mut interrupt) => None,
        };
        let Some(result) = filled else {
            warn!("Interrupted while filling, closing browser");
            self.close(SessionState::ClosedAfterError).await;
            return Err(FillError::Interrupted);
        };
        self.interrupt = interrupt;

        match result {
            Ok(mut report) => {
                report.screenshot = self.capture_screenshot().await;
                self.state = SessionState::ScreenshotCaptured;
                info!(
                    "Filled {}/{} fields ({})",
                    report.filled,
                    report.total,
                    report.success_rate()
                );

                if self.config.hold_open {
                    self.hold_until_closed().await;
                }
                self.close(SessionState::Closed).await;
                Ok(report)
            }
            Err(e) => {
                warn!("Form filling failed: {}", e);
                let path = self.config.error_screenshot_path();
                if let Err(shot) = self.write_screenshot(&path, false).await {
                    debug!("Error screenshot failed: {}", shot);
                }

                if self.config.hold_open {
                    self.hold_until_closed().await;
                }
                self.close(SessionState::ClosedAfterError).await;
                Err(e)
            }
        }
    }

    async fn fill(&mut self, url: &str, fields: &FieldMap) -> Result<FillReport, FillError> {
        let url = normalize_form_url(url);
        self.load(&url).await?;

        self.state = SessionState::Inspecting;
        let groups = self.inspector.enumerate(&self.page).await?;

        let mut report = FillReport::default();
        for group in groups {
            self.state = SessionState::Matching;
            let resolved = self.matcher.resolve(&group.label, fields);

            let outcome = match resolved {
                None => {
                    debug!("[{}] {}: no matching data", group.index, group.label);
                    QuestionOutcome {
                        index: group.index,
                        field: self.matcher.match_label(&group.label),
                        label: group.label,
                        status: FillStatus::NoValue,
                    }
                }
                Some((kind, value)) => {
                    self.state = SessionState::Filling;
                    let status = match self.filler.fill(&group.element, value).await {
                        Some(strategy) => {
                            info!("[{}] {}: filled {} via {}", group.index, group.label, kind, strategy);
                            FillStatus::Filled { strategy }
                        }
                        None => {
                            warn!("[{}] {}: could not fill {}", group.index, group.label, kind);
                            FillStatus::Failed
                        }
                    };
                    QuestionOutcome {
                        index: group.index,
                        label: group.label,
                        field: Some(kind),
                        status,
                    }
                }
            };
            report.record(outcome);
        }

        Ok(report)
    }

    async fn load(&mut self, url: &str) -> Result<(), FillError> {
        info!("Loading {}", url);
        let limit = self.config.page_load_timeout();

        let loaded = match tokio::time::timeout(limit, self.page.goto(url)).await {
            Ok(result) => result,
            Err(_) => Err(DriverError::Timeout {
                action: "navigation",
                millis: limit.as_millis() as u64,
            }),
        };
        loaded.map_err(|source| FillError::PageLoad {
            url: url.to_string(),
            source,
        })?;

        if self.config.settle_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;
        }
        self.state = SessionState::PageLoaded;
        Ok(())
    }

    async fn capture_screenshot(&mut self) -> Option<PathBuf> {
        if self.config.screenshot_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.screenshot_delay_ms)).await;
        }

        let path = self.config.screenshot_path();
        match self.write_screenshot(&path, true).await {
            Ok(()) => {
                info!("Screenshot saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Screenshot failed: {}", e);
                None
            }
        }
    }

    async fn write_screenshot(&self, path: &Path, full_page: bool) -> Result<(), DriverError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        self.page.screenshot(path, full_page).await
    }

    /// Wait until the user closes the page, the interrupt fires, or the
    /// maximum hold elapses.
    async fn hold_until_closed(&mut self) {
        self.state = SessionState::Holding;
        info!("Browser stays open for review; close it or press Ctrl-C to finish");

        let poll = Duration::from_millis(self.config.liveness_poll_ms.max(1));
        let deadline = self
            .config
            .max_hold_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        let mut interrupt = self.interrupt.take();

        loop {
            tokio::select! {
                _ = interrupted(&mut interrupt) => {
                    info!("Interrupted, closing browser");
                    break;
                }
                _ = wait_until(deadline) => {
                    info!("Maximum hold time reached");
                    break;
                }
                _ = tokio::time::sleep(poll) => {
                    if !self.page.is_alive().await {
                        info!("Browser closed by user");
                        break;
                    }
                }
            }
        }
    }

    async fn close(&mut self, state: SessionState) {
        if let Err(e) = self.page.close().await {
            debug!("Close failed: {}", e);
        }
        self.state = state;
    }
}

/// Resolves only when the interrupt fires. A dropped sender clears the
/// channel and never resolves.
async fn interrupted(interrupt: &mut Option<oneshot::Receiver<()>>) {
    let fired = match interrupt.as_mut() {
        Some(rx) => rx.await.is_ok(),
        None => false,
    };
    if fired {
        return;
    }
    *interrupt = None;
    pending::<()>().await
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => pending().await,
    }
}
