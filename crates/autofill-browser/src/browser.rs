//! Browser process launch.

use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::handler::viewport::Viewport;
use futures_util::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use autofill_core::FillError;
use autofill_core::models::config::BrowserConfig;

use crate::page::ChromePage;

/// Launches Chromium with the configured switches and viewport.
pub struct ChromeBrowser;

impl ChromeBrowser {
    /// Start a browser and open a blank page in it.
    pub async fn launch(config: &BrowserConfig) -> Result<ChromePage, FillError> {
        let cdp_config = Self::cdp_config(config)?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| FillError::BrowserLaunch(e.to_string()))?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser event loop ended: {}", e);
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FillError::BrowserLaunch(e.to_string()))?;

        if let Some(user_agent) = &config.user_agent {
            page.set_user_agent(SetUserAgentOverrideParams::new(user_agent.clone()))
                .await
                .map_err(|e| FillError::BrowserLaunch(e.to_string()))?;
        }

        info!(
            "Browser launched ({}, {}x{})",
            if config.headless { "headless" } else { "visible" },
            config.window_width,
            config.window_height
        );

        Ok(ChromePage::new(page, Mutex::new(browser), events))
    }

    fn cdp_config(config: &BrowserConfig) -> Result<CdpConfig, FillError> {
        let mut builder = CdpConfig::builder()
            .window_size(config.window_width, config.window_height)
            .viewport(Viewport {
                width: config.window_width,
                height: config.window_height,
                ..Default::default()
            })
            .args(config.args.iter().map(String::as_str));

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &config.executable {
            builder = builder.chrome_executable(executable);
        }

        builder.build().map_err(FillError::BrowserLaunch)
    }
}
