//! Chromium implementation of the autofill page driver.
//!
//! [`ChromeBrowser::launch`] starts Chromium through the DevTools protocol
//! and opens one page; [`ChromePage`] and [`ChromeElement`] implement
//! [`autofill_core::FormPage`] and [`autofill_core::FormElement`].

mod browser;
mod element;
mod page;
mod scripts;

pub use browser::ChromeBrowser;
pub use element::ChromeElement;
pub use page::ChromePage;

use autofill_core::DriverError;

pub(crate) fn protocol_error(e: chromiumoxide::error::CdpError) -> DriverError {
    DriverError::Protocol(e.to_string())
}
