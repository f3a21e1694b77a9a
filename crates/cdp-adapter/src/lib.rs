//! Chromium backend
//!
//! Implements the driver traits from `storefront-core-types` on top of
//! `chromiumoxide`: one browser process per opened page, CSS/XPath queries,
//! JS helpers for element state and console/request capture.

pub mod config;
mod element;
mod errors;
mod launcher;
mod lowering;
mod page;

pub use config::{detect_chrome_executable, BrowserSettings};
pub use element::ChromiumElement;
pub use errors::map_cdp_error;
pub use launcher::ChromiumLauncher;
pub use lowering::{aria_xpath, text_xpath, xpath_literal};
pub use page::ChromiumPage;
