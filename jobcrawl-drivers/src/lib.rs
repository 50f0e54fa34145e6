//! Driver layer for browser automation.
//!
//! - [`browser::session::BrowserSession`]: what the crawler needs from a browser
//! - [`browser::driver::WebDriverSession`]: `fantoccini`-backed implementation
//! - [`browser::options`]: Chrome arguments and WebDriver capabilities
pub mod browser;

pub use browser::driver::WebDriverSession;
pub use browser::session::{BrowserSession, DriverError};
