use serde_json::Value;

use crate::error::SessionError;

/// Page-level operations the graph pipeline needs from a browser.
///
/// Implemented by `BrowserSession`; tests substitute in-memory drivers.
pub trait PageDriver {
    /// Load `url` and wait for it to settle.
    fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    /// Run the extraction script on the current page. `Ok(None)` means the
    /// extraction timed out and the page should be treated as empty.
    fn extract(&mut self) -> Result<Option<Value>, SessionError>;

    /// Release the browser. Must be safe to call more than once.
    fn close(&mut self);
}

impl<D: PageDriver + ?Sized> PageDriver for Box<D> {
    fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        (**self).navigate(url)
    }

    fn extract(&mut self) -> Result<Option<Value>, SessionError> {
        (**self).extract()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
