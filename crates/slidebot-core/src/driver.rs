//! Contracts with the outside world: the browser page and the display.

use std::time::Duration;

use crate::error::{DriverResult, ErrorCategory};

/// What to pull out of each element matched by [`PageDriver::query_all`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extractor {
    ClassName,
    InnerText,
    Attribute(String),
}

/// Blocking handle on a live game page.
///
/// Every call may fail; the board observer turns query failures into "no
/// data", while input and screenshot failures end the run.
pub trait PageDriver {
    /// Press and release a key by name (`ArrowUp`, ...)
    fn send_key(&mut self, key: &str) -> DriverResult<()>;

    /// Capture the visible page as encoded image bytes
    fn screenshot(&mut self) -> DriverResult<Vec<u8>>;

    /// Inner text of the first element matching `selector`
    fn query_text(&mut self, selector: &str) -> DriverResult<String>;

    /// Number of elements matching `selector`
    fn query_count(&mut self, selector: &str) -> DriverResult<usize>;

    /// One extracted string per element matching `selector`, in DOM order
    fn query_all(&mut self, selector: &str, extractor: Extractor) -> DriverResult<Vec<String>>;

    /// Block for `duration` to let the page settle
    fn wait(&mut self, duration: Duration);

    /// Release the page and its browser
    fn close(&mut self) -> DriverResult<()>;
}

/// Receiver of frames and log text. Fire and forget.
pub trait FrameSink {
    fn publish_frame(&mut self, image: &[u8], caption: &str);

    fn publish_log(&mut self, lines: &[String]);

    /// Called once when a run fails
    fn report_error(&mut self, _category: ErrorCategory, _detail: &str) {}
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl FrameSink for NoopSink {
    fn publish_frame(&mut self, _image: &[u8], _caption: &str) {}

    fn publish_log(&mut self, _lines: &[String]) {}
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn publish_frame(&mut self, image: &[u8], caption: &str) {
        (**self).publish_frame(image, caption)
    }

    fn publish_log(&mut self, lines: &[String]) {
        (**self).publish_log(lines)
    }

    fn report_error(&mut self, category: ErrorCategory, detail: &str) {
        (**self).report_error(category, detail)
    }
}

impl<D: PageDriver + ?Sized> PageDriver for Box<D> {
    fn send_key(&mut self, key: &str) -> DriverResult<()> {
        (**self).send_key(key)
    }

    fn screenshot(&mut self) -> DriverResult<Vec<u8>> {
        (**self).screenshot()
    }

    fn query_text(&mut self, selector: &str) -> DriverResult<String> {
        (**self).query_text(selector)
    }

    fn query_count(&mut self, selector: &str) -> DriverResult<usize> {
        (**self).query_count(selector)
    }

    fn query_all(&mut self, selector: &str, extractor: Extractor) -> DriverResult<Vec<String>> {
        (**self).query_all(selector, extractor)
    }

    fn wait(&mut self, duration: Duration) {
        (**self).wait(duration)
    }

    fn close(&mut self) -> DriverResult<()> {
        (**self).close()
    }
}
