//! Browser driver abstraction consumed by the capture action.
//!
//! This module provides:
//! - The `BrowserDriver` trait: what the store needs from an open browser
//! - `MockBrowser`: a framebuffer-backed page for tests and demos
//! - An adapter for `headless_chrome::Tab` (feature `chrome`)

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{ImageBuffer, RgbImage};
use std::io::Cursor;

use super::types::{SnapshotError, SnapshotResult};

/// An active browser the store can capture from
///
/// Implementations only read state; opening and closing the browser is the
/// test's business.
pub trait BrowserDriver {
    /// PNG-encoded screenshot of the current viewport
    fn screenshot_png(&self) -> SnapshotResult<Vec<u8>>;

    /// HTML of the current page
    fn page_source(&self) -> SnapshotResult<String>;

    /// URL of the current page, when known
    fn current_url(&self) -> Option<String> {
        None
    }
}

/// A virtual page rendered into an RGB framebuffer
///
/// Provides a small drawing API for building fixtures:
/// - `fill()` - Fill the whole viewport with a color
/// - `draw_rect()` - Draw a filled rectangle
/// - `draw_text()` - Draw text using font8x8 glyphs
/// - `get_pixel()` / `set_pixel()` - Direct pixel access
#[derive(Debug, Clone)]
pub struct MockBrowser {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// RGB pixel buffer (row-major, 3 bytes per pixel)
    buffer: Vec<u8>,
    /// Page URL
    url: Option<String>,
    /// Page HTML
    html: String,
    /// When set, every capture call fails with this message
    failure: Option<String>,
}

impl MockBrowser {
    /// Create a blank white page with the given viewport
    pub fn new(width: u32, height: u32) -> Self {
        let mut browser = Self {
            width,
            height,
            buffer: vec![0u8; width as usize * height as usize * 3],
            url: None,
            html: "<html><head></head><body></body></html>".to_string(),
            failure: None,
        };
        browser.fill([255, 255, 255]);
        browser
    }

    /// Load a page: sets the URL and HTML and draws the title in the top-left corner
    pub fn with_page(mut self, url: impl Into<String>, title: &str) -> Self {
        self.url = Some(url.into());
        self.html = format!(
            "<html><head><title>{}</title></head><body><h1>{}</h1></body></html>",
            title, title
        );
        self.draw_rect(0, 0, self.width, 16, [32, 32, 96]);
        self.draw_text(4, 4, title, [255, 255, 255], [32, 32, 96]);
        self
    }

    /// Make every capture fail, as a crashed or closed browser would
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fill the entire viewport with a color
    pub fn fill(&mut self, color: [u8; 3]) {
        for chunk in self.buffer.chunks_exact_mut(3) {
            chunk.copy_from_slice(&color);
        }
    }

    /// Draw a filled rectangle
    pub fn draw_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
        for py in y..y.saturating_add(h).min(self.height) {
            for px in x..x.saturating_add(w).min(self.width) {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Draw text using font8x8 glyphs
    ///
    /// Each character is 8x8 pixels. Text does not wrap.
    pub fn draw_text(&mut self, x: u32, y: u32, text: &str, fg: [u8; 3], bg: [u8; 3]) {
        let mut cursor_x = x;
        for ch in text.chars() {
            if cursor_x >= self.width {
                break;
            }
            self.draw_char(cursor_x, y, ch, fg, bg);
            cursor_x += 8;
        }
    }

    fn draw_char(&mut self, x: u32, y: u32, ch: char, fg: [u8; 3], bg: [u8; 3]) {
        let glyph = BASIC_FONTS.get(ch).unwrap_or([0u8; 8]);
        for (row_idx, row) in glyph.iter().enumerate() {
            let py = y + row_idx as u32;
            if py >= self.height {
                break;
            }
            for bit in 0..8 {
                let px = x + bit;
                if px >= self.width {
                    break;
                }
                // font8x8 stores LSB as leftmost pixel
                let color = if (row >> bit) & 1 == 1 { fg } else { bg };
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Get the color of a pixel
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0];
        }
        let idx = self.index(x, y);
        [self.buffer[idx], self.buffer[idx + 1], self.buffer[idx + 2]]
    }

    /// Set the color of a pixel
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        self.buffer[idx..idx + 3].copy_from_slice(&color);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Encode the viewport as PNG bytes
    pub fn to_png(&self) -> SnapshotResult<Vec<u8>> {
        let img: RgbImage = ImageBuffer::from_raw(self.width, self.height, self.buffer.clone())
            .ok_or_else(|| SnapshotError::Capture("framebuffer size does not match viewport".to_string()))?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }

    fn check_alive(&self) -> SnapshotResult<()> {
        match &self.failure {
            Some(message) => Err(SnapshotError::Capture(message.clone())),
            None => Ok(()),
        }
    }
}

impl BrowserDriver for MockBrowser {
    fn screenshot_png(&self) -> SnapshotResult<Vec<u8>> {
        self.check_alive()?;
        self.to_png()
    }

    fn page_source(&self) -> SnapshotResult<String> {
        self.check_alive()?;
        Ok(self.html.clone())
    }

    fn current_url(&self) -> Option<String> {
        self.url.clone()
    }
}

#[cfg(feature = "chrome")]
mod chrome {
    use headless_chrome::Tab;
    use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;

    use super::BrowserDriver;
    use crate::snapshot::types::{SnapshotError, SnapshotResult};

    impl BrowserDriver for Tab {
        fn screenshot_png(&self) -> SnapshotResult<Vec<u8>> {
            self.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
                .map_err(|e| SnapshotError::Capture(format!("CDP capture failed: {}", e)))
        }

        fn page_source(&self) -> SnapshotResult<String> {
            self.get_content()
                .map_err(|e| SnapshotError::Capture(format!("Failed to read page content: {}", e)))
        }

        fn current_url(&self) -> Option<String> {
            Some(self.get_url())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_browser_new_is_white() {
        let browser = MockBrowser::new(100, 50);
        assert_eq!(browser.width(), 100);
        assert_eq!(browser.height(), 50);
        assert_eq!(browser.get_pixel(0, 0), [255, 255, 255]);
        assert_eq!(browser.get_pixel(99, 49), [255, 255, 255]);
        assert_eq!(browser.current_url(), None);
    }

    #[test]
    fn test_mock_browser_draw_rect() {
        let mut browser = MockBrowser::new(20, 20);
        browser.fill([0, 0, 0]);
        browser.draw_rect(5, 5, 10, 10, [255, 0, 0]);

        assert_eq!(browser.get_pixel(4, 4), [0, 0, 0]);
        assert_eq!(browser.get_pixel(5, 5), [255, 0, 0]);
        assert_eq!(browser.get_pixel(14, 14), [255, 0, 0]);
        assert_eq!(browser.get_pixel(15, 15), [0, 0, 0]);
    }

    #[test]
    fn test_mock_browser_draw_rect_clamps_at_u32_max() {
        let mut browser = MockBrowser::new(10, 10);
        browser.draw_rect(8, 8, u32::MAX, u32::MAX, [0, 255, 0]);

        assert_eq!(browser.get_pixel(7, 7), [255, 255, 255]);
        assert_eq!(browser.get_pixel(9, 9), [0, 255, 0]);
    }

    #[test]
    fn test_mock_browser_with_page() {
        let browser = MockBrowser::new(200, 100).with_page("http://localhost/login", "Login");
        assert_eq!(browser.current_url().as_deref(), Some("http://localhost/login"));
        assert!(browser.page_source().unwrap().contains("<title>Login</title>"));

        // Title bar is drawn, and 'L' has foreground pixels in it
        let has_fg = (4..12).any(|y| (4..12).any(|x| browser.get_pixel(x, y) == [255, 255, 255]));
        assert!(has_fg, "title glyph should be drawn");
        assert_eq!(browser.get_pixel(150, 50), [255, 255, 255]);
    }

    #[test]
    fn test_mock_browser_screenshot_is_png() {
        let browser = MockBrowser::new(32, 32);
        let png = browser.screenshot_png().unwrap();
        assert_eq!(&png[0..4], &[0x89, 0x50, 0x4E, 0x47]);

        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.width(), 32);
        assert_eq!(decoded.get_pixel(3, 3).0, [255, 255, 255]);
    }

    #[test]
    fn test_mock_browser_failing() {
        let browser = MockBrowser::new(10, 10).failing("browser has been closed");
        let err = browser.screenshot_png().unwrap_err();
        assert_eq!(err.to_string(), "Capture error: browser has been closed");
        assert!(browser.page_source().is_err());
    }
}
