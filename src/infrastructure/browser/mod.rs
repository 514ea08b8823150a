//! Headless browser rendering over the Chrome DevTools Protocol

mod connection;
mod error;
mod fetcher;
mod launcher;
mod protocol;
#[cfg(test)]
mod testing;

pub use error::BrowserError;
pub use fetcher::BrowserFetcher;
