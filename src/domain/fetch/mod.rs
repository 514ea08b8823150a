//! Fetch domain - retrieving upstream HTML documents

mod fetcher;

pub use fetcher::PageFetcher;

#[cfg(test)]
pub use fetcher::MockPageFetcher;
#[cfg(test)]
pub use fetcher::mock::StubFetcher;
