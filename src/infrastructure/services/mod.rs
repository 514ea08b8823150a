//! Infrastructure services

mod scraper_service;

pub use scraper_service::ScraperService;
