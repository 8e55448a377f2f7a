use async_trait::async_trait;
use chrono::NaiveDate;
use clap::ValueEnum;

use crate::error::SourceError;

pub mod local;
pub mod parse;
pub mod web;

pub use local::{HolidayTable, LocalHolidaySource};
pub use web::{BrowserFetcher, ChallengeFetcher, PageFetcher, WebHolidaySource};

/// Which holiday source the bot runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Static table from holidays.json
    Local,
    /// Live scrape of the holiday page
    Web,
}

/// Resolves the list of holidays for a date.
///
/// `Ok` with an empty list means "no holidays today" and is not an error;
/// `Err` means the source itself could not be used.
#[async_trait]
pub trait HolidaySource: Send + Sync {
    fn name(&self) -> &str;

    async fn holidays_for(&self, date: NaiveDate) -> Result<Vec<String>, SourceError>;
}
