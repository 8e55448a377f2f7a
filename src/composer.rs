use chrono::{Local, NaiveDate};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{ComposeError, SourceError};
use crate::holidays::HolidaySource;
use crate::toasts::ToastStore;

pub const MSG_HOLIDAYS_UNAVAILABLE: &str =
    "Не могу загрузить праздники — файл отсутствует или поврежден.";
pub const MSG_SITE_DOWN: &str = "Сайт с праздниками не отвечает, попробуйте позже.";
pub const MSG_NO_HOLIDAY: &str = "Сегодня не нашел праздников. Но повод придумать несложно 😉";
pub const MSG_TOASTS_UNAVAILABLE: &str =
    "Не могу подобрать тост — файл с тостами отсутствует или поврежден.";

/// Today's date on the local calendar
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Turns today's date into the final reply text
pub struct Composer {
    source: Arc<dyn HolidaySource>,
    toasts: Arc<ToastStore>,
    rng: Mutex<StdRng>,
}

impl Composer {
    pub fn new(source: Arc<dyn HolidaySource>, toasts: Arc<ToastStore>, rng: StdRng) -> Self {
        Self {
            source,
            toasts,
            rng: Mutex::new(rng),
        }
    }

    /// Composer with an RNG seeded from OS entropy
    pub fn with_entropy(source: Arc<dyn HolidaySource>, toasts: Arc<ToastStore>) -> Self {
        Self::new(source, toasts, StdRng::from_entropy())
    }

    /// Build the reply for `today`. Never fails: every error becomes user-facing text.
    pub async fn compose_message(&self, today: NaiveDate) -> String {
        let holidays = match self.source.holidays_for(today).await {
            Ok(holidays) => holidays,
            Err(SourceError::Unavailable(reason)) => {
                warn!(source = self.source.name(), %reason, "Holiday source unavailable");
                return MSG_HOLIDAYS_UNAVAILABLE.to_string();
            }
            Err(SourceError::Fetch(e)) => {
                warn!(source = self.source.name(), error = %e, "Holiday fetch failed");
                return MSG_SITE_DOWN.to_string();
            }
        };

        if holidays.is_empty() {
            info!(date = %today, "No holidays found for today");
            return MSG_NO_HOLIDAY.to_string();
        }

        match self.compose_reply(today, &holidays) {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Failed to compose toast");
                MSG_TOASTS_UNAVAILABLE.to_string()
            }
        }
    }

    /// Pick one holiday and one toast and format the reply
    pub fn compose_reply(
        &self,
        today: NaiveDate,
        holidays: &[String],
    ) -> Result<String, ComposeError> {
        let mut rng = self.rng.lock();
        let Some(holiday) = holidays.choose(&mut *rng) else {
            return Ok(MSG_NO_HOLIDAY.to_string());
        };
        let toast = self.toasts.pick(&mut *rng)?.render(holiday)?;

        Ok(format!(
            "Сегодня {} — {}\n\n{}",
            today.format("%d.%m.%Y"),
            holiday,
            toast
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::holidays::{HolidayTable, LocalHolidaySource};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;
    use std::time::Duration;

    struct FailingSource;

    #[async_trait]
    impl HolidaySource for FailingSource {
        fn name(&self) -> &str {
            "FailingSource"
        }

        async fn holidays_for(&self, _date: NaiveDate) -> Result<Vec<String>, SourceError> {
            Err(FetchError::Timeout(Duration::from_secs(15)).into())
        }
    }

    fn local(records: Vec<serde_json::Value>) -> Arc<dyn HolidaySource> {
        Arc::new(LocalHolidaySource::new(HolidayTable::from_records(records)))
    }

    fn toasts(templates: &[&str]) -> Arc<ToastStore> {
        Arc::new(ToastStore::from_templates(
            templates.iter().map(|t| t.to_string()).collect(),
        ))
    }

    fn new_year() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn new_year_reply() {
        let composer = Composer::new(
            local(vec![json!({"date": "01-01", "holidays": ["New Year"]})]),
            toasts(&["Happy {holiday}!"]),
            StdRng::seed_from_u64(42),
        );

        let reply = composer.compose_message(new_year()).await;
        assert_eq!(reply, "Сегодня 01.01.2025 — New Year\n\nHappy New Year!");
        assert!(reply.contains("New Year"));
        assert!(reply.contains("Happy New Year!"));
    }

    #[tokio::test]
    async fn toast_contains_holiday_once() {
        let composer = Composer::new(
            local(vec![json!({"date": "01-01", "holidays": ["Праздник"]})]),
            toasts(&["За {holiday}, друзья!"]),
            StdRng::seed_from_u64(3),
        );

        let reply = composer.compose_message(new_year()).await;
        let toast = reply.split("\n\n").nth(1).unwrap();
        assert_eq!(toast.matches("Праздник").count(), 1);
    }

    #[tokio::test]
    async fn missing_date_gives_no_holiday_message() {
        let composer = Composer::new(
            local(vec![json!({"date": "12-31", "holidays": ["New Year's Eve"]})]),
            toasts(&["Happy {holiday}!"]),
            StdRng::seed_from_u64(1),
        );

        assert_eq!(composer.compose_message(new_year()).await, MSG_NO_HOLIDAY);
    }

    #[tokio::test]
    async fn empty_table_gives_unavailable_message() {
        let composer = Composer::new(
            local(vec![]),
            toasts(&["Happy {holiday}!"]),
            StdRng::seed_from_u64(1),
        );

        assert_eq!(
            composer.compose_message(new_year()).await,
            MSG_HOLIDAYS_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn fetch_timeout_gives_site_down_message() {
        let composer = Composer::new(
            Arc::new(FailingSource),
            toasts(&["Happy {holiday}!"]),
            StdRng::seed_from_u64(1),
        );

        assert_eq!(composer.compose_message(new_year()).await, MSG_SITE_DOWN);
    }

    #[tokio::test]
    async fn empty_toast_store_is_reported_separately() {
        let composer = Composer::new(
            local(vec![json!({"date": "01-01", "holidays": ["New Year"]})]),
            toasts(&[]),
            StdRng::seed_from_u64(1),
        );

        assert!(matches!(
            composer.compose_reply(new_year(), &["New Year".to_string()]),
            Err(ComposeError::NoToasts)
        ));
        assert_eq!(
            composer.compose_message(new_year()).await,
            MSG_TOASTS_UNAVAILABLE
        );
    }

    #[test]
    fn every_pair_is_reachable() {
        let holidays: Vec<String> = ["A", "B", "C"].iter().map(|h| h.to_string()).collect();
        let composer = Composer::new(
            local(vec![]),
            toasts(&["1 {holiday}", "2 {holiday}"]),
            StdRng::seed_from_u64(2024),
        );

        let mut seen = HashSet::new();
        for _ in 0..500 {
            let reply = composer.compose_reply(new_year(), &holidays).unwrap();
            let toast = reply.split("\n\n").nth(1).unwrap().to_string();
            seen.insert(toast);
        }

        assert_eq!(seen.len(), holidays.len() * 2);
    }

    #[test]
    fn same_seed_same_reply() {
        let holidays: Vec<String> = (0..10).map(|i| format!("Holiday {i}")).collect();
        let make = || {
            Composer::new(
                local(vec![]),
                toasts(&["1 {holiday}", "2 {holiday}", "3 {holiday}"]),
                StdRng::seed_from_u64(99),
            )
        };

        let (a, b) = (make(), make());
        for _ in 0..5 {
            assert_eq!(
                a.compose_reply(new_year(), &holidays).unwrap(),
                b.compose_reply(new_year(), &holidays).unwrap()
            );
        }
    }
}
