use chrono::{DateTime, Local, NaiveDate, Utc};

/// Represents an entity responsible for providing dates across the application.
/// This can allow it to be used for testing.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;

    /// The current local calendar day. Completion dates and "today" checks key
    /// off this, not off the UTC instant.
    fn today(&self) -> NaiveDate;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
