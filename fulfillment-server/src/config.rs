//! Server configuration.

use chrono_tz::Tz;
use std::path::PathBuf;

/// Configuration for one fulfillment core instance.
///
/// One instance serves exactly one venue; multi-venue deployments run one
/// instance per venue and scope notifications by `venue_id`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub venue_id: String,
    pub venue_name: String,
    /// Path of the redb database file
    pub db_path: PathBuf,
    /// Venue-local timezone, used for ticket rendering
    pub timezone: Tz,
    /// Capacity of the change-notice broadcast channel
    pub channel_capacity: usize,
}

impl ServerConfig {
    pub fn new(venue_id: impl Into<String>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            venue_id: venue_id.into(),
            venue_name: String::new(),
            db_path: db_path.into(),
            timezone: chrono_tz::America::Sao_Paulo,
            channel_capacity: 4096,
        }
    }

    pub fn with_venue_name(mut self, name: impl Into<String>) -> Self {
        self.venue_name = name.into();
        self
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }
}
