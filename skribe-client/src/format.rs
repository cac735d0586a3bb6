//! Display helpers

use chrono::{DateTime, TimeZone};
use rand::distributions::Uniform;
use rand::Rng;
use std::fmt::Display;

const SESSION_ID_LEN: usize = 26;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `HH:MM`, 24-hour, in the timestamp's own zone
pub fn format_timestamp<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format("%H:%M").to_string()
}

/// `Jan 5, 2025`
pub fn format_date<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format("%b %-d, %Y").to_string()
}

/// Random lowercase base-36 identifier
pub fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let digits = Uniform::from(0..BASE36.len());
    (0..SESSION_ID_LEN)
        .map(|_| BASE36[rng.sample(digits)] as char)
        .collect()
}
