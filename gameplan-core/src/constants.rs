/// Local registry key of the club calendar.
pub const CLUB_CALENDAR_KEY: &str = "club";

/// Venue timezone used when nothing else is configured.
pub const DEFAULT_TIME_ZONE: &str = "Europe/Zurich";

/// Page size for listing remote events.
pub const DEFAULT_MAX_RESULTS: usize = 500;

/// Games have no end time in the schedule; every event lasts this long.
pub const DEFAULT_EVENT_DURATION_HOURS: i64 = 2;

pub const DEFAULT_REMINDER_MINUTES: i64 = 120;

pub const DEFAULT_SOURCE_URL: &str = "https://probasket.ch/season.php";
