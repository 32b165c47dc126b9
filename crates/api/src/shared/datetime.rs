use chrono::{Date, DateTime};
use chrono_tz::Tz;

/// Earliest valid wall-clock instant on `date` at or after `hour:00:00`.
///
/// Local times erased by a DST transition (including midnight in zones that
/// shift at 24:00) are skipped to the next existing hour; if every remaining
/// hour of the day is invalid the search rolls into the following day.
pub fn earliest_instant_at_or_after(date: Date<Tz>, hour: u32) -> DateTime<Tz> {
    let mut date = date;
    let mut hour = hour;
    loop {
        for h in hour..24 {
            if let Some(instant) = date.and_hms_opt(h, 0, 0) {
                return instant;
            }
        }
        date = date.succ();
        hour = 0;
    }
}
