use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

/// Upper bound when stepping past a skipped local midnight.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// The inclusive `[00:00:00.000, 23:59:59.999]` span of one local calendar day,
/// expressed in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Window of the current day in the server's local time zone.
    pub fn today() -> Self {
        Self::containing(Local::now())
    }

    /// Window of the calendar day `now` falls on, in `now`'s own time zone.
    ///
    /// The day ends one millisecond before the next day starts, so days with a
    /// DST transition are 23 or 25 hours long.
    pub fn containing<Tz: TimeZone>(now: DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let day = now.date_naive();
        let next_day = day + Duration::days(1);

        Self {
            start: start_of_day(&tz, day),
            end: start_of_day(&tz, next_day) - Duration::milliseconds(1),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }

    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

// A repeated midnight (DST fold) resolves to its first occurrence. A skipped
// midnight (DST gap) resolves to the first local minute after the jump.
fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);

    (0..=MAX_GAP_MINUTES)
        .find_map(|minutes| tz.from_local_datetime(&(midnight + Duration::minutes(minutes))).earliest())
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(|| {
            let before = tz.offset_from_utc_datetime(&(midnight - Duration::days(1))).fix();
            (midnight - Duration::seconds(i64::from(before.local_minus_utc()))).and_utc()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use chrono_tz::America::Sao_Paulo;
    use rstest::rstest;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap() + Duration::milliseconds(ms)
    }

    #[test]
    fn utc_day_spans_midnight_to_last_millisecond() {
        let window = DayWindow::containing(utc(2026, 10, 17, 15, 42, 7, 0));

        assert_eq!(window.start, utc(2026, 10, 17, 0, 0, 0, 0));
        assert_eq!(window.end, utc(2026, 10, 17, 23, 59, 59, 999));
    }

    #[test]
    fn window_follows_the_local_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = plus_two.with_ymd_and_hms(2026, 10, 17, 0, 30, 0).unwrap();

        let window = DayWindow::containing(now);

        assert_eq!(window.start, utc(2026, 10, 16, 22, 0, 0, 0));
        assert_eq!(window.end, utc(2026, 10, 17, 21, 59, 59, 999));
    }

    #[rstest]
    #[case::first_millisecond(utc(2026, 10, 17, 0, 0, 0, 0), true)]
    #[case::last_millisecond(utc(2026, 10, 17, 23, 59, 59, 999), true)]
    #[case::midday(utc(2026, 10, 17, 12, 0, 0, 0), true)]
    #[case::previous_day_last_millisecond(utc(2026, 10, 16, 23, 59, 59, 999), false)]
    #[case::next_day_midnight(utc(2026, 10, 18, 0, 0, 0, 0), false)]
    fn boundaries_are_inclusive(#[case] at: DateTime<Utc>, #[case] expected: bool) {
        let window = DayWindow::containing(utc(2026, 10, 17, 9, 0, 0, 0));

        assert_eq!(window.contains(at), expected);
    }

    #[test]
    fn millis_match_the_boundaries() {
        let window = DayWindow::containing(utc(2026, 1, 1, 5, 0, 0, 0));

        assert_eq!(window.end_millis() - window.start_millis(), 86_400_000 - 1);
    }

    // Sao Paulo skipped 2018-11-04 00:00, jumping from -03:00 to 01:00 at -02:00.
    #[test]
    fn skipped_midnight_starts_the_day_after_the_jump() {
        let now = Sao_Paulo.with_ymd_and_hms(2018, 11, 4, 10, 0, 0).unwrap();

        let window = DayWindow::containing(now);

        assert_eq!(window.start, utc(2018, 11, 4, 3, 0, 0, 0));
        assert_eq!(window.end, utc(2018, 11, 5, 1, 59, 59, 999));
        // 23:30 on the 3rd, local time.
        assert!(!window.contains(utc(2018, 11, 4, 2, 30, 0, 0)));
        assert!(!window.contains(utc(2018, 11, 4, 2, 59, 59, 999)));
    }

    #[test]
    fn day_before_a_skipped_midnight_ends_at_the_jump() {
        let now = Sao_Paulo.with_ymd_and_hms(2018, 11, 3, 12, 0, 0).unwrap();

        let window = DayWindow::containing(now);

        assert_eq!(window.start, utc(2018, 11, 3, 3, 0, 0, 0));
        assert_eq!(window.end, utc(2018, 11, 4, 2, 59, 59, 999));
    }

    // On 2019-02-17 Sao Paulo fell back from 00:00 at -02:00 to 23:00 at -03:00,
    // so the 16th has its last hour twice.
    #[test]
    fn repeated_hour_keeps_both_occurrences_in_the_day() {
        let now = Sao_Paulo.with_ymd_and_hms(2019, 2, 16, 12, 0, 0).unwrap();

        let window = DayWindow::containing(now);

        assert_eq!(window.start, utc(2019, 2, 16, 2, 0, 0, 0));
        assert_eq!(window.end, utc(2019, 2, 17, 2, 59, 59, 999));
        assert_eq!(window.end_millis() - window.start_millis(), 25 * 3_600_000 - 1);
    }
}
