//! Natural-language date and duration parsing.
//!
//! Resolves expressions such as `2024-01-01 10:00`, `yesterday 3pm`,
//! `two hours ago`, `in 3 days` or `friday` against an explicit reference
//! time. Nothing here reads the system clock; callers pass `now`.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*(am|pm|a|p)?$").expect("valid time regex")
});

static DURATION_PART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\d+(?:\.\d+)?\s*|\b(?:an|a|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|fifteen|twenty|thirty|forty|fifty|sixty|ninety|half)\s+)(weeks|week|wks|wk|w|days|day|d|hours|hour|hrs|hr|h|minutes|minute|mins|min|m|seconds|second|secs|sec|s)",
    )
    .expect("valid duration regex")
});

const ABSOLUTE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

fn number_word(word: &str) -> Option<f64> {
    let value = match word {
        "a" | "an" | "one" => 1.0,
        "two" => 2.0,
        "three" => 3.0,
        "four" => 4.0,
        "five" => 5.0,
        "six" => 6.0,
        "seven" => 7.0,
        "eight" => 8.0,
        "nine" => 9.0,
        "ten" => 10.0,
        "eleven" => 11.0,
        "twelve" => 12.0,
        "fifteen" => 15.0,
        "twenty" => 20.0,
        "thirty" => 30.0,
        "forty" => 40.0,
        "fifty" => 50.0,
        "sixty" => 60.0,
        "ninety" => 90.0,
        "half" => 0.5,
        _ => return None,
    };
    Some(value)
}

fn unit_seconds(unit: &str) -> f64 {
    match unit.chars().next() {
        Some('w') => 604_800.0,
        Some('d') => 86_400.0,
        Some('h') => 3_600.0,
        Some('m') => 60.0,
        _ => 1.0,
    }
}

fn normalize(input: &str) -> String {
    input
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_lowercase()
}

/// Parses a duration such as `2h`, `1h30m`, `90 minutes`, `two hours` or
/// `an hour and 15 minutes`.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let text = normalize(input);
    if text.is_empty() {
        return None;
    }

    let mut seconds = 0.0;
    let mut matched = 0;
    for caps in DURATION_PART_RE.captures_iter(&text) {
        let word = caps[1].trim();
        let amount = word.parse::<f64>().ok().or_else(|| number_word(word))?;
        seconds += amount * unit_seconds(&caps[2]);
        matched += 1;
    }
    if matched == 0 {
        return None;
    }

    let rest = DURATION_PART_RE.replace_all(&text, "");
    let leftover_is_filler = rest
        .split(|c: char| c.is_whitespace() || c == ',')
        .all(|word| word.is_empty() || word == "and");
    if !leftover_is_filler {
        return None;
    }

    if !seconds.is_finite() {
        return None;
    }
    Duration::try_seconds(seconds.round() as i64)
}

/// Parses `X ago` into the duration `X`.
pub fn parse_ago(input: &str) -> Option<Duration> {
    let text = normalize(input);
    let rest = text.strip_suffix("ago")?;
    parse_duration(rest)
}

/// Parses a clock time: `15:30`, `3pm`, `3:30 pm`, `noon`, `midnight`.
/// A bare number without minutes or meridian is not a time.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let text = normalize(input);
    match text.as_str() {
        "noon" => return NaiveTime::from_hms_opt(12, 0, 0),
        "midnight" => return NaiveTime::from_hms_opt(0, 0, 0),
        _ => {}
    }

    let caps = TIME_RE.captures(&text)?;
    let minutes = caps.get(2);
    let meridian = caps.get(3).map(|m| m.as_str());
    if minutes.is_none() && meridian.is_none() {
        return None;
    }

    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = minutes.map_or(Some(0), |m| m.as_str().parse().ok())?;
    match meridian {
        Some(m) if m.starts_with('p') => {
            if hour > 12 {
                return None;
            }
            if hour < 12 {
                hour += 12;
            }
        }
        Some(_) => {
            if hour > 12 {
                return None;
            }
            if hour == 12 {
                hour = 0;
            }
        }
        None => {}
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    let weekday = match word {
        "mon" | "monday" => Weekday::Mon,
        "tue" | "tues" | "tuesday" => Weekday::Tue,
        "wed" | "wednesday" => Weekday::Wed,
        "thu" | "thur" | "thurs" | "thursday" => Weekday::Thu,
        "fri" | "friday" => Weekday::Fri,
        "sat" | "saturday" => Weekday::Sat,
        "sun" | "sunday" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

/// Most recent `weekday` on or before `today`; strictly before with `last`.
fn previous_weekday(today: NaiveDate, weekday: Weekday, strictly_before: bool) -> Option<NaiveDate> {
    let mut back = (7 + today.weekday().num_days_from_monday() as i64
        - weekday.num_days_from_monday() as i64)
        % 7;
    if back == 0 && strictly_before {
        back = 7;
    }
    today.checked_sub_signed(Duration::days(back))
}

/// Parses a day reference: ISO dates, `today`, `yesterday`, `tomorrow`,
/// weekday names and `last <weekday>`.
pub fn parse_day(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = normalize(input);
    match text.as_str() {
        "today" => return Some(today),
        "yesterday" => return today.pred_opt(),
        "tomorrow" => return today.succ_opt(),
        _ => {}
    }

    if let Some(name) = text.strip_prefix("last ") {
        return parse_weekday(name.trim()).and_then(|w| previous_weekday(today, w, true));
    }
    if let Some(weekday) = parse_weekday(&text) {
        return previous_weekday(today, weekday, false);
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&text, format).ok())
}

/// Resolves a natural-language date expression relative to `now`.
///
/// Day-only expressions resolve to midnight, time-only expressions to that
/// time today.
///
/// # Examples
///
/// ```
/// use logbook::chronify::chronify;
/// use chrono::NaiveDate;
///
/// let now = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let two_hours_ago = chronify("two hours ago", now).unwrap();
/// assert_eq!(two_hours_ago.to_string(), "2024-01-10 10:00:00");
///
/// let yesterday = chronify("yesterday 3pm", now).unwrap();
/// assert_eq!(yesterday.to_string(), "2024-01-09 15:00:00");
/// ```
pub fn chronify(input: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let text = normalize(input);
    if text.is_empty() {
        return None;
    }
    if text == "now" {
        return Some(now);
    }

    let raw = input.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    if let Some(date) = ABSOLUTE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(date);
    }

    if let Some(duration) = parse_ago(&text) {
        return now.checked_sub_signed(duration);
    }
    if let Some(rest) = text.strip_prefix("in ") {
        return parse_duration(rest).and_then(|d| now.checked_add_signed(d));
    }

    let today = now.date();
    if let Some(time) = parse_time(&text) {
        return Some(today.and_time(time));
    }
    if let Some(day) = parse_day(&text, today) {
        return Some(day.and_time(NaiveTime::MIN));
    }

    // "<day> [at] <time>", where the time may itself contain a space ("3 pm")
    let words: Vec<&str> = text.split_whitespace().collect();
    for split in 1..words.len() {
        let day_part = words[..split].join(" ");
        let day_part = day_part.strip_suffix(" at").unwrap_or(&day_part);
        let time_part = words[split..].join(" ");
        if let (Some(day), Some(time)) = (parse_day(day_part, today), parse_time(&time_part)) {
            return Some(day.and_time(time));
        }
    }

    None
}

/// Whether an expression names a whole day rather than an instant.
pub fn is_day_only(input: &str, now: NaiveDateTime) -> bool {
    parse_day(input, now.date()).is_some()
}
