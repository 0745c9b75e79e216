use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use std::io::{self, BufRead, Write};

use metabolic_core::ratio::is_therapeutic;

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday")
            }),
        },
    }
}

/// Parse `HH:MM` (24h). Defaults to the current local time.
pub(crate) fn parse_time(time_str: Option<String>) -> Result<NaiveTime> {
    match time_str {
        None => Ok(Local::now().time()),
        Some(s) => NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .with_context(|| format!("Invalid time '{s}'. Use HH:MM (24h)")),
    }
}

/// Combine a local date and time into a UTC instant.
pub(crate) fn local_timestamp(date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>> {
    let naive = date.and_time(time);
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("'{naive}' does not exist in the local timezone"))?;
    Ok(local.with_timezone(&Utc))
}

pub(crate) fn prompt_confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N]: ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    Ok(parse_confirmation(&line))
}

fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// `Dec 10, 8:00 AM` in local time.
pub(crate) fn format_date_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%b %-d, %-I:%M %p").to_string()
}

pub(crate) fn ratio_label(ratio: f64) -> String {
    if is_therapeutic(ratio) {
        format!("{ratio:.1} (optimal)")
    } else {
        format!("{ratio:.1}")
    }
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2025-12-10".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 12, 10).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_parse_time() {
        let t = parse_time(Some("07:45".to_string())).unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        assert!(parse_time(Some("25:00".to_string())).is_err());
        assert!(parse_time(Some("7am".to_string())).is_err());
    }

    #[test]
    fn test_local_timestamp_round_trips_to_local() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let time = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let ts = local_timestamp(date, time).unwrap();
        assert_eq!(ts.with_timezone(&Local).naive_local(), date.and_time(time));
    }

    #[test]
    fn test_parse_confirmation() {
        assert!(parse_confirmation("y"));
        assert!(parse_confirmation(" YES \n"));
        assert!(!parse_confirmation(""));
        assert!(!parse_confirmation("n"));
        assert!(!parse_confirmation("sure"));
    }

    #[test]
    fn test_ratio_label() {
        assert_eq!(ratio_label(77.5), "77.5 (optimal)");
        assert_eq!(ratio_label(80.0), "80.0");
        assert_eq!(ratio_label(0.0), "0.0");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("120/80", 10), "120/80");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
    }
}
