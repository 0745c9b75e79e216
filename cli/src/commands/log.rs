use anyhow::Result;

use metabolic_core::models::{NewEntry, validate_user};
use metabolic_core::service::MetabolicService;

use super::helpers::{format_date_time, local_timestamp, parse_date, parse_time, ratio_label};

pub(crate) struct LogArgs {
    pub glucose: f64,
    pub ketones: f64,
    pub weight: f64,
    pub user: String,
    pub fed: bool,
    pub body_fat: Option<f64>,
    pub bp: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub json: bool,
}

pub(crate) fn cmd_log(svc: &mut MetabolicService, args: LogArgs) -> Result<()> {
    let user = validate_user(&args.user)?;
    let timestamp = local_timestamp(parse_date(args.date)?, parse_time(args.time)?)?;
    let blood_pressure = args
        .bp
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let entry = svc.add(NewEntry {
        timestamp,
        user_id: user,
        is_fasted: !args.fed,
        glucose: args.glucose,
        ketones: args.ketones,
        weight: args.weight,
        body_fat_percentage: args.body_fat,
        blood_pressure,
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "Logged {} entry for {} at {}",
            entry.state_label().to_lowercase(),
            entry.user_id,
            format_date_time(&entry.timestamp)
        );
        println!(
            "  Glucose {} mg/dL | Ketones {} mmol/L | Ratio {}",
            entry.glucose,
            entry.ketones,
            ratio_label(entry.ratio)
        );
        println!("  Weight {} lbs", entry.weight);
        if let Some(bf) = entry.body_fat_percentage {
            println!("  Body fat {bf}%");
        }
        if let Some(ref bp) = entry.blood_pressure {
            println!("  Blood pressure {bp}");
        }
        println!("  ID: {}", entry.id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(glucose: f64, ketones: f64, weight: f64) -> LogArgs {
        LogArgs {
            glucose,
            ketones,
            weight,
            user: "TC".to_string(),
            fed: false,
            body_fat: None,
            bp: Some(" 120/80 ".to_string()),
            date: Some("2025-12-11".to_string()),
            time: Some("08:00".to_string()),
            json: true,
        }
    }

    #[test]
    fn test_log_adds_entry() {
        let mut svc = MetabolicService::new_in_memory().unwrap();
        cmd_log(&mut svc, args(93.0, 1.2, 197.0)).unwrap();
        assert_eq!(svc.list().len(), 2);
        assert_eq!(svc.list()[0].blood_pressure.as_deref(), Some("120/80"));
    }

    #[test]
    fn test_log_reports_measurement_errors_from_core() {
        let mut svc = MetabolicService::new_in_memory().unwrap();
        let cases = [
            (args(0.0, 1.2, 197.0), "Glucose must be greater than 0"),
            (args(93.0, -0.1, 197.0), "Ketones must not be negative"),
            (args(93.0, 1.2, f64::NAN), "Weight must be greater than 0"),
        ];
        for (input, message) in cases {
            let err = cmd_log(&mut svc, input).unwrap_err();
            assert_eq!(err.to_string(), message);
        }
        assert_eq!(svc.list().len(), 1);
    }
}
