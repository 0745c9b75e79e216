use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use metabolic_core::service::MetabolicService;

use super::helpers::{format_date_time, ratio_label, truncate};

pub(crate) fn cmd_history(svc: &MetabolicService, user: &str, json: bool) -> Result<()> {
    let entries = svc.history_for_user(user);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        eprintln!("No entries for {user}. Use `metabolic log` to record one.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "When")]
        when: String,
        #[tabled(rename = "State")]
        state: String,
        #[tabled(rename = "Glucose")]
        glucose: String,
        #[tabled(rename = "Ketones")]
        ketones: String,
        #[tabled(rename = "Ratio")]
        ratio: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "BF %")]
        body_fat: String,
        #[tabled(rename = "BP")]
        bp: String,
    }

    let rows: Vec<HistoryRow> = entries
        .iter()
        .map(|e| HistoryRow {
            id: truncate(&e.id, 12),
            when: format_date_time(&e.timestamp),
            state: e.state_label().to_uppercase(),
            glucose: format!("{}", e.glucose),
            ketones: format!("{}", e.ketones),
            ratio: ratio_label(e.ratio),
            weight: format!("{}", e.weight),
            body_fat: e
                .body_fat_percentage
                .map_or_else(String::new, |v| format!("{v}")),
            bp: e.blood_pressure.clone().unwrap_or_default(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..8)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_trend(svc: &MetabolicService, user: &str, json: bool) -> Result<()> {
    let points = svc.trend_for_user(user);

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }
    if points.is_empty() {
        eprintln!("No entries for {user}");
        return Ok(());
    }

    #[derive(Tabled)]
    struct TrendRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Weight (lbs)")]
        weight: String,
        #[tabled(rename = "Body Fat %")]
        body_fat: String,
        #[tabled(rename = "Glucose")]
        glucose: String,
        #[tabled(rename = "Ketones")]
        ketones: String,
        #[tabled(rename = "Ratio")]
        ratio: String,
    }

    let rows: Vec<TrendRow> = points
        .iter()
        .map(|p| TrendRow {
            date: p.date.clone(),
            weight: format!("{:.1}", p.weight),
            body_fat: p.body_fat.map_or("-".into(), |v| format!("{v:.1}")),
            glucose: format!("{:.0}", p.glucose),
            ketones: format!("{:.1}", p.ketones),
            ratio: format!("{:.1}", p.ratio),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
