use anyhow::Result;

use metabolic_core::models::THERAPEUTIC_ZONE_LIMIT;
use metabolic_core::service::MetabolicService;

use super::helpers::{no_neg_zero, ratio_label};

pub(crate) fn cmd_stats(svc: &MetabolicService, user: &str, json: bool) -> Result<()> {
    let stats = svc.stats_for_user(user);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("=== {user} ===\n");

    if stats.entries_count == 0 {
        println!("  No entries yet.");
        return Ok(());
    }

    let change = no_neg_zero(stats.weight_change);
    let trend = if change < 0.0 {
        format!(" (down {:.1} lbs)", change.abs())
    } else if change > 0.0 {
        format!(" (up {change:.1} lbs)")
    } else {
        String::new()
    };
    println!("  Current weight: {} lbs{trend}", stats.current_weight);

    if stats.last_ratio > 0.0 {
        println!("  Latest ratio:   {}", ratio_label(stats.last_ratio));
    } else {
        println!("  Latest ratio:   --");
    }
    println!("  Average ratio:  {:.1}", stats.avg_ratio);
    println!("  Entries:        {}", stats.entries_count);
    println!("\n  Therapeutic zone: ratio below {THERAPEUTIC_ZONE_LIMIT:.0}");

    Ok(())
}

pub(crate) fn cmd_users(current: &str, json: bool) -> Result<()> {
    use metabolic_core::models::USERS;

    if json {
        println!("{}", serde_json::to_string_pretty(USERS)?);
    } else {
        for u in USERS {
            let marker = if *u == current { "*" } else { " " };
            println!("{marker} {u}");
        }
    }
    Ok(())
}
