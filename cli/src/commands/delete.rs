use anyhow::{Result, bail};

use metabolic_core::service::MetabolicService;

use super::helpers::{format_date_time, prompt_confirm};

pub(crate) fn cmd_delete(svc: &mut MetabolicService, id: &str, yes: bool, json: bool) -> Result<()> {
    let Some(entry) = svc.get(id) else {
        bail!("Entry '{id}' not found");
    };

    if !yes {
        let question = format!(
            "Delete {} entry for {} from {}?",
            entry.state_label().to_lowercase(),
            entry.user_id,
            format_date_time(&entry.timestamp)
        );
        if !prompt_confirm(&question)? {
            eprintln!("Cancelled");
            return Ok(());
        }
    }

    svc.delete(id)?;
    if svc.list().is_empty() {
        tracing::warn!("last entry deleted; the store keeps its previous contents");
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted entry {id}");
    }

    Ok(())
}
