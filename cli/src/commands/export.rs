use std::path::Path;

use anyhow::Result;

use metabolic_core::service::MetabolicService;

pub(crate) fn cmd_export(
    svc: &MetabolicService,
    user: &str,
    out_dir: &Path,
    stdout: bool,
    json: bool,
) -> Result<()> {
    let export = svc.export_for_user(user)?;

    if stdout {
        println!("{}", export.content);
        return Ok(());
    }

    let path = export.write_to(out_dir)?;
    let rows = export.content.lines().count().saturating_sub(1);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "path": path.display().to_string(),
                "mime": export.mime,
                "rows": rows,
            })
        );
    } else {
        println!("Exported {rows} entries for {user} to {}", path.display());
    }

    Ok(())
}
