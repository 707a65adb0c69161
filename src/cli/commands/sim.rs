use crate::config::Config;
use crate::db::Store;

pub async fn cmd_sim_add(
    config: &Config,
    iccid: &str,
    imsi: &str,
    msisdn: &str,
    owner: &str,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let owner = store
        .get_user_by_username(owner)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User '{owner}' not found"))?;

    let sim = store.add_sim(iccid, imsi, msisdn, owner.id).await?;

    println!("✓ Registered SIM {}", sim.iccid);
    println!("  IMSI: {} | MSISDN: {}", sim.imsi, sim.msisdn);
    println!("  Owner: {} | Status: {}", owner.username, sim.status);
    Ok(())
}

pub async fn cmd_sim_deactivate(config: &Config, iccid: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    match store.deactivate_sim(iccid).await? {
        Some(previous) => {
            println!("✓ SIM {iccid} deactivated (was {previous})");
            Ok(())
        }
        None => anyhow::bail!("SIM {iccid} not found"),
    }
}

pub async fn cmd_sim_history(config: &Config, iccid: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let entries = store.list_operation_logs(iccid).await?;

    if entries.is_empty() {
        println!("No status changes recorded for SIM {iccid}");
        return Ok(());
    }

    println!("Status history for SIM {iccid}:");
    println!("{:-<70}", "");
    for entry in entries {
        println!(
            "{}  {:<10} {} -> {}  (user {})",
            entry.created_at,
            entry.action,
            entry.from_status.as_deref().unwrap_or("-"),
            entry.to_status,
            entry
                .user_id
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
        );
    }
    Ok(())
}
