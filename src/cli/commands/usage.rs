use crate::config::Config;
use crate::db::Store;
use crate::domain::BillingMonth;

pub async fn cmd_usage_set(
    config: &Config,
    iccid: &str,
    month: &str,
    total_mb: i64,
    used_mb: i64,
) -> anyhow::Result<()> {
    let month: BillingMonth = month.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    if total_mb < 0 || used_mb < 0 {
        anyhow::bail!("Usage figures must not be negative");
    }

    let store = Store::new(&config.general.database_path).await?;

    if store.get_sim(iccid).await?.is_none() {
        anyhow::bail!("SIM {iccid} not found");
    }

    store.set_usage(iccid, &month, total_mb, used_mb).await?;

    println!("✓ Usage for SIM {iccid} in {month}: {used_mb}/{total_mb} MB");
    Ok(())
}
