use crate::config::Config;
use crate::db::Store;

pub async fn cmd_user_add(config: &Config, username: &str, password: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    if store.get_user_by_username(username).await?.is_some() {
        anyhow::bail!("User '{username}' already exists");
    }

    let user = store
        .create_user(username, password, &config.security)
        .await?;

    println!("✓ Created user '{}' (id {})", user.username, user.id);
    Ok(())
}

pub async fn cmd_user_disable(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    if store.set_user_active(username, false).await? {
        println!("✓ Disabled user '{username}'");
        Ok(())
    } else {
        anyhow::bail!("User '{username}' not found")
    }
}
