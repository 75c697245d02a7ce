use std::io::Write;

use eventhub_db::storage::{UserFilter, UserStore};

pub async fn list_users(stg: &impl UserStore, out: &mut impl Write) -> anyhow::Result<()> {
    let users = UserStore::list(stg, UserFilter::default()).await?;

    for user in &users {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            user.id, user.email, user.role, user.name
        )?;
    }

    Ok(())
}
