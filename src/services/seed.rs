//! Reference rows every deployment needs: board roles and task statuses.

use tracing::info;

use crate::db::models::{NewStatus, RoleName, DEFAULT_STATUSES};
use crate::db::prelude::*;
use crate::db::StoreResult;

/// Inserts the roles and statuses when their tables are empty. Safe to run
/// on every start.
pub async fn run(store: &dyn Store) -> StoreResult<()> {
    if store.list_roles().await?.is_empty() {
        for role in RoleName::ALL {
            store.insert_role(role).await?;
        }
        info!(count = RoleName::ALL.len(), "seeded roles");
    }

    if store.list_statuses().await?.is_empty() {
        for (name, color_code) in DEFAULT_STATUSES {
            store
                .insert_status(NewStatus {
                    name: name.to_owned(),
                    color_code: color_code.to_owned(),
                })
                .await?;
        }
        info!(count = DEFAULT_STATUSES.len(), "seeded statuses");
    }
    Ok(())
}
