//! Embedded PostgreSQL provisioning for adapter tests.
//!
//! Every test gets its own temporary database on the shared cluster, migrated
//! with the same embedded migrations the server applies at startup.

use std::time::Duration;

use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use portal::outbound::persistence::run_migrations;
use tokio::runtime::Runtime;

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Shared cluster for this test binary, retrying transient bootstrap failures.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt < SHARED_CLUSTER_RETRIES => {
                eprintln!("pg-embed: attempt {attempt}/{SHARED_CLUSTER_RETRIES} failed: {error:?}");
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
            Err(error) => return Err(format!("shared cluster: {error:?}")),
        }
    }
}

/// Create a fresh database and apply every migration to it.
pub fn provision_migrated_database(
    cluster: &ClusterHandle,
    runtime: &Runtime,
) -> Result<TemporaryDatabase, String> {
    let database = cluster
        .create_temporary_database()
        .map_err(|error| format!("create database: {error:?}"))?;
    runtime
        .block_on(run_migrations(database.url()))
        .map_err(|error| error.to_string())?;
    Ok(database)
}
