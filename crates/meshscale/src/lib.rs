//! meshscale library - wiring and operator cli for the access-control engine.
//!
//! - [`cli`]: command-line interface implementation
//! - [`Engine`]: the acl manager over the sea-orm store and the configured identities

#![warn(missing_docs)]

pub mod cli;

use meshscale_acl::{AclManager, MapIdentityResolver};
use meshscale_db::MeshscaleDb;
use meshscale_types::Config;

/// the acl engine as wired by the binary.
pub type Engine = AclManager<MeshscaleDb, MapIdentityResolver>;

/// build the engine over an already-connected database.
pub fn engine(db: MeshscaleDb, config: &Config) -> Engine {
    let resolver = MapIdentityResolver::from(&config.identity);
    AclManager::new(db, resolver, config.acl.clone())
}

/// connect to the configured database, run migrations and build the engine.
pub async fn connect(config: &Config) -> meshscale_db::Result<Engine> {
    let db = MeshscaleDb::new(&config.database).await?;
    Ok(engine(db, config))
}
