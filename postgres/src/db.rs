use config::shared::{IntoConnectOptions, PgConnectionConfig};
use sqlx::{PgPool, postgres::PgPoolOptions};

/// Maximum number of pooled catalog connections. A sync reads the catalog with a single query.
const MAX_CATALOG_CONNECTIONS: u32 = 4;

/// Builds a catalog pool that opens connections on first use.
pub fn lazy_catalog_pool(config: &PgConnectionConfig) -> PgPool {
    PgPoolOptions::new()
        .max_connections(MAX_CATALOG_CONNECTIONS)
        .connect_lazy_with(config.with_db())
}
