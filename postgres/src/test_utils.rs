use config::shared::{IntoConnectOptions, PgConnectionConfig, TlsConfig};
use secrecy::SecretString;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

/// Connection settings for a uniquely named database on the local test server.
///
/// Reads `TESTS_DATABASE_HOST`, `TESTS_DATABASE_PORT`, `TESTS_DATABASE_USERNAME`
/// and optionally `TESTS_DATABASE_PASSWORD`.
///
/// # Panics
/// Panics if a required variable is missing or malformed.
pub fn local_pg_connection_config() -> PgConnectionConfig {
    PgConnectionConfig {
        host: std::env::var("TESTS_DATABASE_HOST").expect("TESTS_DATABASE_HOST must be set"),
        port: std::env::var("TESTS_DATABASE_PORT")
            .expect("TESTS_DATABASE_PORT must be set")
            .parse()
            .expect("TESTS_DATABASE_PORT must be a valid port number"),
        name: Uuid::new_v4().to_string(),
        username: std::env::var("TESTS_DATABASE_USERNAME")
            .expect("TESTS_DATABASE_USERNAME must be set"),
        password: std::env::var("TESTS_DATABASE_PASSWORD")
            .ok()
            .map(SecretString::new),
        tls: TlsConfig::default(),
    }
}

/// Creates the database named in `config` with an empty catalog schema.
///
/// # Panics
/// Panics if the server is unreachable or the database cannot be created.
pub async fn create_catalog_database(config: &PgConnectionConfig) -> PgPool {
    let mut connection = PgConnection::connect_with(&config.without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"create database "{}";"#, config.name))
        .await
        .expect("Failed to create database");

    let pool = PgPool::connect_with(config.with_db())
        .await
        .expect("Failed to connect to Postgres");

    pool.execute(
        r#"
        create table products (
            id bigserial primary key,
            sku text,
            name text not null,
            description text,
            is_new boolean,
            active boolean not null default true
        );
        create table product_variants (
            id bigserial primary key,
            product_id bigint not null references products (id),
            price numeric(12, 2),
            color text,
            size text,
            age text
        );
        create table product_images (
            id bigserial primary key,
            product_id bigint not null references products (id),
            image text,
            "order" integer not null default 0
        );
        "#,
    )
    .await
    .expect("Failed to create catalog schema");

    pool
}

/// Drops the database named in `config`, terminating open connections first.
///
/// Cleanup failures are printed and otherwise ignored.
pub async fn drop_catalog_database(config: &PgConnectionConfig) {
    let mut connection = match PgConnection::connect_with(&config.without_db()).await {
        Ok(connection) => connection,
        Err(err) => {
            eprintln!("warning: failed to connect to Postgres for cleanup: {err}");
            return;
        }
    };

    let terminate = format!(
        r#"
        select pg_terminate_backend(pid)
        from pg_stat_activity
        where datname = '{}' and pid <> pg_backend_pid();
        "#,
        config.name
    );
    if let Err(err) = connection.execute(&*terminate).await {
        eprintln!(
            "warning: failed to terminate connections to {}: {err}",
            config.name
        );
    }

    if let Err(err) = connection
        .execute(&*format!(r#"drop database if exists "{}";"#, config.name))
        .await
    {
        eprintln!("warning: failed to drop database {}: {err}", config.name);
    }
}

/// Inserts a product and returns its id.
pub async fn insert_product(
    pool: &PgPool,
    sku: Option<&str>,
    name: &str,
    is_new: bool,
    active: bool,
) -> i64 {
    sqlx::query_scalar(
        "insert into products (sku, name, is_new, active) values ($1, $2, $3, $4) returning id",
    )
    .bind(sku)
    .bind(name)
    .bind(is_new)
    .bind(active)
    .fetch_one(pool)
    .await
    .expect("Failed to insert product")
}

/// Inserts a variant priced at `price` for `product_id`.
pub async fn insert_variant(pool: &PgPool, product_id: i64, price: &str, color: &str, size: &str) {
    sqlx::query(
        "insert into product_variants (product_id, price, color, size) values ($1, $2::numeric, $3, $4)",
    )
    .bind(product_id)
    .bind(price)
    .bind(color)
    .bind(size)
    .execute(pool)
    .await
    .expect("Failed to insert variant");
}

/// Inserts an image for `product_id` at display position `order`.
pub async fn insert_image(pool: &PgPool, product_id: i64, image: &str, order: i32) {
    sqlx::query(r#"insert into product_images (product_id, image, "order") values ($1, $2, $3)"#)
        .bind(product_id)
        .bind(image)
        .bind(order)
        .execute(pool)
        .await
        .expect("Failed to insert image");
}
