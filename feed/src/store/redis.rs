use std::collections::HashMap;
use std::time::Duration;

use config::shared::RedisConfig;
use fred::prelude::{
    ClientLike, EventInterface, HashesInterface, KeysInterface, LuaInterface, Pool,
    ReconnectPolicy, Server, ServerConfig, TcpConfig,
};
use fred::types::config::UnresponsiveConfig;
use fred::types::{Builder, Expiration, SetOptions};
use futures::future::join_all;
use secrecy::ExposeSecret;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info};

use crate::error::FeedResult;
use crate::store::KeyValueStore;

const POOL_SIZE: usize = 4;

/// Deletes `KEYS[1]` if it holds `ARGV[1]`.
const DELETE_IF_EQUALS_SCRIPT: &str = r#"
if redis.call("get", KEYS[1]) == ARGV[1] then
    return redis.call("del", KEYS[1])
else
    return 0
end
"#;

/// Merges the `ARGV` field/value pairs into the hash at `KEYS[1]` if it exists.
const HASH_UPDATE_SCRIPT: &str = r#"
if redis.call("exists", KEYS[1]) == 1 then
    redis.call("hset", KEYS[1], unpack(ARGV))
    return 1
else
    return 0
end
"#;

/// [`KeyValueStore`] backed by a pooled Redis connection.
#[derive(Clone)]
pub struct RedisStore {
    client: Pool,
}

impl RedisStore {
    /// Connects to Redis and waits until the pool is ready.
    pub async fn connect(config: &RedisConfig) -> FeedResult<Self> {
        let pool = Builder::default_centralized()
            .with_config(|redis_config| {
                redis_config.username = config.username.clone();
                redis_config.password = config
                    .password
                    .as_ref()
                    .map(|password| password.expose_secret().to_string());
                redis_config.server = ServerConfig::Centralized {
                    server: Server::new(config.host.clone(), config.port),
                };
            })
            .with_connection_config(|config| {
                config.internal_command_timeout = Duration::from_secs(5);
                config.reconnect_on_auth_error = true;
                config.tcp = TcpConfig {
                    #[cfg(target_os = "linux")]
                    user_timeout: Some(Duration::from_secs(5)),
                    ..Default::default()
                };
                config.unresponsive = UnresponsiveConfig {
                    max_timeout: Some(Duration::from_secs(10)),
                    interval: Duration::from_secs(3),
                };
            })
            .with_performance_config(|config| {
                config.default_command_timeout = Duration::from_secs(5);
            })
            .set_policy(ReconnectPolicy::new_exponential(0, 1, 2000, 5))
            .build_pool(POOL_SIZE)?;

        for client in pool.clients() {
            let mut error_rx = client.error_rx();
            let mut reconnect_rx = client.reconnect_rx();

            tokio::spawn(async move {
                loop {
                    match error_rx.recv().await {
                        Ok((error, server)) => {
                            error!(?server, %error, "redis client error");
                        }
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    }
                }
            });

            tokio::spawn(async move {
                loop {
                    match reconnect_rx.recv().await {
                        Ok(server) => debug!(?server, "redis client connected"),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    }
                }
            });
        }

        let connection_handles = pool.connect_pool();
        pool.wait_for_connect().await?;
        info!(host = %config.host, port = config.port, "connected to redis");

        tokio::spawn(async move {
            let _results = join_all(connection_handles).await;
        });

        Ok(Self { client: pool })
    }
}

impl KeyValueStore for RedisStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> FeedResult<bool> {
        let reply: Option<String> = self
            .client
            .set(
                key,
                value,
                Some(Expiration::EX(ttl.as_secs().max(1) as i64)),
                Some(SetOptions::NX),
                false,
            )
            .await?;

        Ok(reply.is_some())
    }

    async fn delete_if_equals(&self, key: &str, value: &str) -> FeedResult<bool> {
        let deleted: i64 = self
            .client
            .eval(DELETE_IF_EQUALS_SCRIPT, vec![key], vec![value])
            .await?;

        Ok(deleted > 0)
    }

    async fn hash_set(
        &self,
        key: &str,
        fields: Vec<(String, String)>,
        ttl: Duration,
    ) -> FeedResult<()> {
        let fields: HashMap<String, String> = fields.into_iter().collect();
        if fields.is_empty() {
            return Ok(());
        }

        let pipeline = self.client.next_connected().pipeline();
        pipeline.hset::<(), _, _>(key, fields).await?;
        pipeline
            .expire::<(), _>(key, ttl.as_secs().max(1) as i64, None)
            .await?;
        pipeline.all::<()>().await?;

        Ok(())
    }

    async fn hash_update(&self, key: &str, fields: Vec<(String, String)>) -> FeedResult<bool> {
        if fields.is_empty() {
            let existing: i64 = self.client.exists(key).await?;
            return Ok(existing > 0);
        }

        let args: Vec<String> = fields
            .into_iter()
            .flat_map(|(name, value)| [name, value])
            .collect();
        let updated: i64 = self
            .client
            .eval(HASH_UPDATE_SCRIPT, vec![key], args)
            .await?;

        Ok(updated > 0)
    }

    async fn hash_get_all(&self, key: &str) -> FeedResult<HashMap<String, String>> {
        Ok(self.client.hgetall(key).await?)
    }
}
