use athena_core::Credentials;
use athena_persistence::RedisConfig;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::types::{RedisPersistenceConfig, SessionConfig};
use crate::error::ConfigError;

type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Source of secrets read from the process environment.
///
/// Empty values count as unset.
#[derive(Clone)]
pub struct EnvVars {
    lookup: Arc<Lookup>,
}

impl EnvVars {
    /// Read from `std::env`
    pub fn process() -> Self {
        EnvVars {
            lookup: Arc::new(|key| std::env::var(key).ok()),
        }
    }

    /// Fixed set of variables, used by tests and embedded setups
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        EnvVars {
            lookup: Arc::new(move |key| vars.get(key).cloned()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.is_empty())
    }
}

impl Default for EnvVars {
    fn default() -> Self {
        Self::process()
    }
}

impl fmt::Debug for EnvVars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EnvVars")
    }
}

/// Credentials for a session: explicit key/secret first, then
/// `<PREFIX>_API_KEY` / `<PREFIX>_API_SECRET` / `<PREFIX>_SUB_ACCOUNT`.
///
/// Public-only sessions may end up without credentials.
pub fn resolve_credentials(
    session: &str,
    config: &SessionConfig,
    env: &EnvVars,
) -> Result<Option<Credentials>, ConfigError> {
    let explicit = (
        config.key.as_deref().filter(|k| !k.is_empty()),
        config.secret.as_deref().filter(|s| !s.is_empty()),
    );

    let (key, secret, sub_account) = match explicit {
        (Some(key), Some(secret)) => (
            Some(key.to_string()),
            Some(secret.to_string()),
            config.sub_account.clone(),
        ),
        (None, None) => {
            let prefix = config.env_prefix();
            (
                env.get(&format!("{}_API_KEY", prefix)),
                env.get(&format!("{}_API_SECRET", prefix)),
                config
                    .sub_account
                    .clone()
                    .or_else(|| env.get(&format!("{}_SUB_ACCOUNT", prefix))),
            )
        }
        _ => return Err(ConfigError::IncompleteCredentials(session.to_string())),
    };

    match (key, secret) {
        (Some(key), Some(secret)) => {
            let credentials = Credentials::new(key, secret);
            Ok(Some(match sub_account {
                Some(sub) => credentials.with_sub_account(sub),
                None => credentials,
            }))
        }
        (None, None) if config.public_only => Ok(None),
        (None, None) => Err(ConfigError::MissingCredentials {
            session: session.to_string(),
            prefix: config.env_prefix(),
        }),
        _ => Err(ConfigError::IncompleteCredentials(session.to_string())),
    }
}

/// Redis connection settings: `REDIS_*` variables, then the config file,
/// then `127.0.0.1:6379` db 0.
pub fn resolve_redis(config: &RedisPersistenceConfig, env: &EnvVars) -> Result<RedisConfig, ConfigError> {
    let defaults = RedisConfig::default();
    Ok(RedisConfig {
        host: env
            .get("REDIS_HOST")
            .or_else(|| config.host.clone())
            .unwrap_or(defaults.host),
        port: parse_env(env, "REDIS_PORT")?
            .or(config.port)
            .unwrap_or(defaults.port),
        db: parse_env(env, "REDIS_DB")?.or(config.db).unwrap_or(defaults.db),
        password: env.get("REDIS_PASSWORD").or_else(|| config.password.clone()),
    })
}

fn parse_env<T: std::str::FromStr>(env: &EnvVars, name: &str) -> Result<Option<T>, ConfigError> {
    env.get(name)
        .map(|value| {
            value.parse().map_err(|_| ConfigError::InvalidEnvVar {
                name: name.to_string(),
                value,
            })
        })
        .transpose()
}
