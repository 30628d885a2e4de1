use anyhow::{Context, bail};
use atrium_api::client::{ATRIUM_FIXTURES, DEFAULT_TIMEOUT};
use atrium_api::scoreboard::DEFAULT_ENTITY_ID;
use std::net::SocketAddr;
use std::time::Duration;

pub const BIND_VAR: &str = "PLACAR_BIND";
pub const FIXTURES_URL_VAR: &str = "PLACAR_FIXTURES_URL";
pub const ENTITY_ID_VAR: &str = "PLACAR_ENTITY_ID";
pub const TIMEOUT_VAR: &str = "PLACAR_TIMEOUT_SECS";

const DEFAULT_BIND: &str = "0.0.0.0:7071";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind: SocketAddr,
    pub fixtures_url: String,
    pub entity_id: String,
    pub timeout: Duration,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from a variable lookup. Blank values count as unset,
    /// except the entity id: a blank one would follow no team at all.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind = get(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind
            .trim()
            .parse::<SocketAddr>()
            .with_context(|| format!("{BIND_VAR}={bind} is not a socket address"))?;

        let timeout = match get(TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("{TIMEOUT_VAR}={raw} is not a number of seconds"))?;
                if secs == 0 {
                    bail!("{TIMEOUT_VAR} must be greater than zero");
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        let entity_id = match lookup(ENTITY_ID_VAR) {
            Some(id) if id.trim().is_empty() => bail!("{ENTITY_ID_VAR} is set but empty"),
            Some(id) => id.trim().to_string(),
            None => DEFAULT_ENTITY_ID.to_string(),
        };

        Ok(Self {
            bind,
            fixtures_url: get(FIXTURES_URL_VAR).unwrap_or_else(|| ATRIUM_FIXTURES.to_string()),
            entity_id,
            timeout,
        })
    }
}
