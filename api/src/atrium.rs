/// Atrium Sports embed API raw wire types — serde shapes for the fixtures feed.
/// Endpoint: https://eapi.web.prod.cloud.atriumsports.com/v1/embed/{embed}/fixtures?state={competition}
///
/// Every field is optional on the wire; the scoreboard module applies defaults.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FixturesResponse {
    pub data: Option<FixturesData>,
}

impl FixturesResponse {
    /// Fixtures in upstream order; empty when `data` or `fixtures` is missing.
    pub fn fixtures(&self) -> &[Fixture] {
        self.data
            .as_ref()
            .and_then(|d| d.fixtures.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FixturesData {
    pub fixtures: Option<Vec<Fixture>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Fixture {
    pub competitors: Option<Vec<Competitor>>,
}

impl Fixture {
    pub fn competitors(&self) -> &[Competitor] {
        self.competitors.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    #[serde(default, deserialize_with = "lenient")]
    pub entity_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_home: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Short display label ("SESI"); preferred over `name` when present.
    #[serde(default, deserialize_with = "lenient")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub logo: Option<String>,
    /// Atrium sends scores as strings on some feeds and numbers on others.
    pub score: Option<Value>,
}

impl Competitor {
    pub fn is_home(&self) -> bool {
        self.is_home.unwrap_or(false)
    }
}

/// A field of the wrong JSON type reads as absent instead of failing the
/// whole feed; other fixtures may still be usable.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
