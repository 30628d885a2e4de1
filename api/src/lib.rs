pub mod atrium;
pub mod client;
pub mod scoreboard;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of the Atrium wire format
// ---------------------------------------------------------------------------

/// Normalized home/away score line for one fixture, ready for the overlay.
///
/// Serialized with the overlay's field names (`logo_casa`, `nome_fora`, ...).
/// Built fresh for every request and never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardRecord {
    #[serde(rename = "logo_casa")]
    pub home_logo: String,
    #[serde(rename = "logo_fora")]
    pub away_logo: String,
    #[serde(rename = "nome_casa")]
    pub home_name: String,
    #[serde(rename = "nome_fora")]
    pub away_name: String,
    #[serde(rename = "placar_casa")]
    pub home_score: String,
    #[serde(rename = "placar_fora")]
    pub away_score: String,
}

impl ScoreboardRecord {
    /// "52 - 48", as shown in the centre box of the overlay.
    pub fn score_line(&self) -> String {
        format!("{} - {}", self.home_score, self.away_score)
    }
}
