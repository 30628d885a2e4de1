use crate::ScoreboardRecord;
use crate::atrium::{Competitor, Fixture, FixturesResponse};
use log::debug;
use serde_json::Value;

/// Atrium entity id of SESI Araraquara, the team the overlay follows.
pub const DEFAULT_ENTITY_ID: &str = "dd09acde-4392-11ee-895e-0bacda3bcd2b";

const DEFAULT_SCORE: &str = "0";

/// Finds the fixture featuring one team and flattens it into a [`ScoreboardRecord`].
///
/// The extractor is a pure function of the decoded feed; the same input always
/// yields the same record.
#[derive(Debug, Clone)]
pub struct ScoreboardExtractor {
    target_entity_id: String,
}

impl Default for ScoreboardExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_ENTITY_ID)
    }
}

impl ScoreboardExtractor {
    pub fn new(target_entity_id: impl Into<String>) -> Self {
        Self { target_entity_id: target_entity_id.into() }
    }

    pub fn target_entity_id(&self) -> &str {
        &self.target_entity_id
    }

    /// Scan fixtures in upstream order and map the first usable match.
    ///
    /// A fixture matches when one of its competitors carries the target entity
    /// id. Matches without exactly two competitors are skipped. If upstream
    /// lists the team in more than one fixture, only the first is used.
    /// Returns `None` when nothing matches.
    pub fn extract(&self, response: &FixturesResponse) -> Option<ScoreboardRecord> {
        response
            .fixtures()
            .iter()
            .filter(|f| self.features_target(f))
            .find_map(|f| {
                let record = map_fixture(f);
                if record.is_none() {
                    debug!(
                        "skipping fixture with {} competitors for entity {}",
                        f.competitors().len(),
                        self.target_entity_id
                    );
                }
                record
            })
    }

    fn features_target(&self, fixture: &Fixture) -> bool {
        fixture
            .competitors()
            .iter()
            .any(|c| c.entity_id.as_deref() == Some(self.target_entity_id.as_str()))
    }
}

fn map_fixture(fixture: &Fixture) -> Option<ScoreboardRecord> {
    let (home, away) = split_competitors(fixture.competitors())?;
    Some(ScoreboardRecord {
        home_logo: home.logo.clone().unwrap_or_default(),
        away_logo: away.logo.clone().unwrap_or_default(),
        home_name: team_label(home),
        away_name: team_label(away),
        home_score: score_text(home.score.as_ref()),
        away_score: score_text(away.score.as_ref()),
    })
}

/// Home is the single competitor flagged `isHome`; when neither or both are
/// flagged, fall back to list order (first = home, second = away).
fn split_competitors(competitors: &[Competitor]) -> Option<(&Competitor, &Competitor)> {
    let [first, second] = competitors else {
        return None;
    };
    match (first.is_home(), second.is_home()) {
        (false, true) => Some((second, first)),
        _ => Some((first, second)),
    }
}

fn team_label(c: &Competitor) -> String {
    c.code
        .as_deref()
        .filter(|code| !code.is_empty())
        .or(c.name.as_deref())
        .unwrap_or_default()
        .to_owned()
}

fn score_text(score: Option<&Value>) -> String {
    match score {
        None | Some(Value::Null) => DEFAULT_SCORE.to_owned(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
