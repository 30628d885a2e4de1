use crate::render;
use atrium_api::ScoreboardRecord;
use atrium_api::client::AtriumApi;
use atrium_api::scoreboard::ScoreboardExtractor;
use log::{debug, error, info};
use serde::Deserialize;
use serde_json::{Value, json};
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;
use warp::http::header::{self, HeaderValue};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::{Reply, Response};

pub const NOT_FOUND_MESSAGE: &str = "Jogo do SESI?";
pub const MISSING_COMPETITION_MESSAGE: &str = "Pass a competition in the query string or in the request body for a scoreboard response.";

/// Shared, read-only request context: the upstream client and the team filter.
#[derive(Debug, Clone)]
pub struct Relay {
    api: AtriumApi,
    extractor: ScoreboardExtractor,
}

impl Relay {
    pub fn new(api: AtriumApi, extractor: ScoreboardExtractor) -> Self {
        Self { api, extractor }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PlacarQuery {
    competition: Option<String>,
    json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlacarBody {
    competition: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseFormat {
    Json,
    Html,
}

impl ResponseFormat {
    /// `json=1` wins; otherwise an `Accept` header naming JSON (the overlay
    /// page sends one) selects JSON, and everything else gets the HTML snippet.
    fn negotiate(query: &PlacarQuery, accept: Option<&str>) -> Self {
        let json_flag = query
            .json
            .as_deref()
            .is_some_and(|v| matches!(v.trim(), "1" | "true"));
        let accepts_json = accept.is_some_and(|a| a.contains("application/json"));
        if json_flag || accepts_json { Self::Json } else { Self::Html }
    }
}

/// `/api/placar` (GET or POST) and `/api/index`.
pub fn routes(relay: Arc<Relay>) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    let relay_filter = warp::any().map(move || relay.clone());

    // Either method may carry `{"competition": ...}`; an empty body is no body.
    let request_body = warp::get()
        .or(warp::post())
        .unify()
        .and(warp::body::bytes())
        .map(|body: Bytes| (!body.is_empty()).then_some(body));

    let placar = warp::path!("api" / "placar")
        .and(request_body)
        .and(warp::query::<PlacarQuery>())
        .and(warp::header::optional::<String>("accept"))
        .and(relay_filter)
        .and_then(handle_placar);

    let index = warp::path!("api" / "index")
        .and(warp::get())
        .map(|| no_store(warp::reply::html(render::index_page()).into_response()));

    placar.or(index).unify().with(warp::log("placar::http"))
}

async fn handle_placar(
    body: Option<Bytes>,
    query: PlacarQuery,
    accept: Option<String>,
    relay: Arc<Relay>,
) -> Result<Response, Infallible> {
    let format = ResponseFormat::negotiate(&query, accept.as_deref());

    let Some(competition) = competition_from(&query, body.as_deref()) else {
        return Ok(no_store(text_reply(StatusCode::UNAUTHORIZED, MISSING_COMPETITION_MESSAGE)));
    };
    debug!("scoreboard requested for competition {competition} ({format:?})");

    let response = match relay.api.fetch_scoreboard(&competition, &relay.extractor).await {
        Ok(Some(record)) => scoreboard_reply(&record, format),
        Ok(None) => {
            info!(
                "competition {competition}: no fixture for entity {}",
                relay.extractor.target_entity_id()
            );
            not_found_reply(format)
        }
        Err(e) => {
            error!("competition {competition}: {e}");
            text_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Erro: {}", e.public_message()),
            )
        }
    };
    Ok(no_store(response))
}

/// Query parameter first, then a JSON body; blank ids count as missing.
fn competition_from(query: &PlacarQuery, body: Option<&[u8]>) -> Option<String> {
    let from_query = query
        .competition
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned);

    from_query.or_else(|| {
        let body: PlacarBody = serde_json::from_slice(body?).ok()?;
        let competition = match body.competition? {
            Value::String(s) => s.trim().to_owned(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!competition.is_empty()).then_some(competition)
    })
}

fn scoreboard_reply(record: &ScoreboardRecord, format: ResponseFormat) -> Response {
    match format {
        ResponseFormat::Json => warp::reply::json(record).into_response(),
        ResponseFormat::Html => warp::reply::html(render::render_scoreboard(record)).into_response(),
    }
}

fn not_found_reply(format: ResponseFormat) -> Response {
    match format {
        ResponseFormat::Json => warp::reply::with_status(
            warp::reply::json(&json!({ "error": NOT_FOUND_MESSAGE })),
            StatusCode::NOT_FOUND,
        )
        .into_response(),
        ResponseFormat::Html => text_reply(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
    }
}

fn text_reply(status: StatusCode, message: impl Into<String>) -> Response {
    warp::reply::with_status(message.into(), status).into_response()
}

fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use std::time::Duration;

    const SESI_FIXTURE: &str = r#"{"data":{"fixtures":[{"competitors":[
        {"entityId":"dd09acde-4392-11ee-895e-0bacda3bcd2b","isHome":true,"name":"SESI","logo":"a.png","score":"52"},
        {"entityId":"other","isHome":false,"name":"Rival","logo":"b.png","score":"48"}]}]}}"#;

    async fn upstream(status: usize, body: &str) -> ServerGuard {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/fixtures")
            .match_query(Matcher::UrlEncoded("state".into(), "xyz".into()))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        server
    }

    fn relay_for(server: &ServerGuard) -> Arc<Relay> {
        let api = AtriumApi::new(format!("{}/fixtures", server.url()), Duration::from_secs(2));
        Arc::new(Relay::new(api, ScoreboardExtractor::default()))
    }

    fn body_text(response: &warp::http::Response<Bytes>) -> String {
        String::from_utf8_lossy(response.body()).into_owned()
    }

    #[tokio::test]
    async fn json_scoreboard_end_to_end() {
        let server = upstream(200, SESI_FIXTURE).await;
        let response = warp::test::request()
            .method("GET")
            .path("/api/placar?competition=xyz&json=1")
            .reply(&routes(relay_for(&server)))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        let record: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(
            record,
            json!({
                "nome_casa": "SESI",
                "nome_fora": "Rival",
                "placar_casa": "52",
                "placar_fora": "48",
                "logo_casa": "a.png",
                "logo_fora": "b.png",
            })
        );
    }

    #[tokio::test]
    async fn accept_header_selects_json() {
        let server = upstream(200, SESI_FIXTURE).await;
        let response = warp::test::request()
            .path("/api/placar?competition=xyz&_ts=1718000000000")
            .header("accept", "application/json")
            .reply(&routes(relay_for(&server)))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let record: ScoreboardRecord = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(record.score_line(), "52 - 48");
    }

    #[tokio::test]
    async fn html_snippet_by_default() {
        let server = upstream(200, SESI_FIXTURE).await;
        let response = warp::test::request()
            .path("/api/placar?competition=xyz")
            .reply(&routes(relay_for(&server)))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        let html = body_text(&response);
        assert!(html.contains(">SESI</div>"));
        assert!(html.contains("52 - 48"));
    }

    #[tokio::test]
    async fn competition_from_post_body() {
        let server = upstream(200, SESI_FIXTURE).await;
        let response = warp::test::request()
            .method("POST")
            .path("/api/placar?json=1")
            .body(r#"{"competition": "xyz"}"#)
            .reply(&routes(relay_for(&server)))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(&response).contains(r#""nome_casa":"SESI""#));
    }

    #[tokio::test]
    async fn competition_from_get_body() {
        let server = upstream(200, SESI_FIXTURE).await;
        let response = warp::test::request()
            .method("GET")
            .path("/api/placar?json=1")
            .body(r#"{"competition":"xyz"}"#)
            .reply(&routes(relay_for(&server)))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let record: ScoreboardRecord = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(record.home_name, "SESI");
    }

    #[tokio::test]
    async fn malformed_neighbour_fixture_does_not_fail_the_feed() {
        let feed = r#"{"data":{"fixtures":[
            {"competitors":[{"entityId":12345,"isHome":"yes"},{"entityId":"x"}]},
            {"competitors":[
                {"entityId":"dd09acde-4392-11ee-895e-0bacda3bcd2b","isHome":true,"name":"SESI","score":"30"},
                {"entityId":"other","name":"Rival","score":"28"}]}]}}"#;
        let server = upstream(200, feed).await;
        let response = warp::test::request()
            .path("/api/placar?competition=xyz&json=1")
            .reply(&routes(relay_for(&server)))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let record: ScoreboardRecord = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(record.score_line(), "30 - 28");
    }

    #[tokio::test]
    async fn query_parameter_wins_over_body() {
        let server = upstream(200, SESI_FIXTURE).await;
        let response = warp::test::request()
            .method("POST")
            .path("/api/placar?competition=xyz&json=1")
            .body(r#"{"competition": "other"}"#)
            .reply(&routes(relay_for(&server)))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_competition_is_401() {
        let server = Server::new_async().await;
        let filter = routes(relay_for(&server));

        for (method, path, body) in [
            ("GET", "/api/placar", ""),
            ("GET", "/api/placar?competition=", ""),
            ("POST", "/api/placar", "not json"),
            ("POST", "/api/placar", r#"{"competition": ""}"#),
        ] {
            let response = warp::test::request()
                .method(method)
                .path(path)
                .body(body)
                .reply(&filter)
                .await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {path} {body}");
            assert_eq!(body_text(&response), MISSING_COMPETITION_MESSAGE);
        }
    }

    #[tokio::test]
    async fn no_matching_fixture_is_404() {
        let server = upstream(200, r#"{"data":{"fixtures":[]}}"#).await;
        let filter = routes(relay_for(&server));

        let json = warp::test::request()
            .path("/api/placar?competition=xyz&json=1")
            .reply(&filter)
            .await;
        assert_eq!(json.status(), StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(json.body()).unwrap();
        assert_eq!(body, json!({ "error": NOT_FOUND_MESSAGE }));

        let html = warp::test::request()
            .path("/api/placar?competition=xyz")
            .reply(&filter)
            .await;
        assert_eq!(html.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(&html), NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn upstream_failure_is_500_without_internals() {
        let server = upstream(502, "bad gateway").await;
        let response = warp::test::request()
            .path("/api/placar?competition=xyz&json=1")
            .reply(&routes(relay_for(&server)))
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(&response);
        assert_eq!(body, "Erro: upstream returned status 502");
        assert!(!body.contains(&server.url()));
    }

    #[tokio::test]
    async fn malformed_upstream_json_is_500() {
        let server = upstream(200, "{\"data\":").await;
        let response = warp::test::request()
            .path("/api/placar?competition=xyz")
            .reply(&routes(relay_for(&server)))
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(&response).starts_with("Erro: "));
    }

    #[tokio::test]
    async fn index_serves_overlay_page() {
        let server = Server::new_async().await;
        let response = warp::test::request()
            .path("/api/index")
            .reply(&routes(relay_for(&server)))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(&response).contains("/api/placar"));
    }

    #[test]
    fn format_negotiation() {
        let flagged = PlacarQuery { json: Some("1".into()), ..Default::default() };
        assert_eq!(ResponseFormat::negotiate(&flagged, None), ResponseFormat::Json);
        let plain = PlacarQuery::default();
        assert_eq!(ResponseFormat::negotiate(&plain, Some("text/html,*/*")), ResponseFormat::Html);
        assert_eq!(
            ResponseFormat::negotiate(&plain, Some("application/json")),
            ResponseFormat::Json
        );
        let off = PlacarQuery { json: Some("0".into()), ..Default::default() };
        assert_eq!(ResponseFormat::negotiate(&off, None), ResponseFormat::Html);
    }

    #[test]
    fn numeric_body_competition_is_accepted() {
        let query = PlacarQuery::default();
        assert_eq!(
            competition_from(&query, Some(br#"{"competition": 2024}"#.as_slice())),
            Some("2024".into())
        );
        assert_eq!(competition_from(&query, Some(br#"{"competition": null}"#.as_slice())), None);
        assert_eq!(competition_from(&query, None), None);
    }
}
