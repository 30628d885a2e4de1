use atrium_api::ScoreboardRecord;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const SCOREBOARD_TEMPLATE: &str = include_str!("../assets/placar.html");

/// Static overlay page; it polls `/api/placar` on its own.
pub fn index_page() -> &'static str {
    INDEX_HTML
}

/// Fill the scoreboard snippet template with the record's fields.
pub fn render_scoreboard(record: &ScoreboardRecord) -> String {
    let score_line = record.score_line();
    fill_template(SCOREBOARD_TEMPLATE, |field| match field {
        "placar" => Some(score_line.as_str()),
        "logo_casa" => Some(record.home_logo.as_str()),
        "logo_fora" => Some(record.away_logo.as_str()),
        "nome_casa" => Some(record.home_name.as_str()),
        "nome_fora" => Some(record.away_name.as_str()),
        "placar_casa" => Some(record.home_score.as_str()),
        "placar_fora" => Some(record.away_score.as_str()),
        _ => None,
    })
}

/// Single pass over `{{field}}` placeholders. Substituted values are escaped and
/// never rescanned; unknown placeholders are left as they are.
fn fill_template<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len() + 128);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match lookup(key) {
                    Some(value) => out.push_str(&escape_html(value)),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
