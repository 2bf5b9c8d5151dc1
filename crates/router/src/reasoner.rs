//! `Reasoner` backed by a chat-completions provider.
//!
//! Model output is untrusted. Every reply is parsed field by field:
//! unusable fields are dropped, an unusable classification falls back to a
//! keyword guess, and unusable filter output becomes `FilterSpec::broad`.

use async_trait::async_trait;
use luxroute_config::ReasonerConfig;
use luxroute_core::catalog::CatalogItem;
use luxroute_core::criteria::{Cct, Criteria, LuminaireType, SdcmBound, SdcmCategory};
use luxroute_core::error::ReasonerError;
use luxroute_core::message::Message;
use luxroute_core::provider::{Provider, ProviderRequest};
use luxroute_core::reasoner::{Classification, ComposedAnswer, FilterSpec, Intent, Reasoner};
use luxroute_extract::{ip, normalize, preferences};
use serde_json::Value as Json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Items described to the model when composing an answer.
const MAX_COMPOSE_ITEMS: usize = 8;

const CLASSIFY_PROMPT: &str = "Du ordnest Kundenanfragen an einen Leuchten-Shop ein. \
Antworte nur mit JSON: {\"intent\": \"produktempfehlung\" | \"produktfrage\" | \
\"produktvergleich\" | \"aehnliche_produktsuche\", \"confidence\": 0.0-1.0, \
\"rationale\": \"kurze Begründung\"}";

const FILTER_PROMPT: &str = "Du übersetzt Kundenanfragen an einen Leuchten-Shop in \
Suchfilter. Antworte nur mit JSON. Erlaubte Felder (alle optional): \
\"luminaire_type\" (ceiling, wall, floor, pendant, table, track, outdoor, inground), \
\"cct\" (2700, 3000 oder 4000), \"cct_switch\" (bool), \"min_protection\" (z.B. \"IP44\"), \
\"sdcm_max\" (Zahl), \"sdcm_min\" (Zahl), \"housing_color\" (z.B. \"weiß\"), \
\"dimmable\" (bool), \"dim_to_warm\" (bool), \"led_strip\" (bool), \"cheaper\" (bool), \
\"search_term\" (Suchbegriff), \"rationale\" (kurze Begründung). \
Lass Felder weg, die die Anfrage nicht festlegt.";

const COMPOSE_PROMPT: &str = "Du bist Lichtberater eines Leuchten-Shops. Beantworte die \
Kundenanfrage freundlich und knapp auf Deutsch und beziehe dich nur auf die gelisteten \
Produkte. Antworte nur mit JSON: {\"answer\": \"...\", \"follow_ups\": [\"...\", \"...\"]} \
mit zwei bis drei kurzen Anschlussfragen.";

const SEARCH_TERM_PROMPT: &str = "Extrahiere aus der Kundenanfrage den einen Suchbegriff, \
der im Produktkatalog eines Leuchten-Shops am ehesten passende Produkte findet \
(Produktname, Produktart oder Material). Antworte nur mit dem Suchbegriff.";

/// A reasoner that prompts an LLM through a [`Provider`].
pub struct LlmReasoner {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    timeout: Duration,
    limits: ReasonerConfig,
}

impl LlmReasoner {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        let limits = ReasonerConfig::default();
        Self {
            provider,
            model: model.into(),
            temperature: 0.3,
            timeout: Duration::from_secs(limits.timeout_secs),
            limits,
        }
    }

    /// Token limits and timeout from configuration.
    pub fn with_config(mut self, config: &ReasonerConfig) -> Self {
        self.timeout = Duration::from_secs(config.timeout_secs);
        self.limits = config.clone();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn call(
        &self,
        system: &str,
        user: String,
        max_tokens: u32,
        json: bool,
    ) -> Result<String, ReasonerError> {
        let mut request = ProviderRequest::new(
            &self.model,
            vec![Message::system(system), Message::user(user)],
        )
        .with_temperature(self.temperature)
        .with_max_tokens(max_tokens);
        if json {
            request = request.json();
        }

        match tokio::time::timeout(self.timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => Ok(response.message.content),
            Ok(Err(e)) => Err(ReasonerError::Provider(e)),
            Err(_) => Err(ReasonerError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }
}

fn with_context(text: &str, context: &[String]) -> String {
    if context.is_empty() {
        format!("Anfrage: {text}")
    } else {
        format!("Bisheriger Verlauf:\n- {}\n\nAnfrage: {text}", context.join("\n- "))
    }
}

/// The first JSON object in `reply`, tolerating code fences and chatter.
fn json_object(reply: &str) -> Option<serde_json::Map<String, Json>> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str::<Json>(&reply[start..=end]) {
        Ok(Json::Object(map)) => Some(map),
        _ => None,
    }
}

fn text_field<'a>(map: &'a serde_json::Map<String, Json>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Json::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn bool_field(map: &serde_json::Map<String, Json>, key: &str) -> bool {
    match map.get(key) {
        Some(Json::Bool(b)) => *b,
        Some(Json::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "ja" | "yes"),
        _ => false,
    }
}

/// A number, or the leading digits of a string such as "3000K".
fn number_field(map: &serde_json::Map<String, Json>, key: &str) -> Option<f64> {
    match map.get(key)? {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

fn sdcm_step(value: Option<f64>) -> Option<u8> {
    value
        .filter(|v| (1.0..=10.0).contains(v))
        .map(|v| v.round() as u8)
}

/// Guess an intent from wording alone.
fn keyword_intent(text: &str) -> Option<Intent> {
    let text = normalize(text);
    if ["vergleich", " vs ", " vs. ", "unterschied zwischen", "compare"]
        .iter()
        .any(|k| text.contains(k))
    {
        return Some(Intent::Comparison);
    }
    if ["ähnlich", "aehnlich", "alternative", "similar"]
        .iter()
        .any(|k| text.contains(k))
    {
        return Some(Intent::SimilarProducts);
    }
    None
}

fn parse_classification(reply: &str, text: &str) -> Classification {
    let parsed = json_object(reply).and_then(|map| {
        let intent = text_field(&map, "intent").and_then(Intent::from_tag)?;
        let confidence = number_field(&map, "confidence").unwrap_or(0.5).clamp(0.0, 1.0) as f32;
        let rationale = text_field(&map, "rationale").unwrap_or_default().to_string();
        Some(Classification {
            intent,
            confidence,
            rationale,
        })
    });
    if let Some(classification) = parsed {
        return classification;
    }

    warn!("Unusable classification output, guessing from keywords");
    match keyword_intent(text) {
        Some(intent) => Classification {
            intent,
            confidence: 0.6,
            rationale: "keyword guess".into(),
        },
        None => Classification {
            intent: Intent::Recommendation,
            confidence: 0.5,
            rationale: "default".into(),
        },
    }
}

/// Validate filter output field by field.
pub fn parse_filter_spec(reply: &str) -> FilterSpec {
    let Some(map) = json_object(reply) else {
        warn!("Unusable filter output, using broad query");
        return FilterSpec::broad("filter output could not be parsed");
    };

    let luminaire = text_field(&map, "luminaire_type").and_then(|t| t.parse::<LuminaireType>().ok());
    let cct = number_field(&map, "cct")
        .filter(|k| k.fract() == 0.0 && *k > 0.0)
        .and_then(|k| Cct::from_kelvin(k as u32));
    let min_protection = text_field(&map, "min_protection")
        .and_then(|code| ip::extract_codes(code).into_iter().next())
        .filter(|code| ip::rank(code).is_some());
    let sdcm_max = sdcm_step(number_field(&map, "sdcm_max"));
    let sdcm_min = sdcm_step(number_field(&map, "sdcm_min"));
    let sdcm = (sdcm_max.is_some() || sdcm_min.is_some()).then(|| SdcmBound {
        min: sdcm_min,
        max: sdcm_max,
        category: sdcm_max.and_then(SdcmCategory::for_max),
    });
    let housing_color = text_field(&map, "housing_color")
        .and_then(preferences::housing_color)
        .map(str::to_string);
    let dim_to_warm = bool_field(&map, "dim_to_warm");

    let criteria = Criteria {
        luminaire,
        cct,
        cct_switch: bool_field(&map, "cct_switch"),
        min_protection,
        sdcm,
        led_strip: bool_field(&map, "led_strip"),
        dim_to_warm,
        dimmable: dim_to_warm || bool_field(&map, "dimmable"),
        housing_color,
        cheaper: bool_field(&map, "cheaper"),
        residual: None,
    };
    FilterSpec {
        criteria,
        search_term: text_field(&map, "search_term").map(str::to_string),
        rationale: text_field(&map, "rationale").unwrap_or_default().to_string(),
        broad: false,
    }
}

fn parse_composed(reply: &str) -> Result<ComposedAnswer, ReasonerError> {
    if let Some(map) = json_object(reply) {
        let text = text_field(&map, "answer")
            .ok_or_else(|| ReasonerError::Malformed("answer field missing or empty".into()))?;
        let follow_ups = map
            .get("follow_ups")
            .and_then(Json::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Json::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .take(3)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        return Ok(ComposedAnswer {
            text: text.to_string(),
            follow_ups,
        });
    }

    let text = reply.trim();
    if text.is_empty() {
        return Err(ReasonerError::Malformed("empty answer".into()));
    }
    Ok(ComposedAnswer {
        text: text.to_string(),
        follow_ups: Vec::new(),
    })
}

/// One line per item with the attributes worth mentioning.
fn describe_item(item: &CatalogItem) -> String {
    let mut parts = vec![item.name.clone()];
    if let Some(category) = &item.category_2 {
        parts.push(category.clone());
    }
    if let Some(cct) = item.cct_summary() {
        parts.push(cct);
    }
    if let Some(ip) = &item.ingress_protection {
        parts.push(ip.clone());
    }
    if let Some(color) = &item.housing_color {
        parts.push(format!("Gehäuse {color}"));
    }
    if let Some(lumen) = item.lumen {
        parts.push(format!("{lumen:.0} lm"));
    }
    if let Some(watt) = item.wattage {
        parts.push(format!("{watt} W"));
    }
    if item.is_dimmable() {
        parts.push("dimmbar".into());
    }
    match item.price {
        Some(price) => parts.push(format!("{price:.2} €")),
        None => parts.push("Preis auf Anfrage".into()),
    }
    parts.join(" | ")
}

#[async_trait]
impl Reasoner for LlmReasoner {
    async fn classify(
        &self,
        text: &str,
        context: &[String],
    ) -> Result<Classification, ReasonerError> {
        let reply = self
            .call(
                CLASSIFY_PROMPT,
                with_context(text, context),
                self.limits.classify_max_tokens,
                true,
            )
            .await?;
        let classification = parse_classification(&reply, text);
        debug!(intent = %classification.intent, confidence = classification.confidence, "Classified");
        Ok(classification)
    }

    async fn extract_filters(
        &self,
        text: &str,
        intent: Intent,
        context: &[String],
    ) -> Result<FilterSpec, ReasonerError> {
        let user = format!("Kategorie: {}\n{}", intent.tag(), with_context(text, context));
        let reply = self
            .call(FILTER_PROMPT, user, self.limits.filter_max_tokens, true)
            .await?;
        Ok(parse_filter_spec(&reply))
    }

    async fn compose_answer(
        &self,
        text: &str,
        intent: Intent,
        items: &[CatalogItem],
        context: &[String],
    ) -> Result<ComposedAnswer, ReasonerError> {
        let listing = items
            .iter()
            .take(MAX_COMPOSE_ITEMS)
            .map(|item| format!("- {}", describe_item(item)))
            .collect::<Vec<_>>()
            .join("\n");
        let user = format!(
            "Kategorie: {}\n{}\n\nGefundene Produkte:\n{listing}",
            intent.tag(),
            with_context(text, context)
        );
        let reply = self
            .call(COMPOSE_PROMPT, user, self.limits.compose_max_tokens, true)
            .await?;
        parse_composed(&reply)
    }

    async fn extract_search_term(&self, text: &str) -> Result<String, ReasonerError> {
        let reply = self
            .call(
                SEARCH_TERM_PROMPT,
                text.to_string(),
                self.limits.search_term_max_tokens,
                false,
            )
            .await?;
        let term = reply
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.')
            .trim();
        if term.is_empty() {
            return Err(ReasonerError::Malformed("empty search term".into()));
        }
        Ok(term.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedProvider;

    fn reasoner(replies: &[&str]) -> (LlmReasoner, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider::replying(replies));
        (LlmReasoner::new(provider.clone(), "gpt-4o-mini"), provider)
    }

    #[tokio::test]
    async fn classify_parses_json() {
        let (r, provider) = reasoner(&[
            r#"{"intent": "produktvergleich", "confidence": 0.8, "rationale": "zwei Namen"}"#,
        ]);
        let c = r.classify("Mezy oder Orbit?", &[]).await.unwrap();
        assert_eq!(c.intent, Intent::Comparison);
        assert!((c.confidence - 0.8).abs() < 1e-6);
        let request = &provider.requests()[0];
        assert!(request.json_mode);
        assert_eq!(request.max_tokens, Some(150));
    }

    #[tokio::test]
    async fn classify_falls_back_on_garbage() {
        let (r, _) = reasoner(&["Ich denke, das ist eine Empfehlung.", "{\"intent\": 7}"]);
        let c = r.classify("Wandleuchte für den Flur", &[]).await.unwrap();
        assert_eq!(c.intent, Intent::Recommendation);
        assert!((c.confidence - 0.5).abs() < 1e-6);

        let c = r.classify("etwas ähnliches wie Mezy", &[]).await.unwrap();
        assert_eq!(c.intent, Intent::SimilarProducts);
    }

    #[tokio::test]
    async fn provider_failure_is_an_error() {
        let r = LlmReasoner::new(Arc::new(ScriptedProvider::failing()), "m");
        assert!(matches!(
            r.classify("x", &[]).await,
            Err(ReasonerError::Provider(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_provider_times_out() {
        let r = LlmReasoner::new(Arc::new(ScriptedProvider::hanging()), "m")
            .with_timeout(Duration::from_secs(3));
        assert!(matches!(
            r.extract_search_term("x").await,
            Err(ReasonerError::Timeout { timeout_secs: 3 })
        ));
    }

    #[test]
    fn filter_spec_validates_fields() {
        let spec = parse_filter_spec(
            r#"```json
            {"luminaire_type": "Wandleuchte", "cct": "3000K", "min_protection": "ip65",
             "housing_color": "weiß", "sdcm_max": 3, "dim_to_warm": true,
             "search_term": "Flur", "rationale": "Wand, warm"}
            ```"#,
        );
        assert!(!spec.broad);
        let c = &spec.criteria;
        assert_eq!(c.luminaire, Some(LuminaireType::Wall));
        assert_eq!(c.cct, Some(Cct::K3000));
        assert_eq!(c.min_protection.as_deref(), Some("IP65"));
        assert_eq!(c.housing_color.as_deref(), Some("White"));
        assert_eq!(c.sdcm.unwrap().category, Some(SdcmCategory::Premium));
        assert!(c.dimmable);
        assert_eq!(spec.search_term.as_deref(), Some("Flur"));
    }

    #[test]
    fn filter_spec_drops_invalid_values() {
        let spec = parse_filter_spec(
            r#"{"luminaire_type": "spaceship", "cct": 6500, "min_protection": "IP99", "sdcm_max": 40}"#,
        );
        assert!(!spec.broad);
        assert!(!spec.criteria.has_constraints());
    }

    #[test]
    fn unparsable_filter_output_is_broad() {
        assert!(parse_filter_spec("Wandleuchten in weiß").broad);
        assert!(parse_filter_spec("[1, 2]").broad);
    }

    #[tokio::test]
    async fn compose_reads_json_and_plain_text() {
        let (r, _) = reasoner(&[
            r#"{"answer": "Die Mezy Wall passt gut.", "follow_ups": ["Mehr?", "", "Preis?", "A", "B"]}"#,
            "Die Mezy Wall passt gut.",
            r#"{"answer": ""}"#,
        ]);
        let items = crate::test_helpers::sample_items();
        let a = r.compose_answer("x", Intent::Recommendation, &items, &[]).await.unwrap();
        assert_eq!(a.follow_ups, vec!["Mehr?", "Preis?", "A"]);
        let b = r.compose_answer("x", Intent::Recommendation, &items, &[]).await.unwrap();
        assert_eq!(b.text, "Die Mezy Wall passt gut.");
        assert!(matches!(
            r.compose_answer("x", Intent::Recommendation, &items, &[]).await,
            Err(ReasonerError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn compose_lists_a_bounded_number_of_items() {
        let (r, provider) = reasoner(&[r#"{"answer": "ok"}"#]);
        let items = crate::test_helpers::sample_items();
        r.compose_answer("x", Intent::Recommendation, &items, &["vorher".into()])
            .await
            .unwrap();
        let prompt = &provider.requests()[0].messages[1].content;
        assert_eq!(prompt.lines().filter(|l| l.starts_with("- ") && l.contains('|')).count(), 8);
        assert!(prompt.contains("vorher"));
    }

    #[tokio::test]
    async fn search_term_is_cleaned() {
        let (r, _) = reasoner(&["\"Spiegelleuchte\".\nweil ...", "   "]);
        assert_eq!(r.extract_search_term("x").await.unwrap(), "Spiegelleuchte");
        assert!(matches!(
            r.extract_search_term("x").await,
            Err(ReasonerError::Malformed(_))
        ));
    }
}
