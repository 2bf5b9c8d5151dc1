//! The tiered query router.
//!
//! ```text
//! text ─► context filter ─► cache? ─► extractors ─► rule table
//!                                                    │
//!            ┌───────────────────────────────────────┤
//!            ▼                                       ▼
//!        fast path ──(technical failure)──► optimized path
//!                                              │  classify ∥ direct query
//!                                              ▼
//!                                           text search ──(failure / empty)──► fallback
//! ```
//!
//! Fast-path responses are cached. Only the fallback tier surfaces errors.

use crate::answers;
use crate::cache::ResponseCache;
use crate::context_filter::ContextFilter;
use crate::error::RouteError;
use crate::reasoner::LlmReasoner;
use crate::rules;
use crate::search;
use crate::selection::{DisplayLimits, select};
use luxroute_config::{AppConfig, ConfigError, RouterConfig};
use luxroute_core::catalog::{CatalogItem, CatalogQuery, CatalogStore, Field};
use luxroute_core::criteria::Criteria;
use luxroute_core::error::{CatalogError, ReasonerError};
use luxroute_core::provider::Provider;
use luxroute_core::reasoner::{Intent, Reasoner};
use luxroute_core::route::{FastPattern, RouteResponse, Tier};
use luxroute_extract::{
    CannedTopic, OverviewKind, OverviewRequest, ProductQuestion, ProtectionVocabulary,
    QuerySignals, product_question,
};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, debug, info, info_span, warn};

/// A technical failure inside one step; escalates to the next tier.
#[derive(Debug)]
enum StepError {
    Catalog(CatalogError),
    Reasoner(ReasonerError),
}

impl From<CatalogError> for StepError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

impl From<ReasonerError> for StepError {
    fn from(e: ReasonerError) -> Self {
        Self::Reasoner(e)
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog(e) => write!(f, "{e}"),
            Self::Reasoner(e) => write!(f, "{e}"),
        }
    }
}

/// Routes free-text lighting queries through the fast, optimized and
/// fallback tiers.
pub struct TieredRouter {
    catalog: Arc<dyn CatalogStore>,
    reasoner: Arc<dyn Reasoner>,
    context_filter: Option<ContextFilter>,
    cache: Option<Arc<ResponseCache>>,
    vocabulary: ProtectionVocabulary,
    settings: RouterConfig,
}

impl TieredRouter {
    /// A router with default settings, no cache and no context filter.
    /// Without a filter the most recent turns of the window are used as-is.
    pub fn new(catalog: Arc<dyn CatalogStore>, reasoner: Arc<dyn Reasoner>) -> Self {
        Self {
            catalog,
            reasoner,
            context_filter: None,
            cache: None,
            vocabulary: ProtectionVocabulary::default(),
            settings: RouterConfig::default(),
        }
    }

    /// Wire a router from configuration: LLM reasoner and context filter on
    /// `provider`, cache if enabled, configured protection vocabulary.
    pub fn from_config(
        config: &AppConfig,
        catalog: Arc<dyn CatalogStore>,
        provider: Arc<dyn Provider>,
    ) -> Result<Self, ConfigError> {
        let timeout = Duration::from_secs(config.reasoner.timeout_secs);
        let reasoner = LlmReasoner::new(provider.clone(), &config.default_model)
            .with_config(&config.reasoner)
            .with_temperature(config.default_temperature);
        let context_filter = ContextFilter::new(provider, &config.default_model)
            .with_timeout(timeout)
            .with_max_tokens(config.reasoner.relevance_max_tokens)
            .with_window(config.router.context_window);

        let mut router = Self::new(catalog, Arc::new(reasoner))
            .with_context_filter(context_filter)
            .with_vocabulary(config.extract.protection_vocabulary()?)
            .with_settings(config.router.clone());
        if config.cache.enabled {
            router = router.with_cache(Arc::new(ResponseCache::from_config(
                &config.cache,
                &config.router,
            )));
        }
        Ok(router)
    }

    pub fn with_context_filter(mut self, filter: ContextFilter) -> Self {
        self.context_filter = Some(filter);
        self
    }

    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: ProtectionVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn with_settings(mut self, settings: RouterConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn cache(&self) -> Option<&Arc<ResponseCache>> {
        self.cache.as_ref()
    }

    fn display_limits(&self) -> DisplayLimits {
        DisplayLimits {
            display: self.settings.display_limit,
            cheap_display: self.settings.cheap_display_limit,
        }
    }

    /// Route one query. `session_context` holds prior user turns, oldest
    /// first; only the last few are considered.
    pub async fn route(
        &self,
        text: &str,
        session_context: &[String],
    ) -> Result<RouteResponse, RouteError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("route", request_id = %request_id);

        async move {
            let started = Instant::now();
            match self.resolve(text.trim(), session_context).await {
                Ok(mut response) => {
                    response.request_id = request_id;
                    info!(
                        tier = %response.path_taken,
                        items = response.items.len(),
                        total = response.total_matches,
                        cached = response.cached,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Query routed"
                    );
                    Ok(response)
                }
                Err(e) => {
                    let cause = std::error::Error::source(&e).map(|s| s.to_string());
                    warn!(error = %e, cause = ?cause, "Routing failed on every tier");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn resolve(
        &self,
        text: &str,
        session_context: &[String],
    ) -> Result<RouteResponse, RouteError> {
        let context = self.relevant_context(text, session_context).await;

        let cache_key = self.cache.as_ref().map(|cache| cache.key(text, &context));
        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(mut hit) = cache.get(key).await {
                debug!("Cache hit");
                hit.cached = true;
                return Ok(hit);
            }
        }

        let signals = QuerySignals::extract(text, &context, &self.vocabulary);
        let (tier, criteria) = rules::decide(&signals).into_parts();
        debug!(%tier, filters = ?criteria.describe(), "Routing decision");

        let response = match tier {
            Tier::Fast(pattern) => {
                match self.fast_path(pattern, text, &signals, &criteria, &context).await {
                    Ok(response) => response,
                    Err(e) => {
                        warn!(pattern = pattern.as_str(), error = %e, "Fast path failed, escalating");
                        self.optimized_path(text, &criteria, &context).await?
                    }
                }
            }
            Tier::Optimized | Tier::Fallback => {
                self.optimized_path(text, &criteria, &context).await?
            }
        };

        if let (Some(cache), Some(key), true) = (&self.cache, cache_key, response.is_fast_path()) {
            cache.set(key, response.clone()).await;
        }
        Ok(response)
    }

    /// The prior turns that still apply. A named-product question is about
    /// one product, so it takes no context at all.
    async fn relevant_context(&self, text: &str, session_context: &[String]) -> Vec<String> {
        if product_question(text).is_some() {
            return Vec::new();
        }
        let start = session_context
            .len()
            .saturating_sub(self.settings.context_window);
        let window = &session_context[start..];
        match &self.context_filter {
            Some(filter) => filter.filter(text, window).await,
            None => window.to_vec(),
        }
    }

    // --- Fast path ---

    async fn fast_path(
        &self,
        pattern: FastPattern,
        text: &str,
        signals: &QuerySignals,
        criteria: &Criteria,
        context: &[String],
    ) -> Result<RouteResponse, StepError> {
        let limits = &self.settings.limits;
        let response = match pattern {
            FastPattern::ProductQuestion => match &signals.product_question {
                Some(question) => self.answer_product_question(question).await?,
                None => self.nothing_found(pattern, criteria),
            },
            FastPattern::LedStrip => {
                let query =
                    search::led_strip_query(criteria, signals.connector_request, limits.led_strip);
                let mut filters = criteria.describe();
                if !signals.connector_request {
                    filters.push("accessories excluded".to_string());
                }
                self.listing(pattern, query, filters, criteria.cheaper, text, context)
                    .await?
            }
            FastPattern::CategoryOverview => match &signals.overview {
                Some(overview) => self.overview(overview).await?,
                None => self.nothing_found(pattern, criteria),
            },
            FastPattern::DimToWarm => {
                let query = search::dim_to_warm_query(criteria, limits.type_query);
                self.listing(pattern, query, criteria.describe(), criteria.cheaper, text, context)
                    .await?
            }
            FastPattern::TypeWithCct
            | FastPattern::TypeOnly
            | FastPattern::TypeWithProtection => {
                let query = search::type_query(criteria, limits.type_query);
                self.listing(pattern, query, criteria.describe(), criteria.cheaper, text, context)
                    .await?
            }
            FastPattern::ProtectionOnly => match &criteria.min_protection {
                Some(code) => self.protection_listing(code, criteria.cheaper).await?,
                None => self.nothing_found(pattern, criteria),
            },
            FastPattern::CannedAnswer => match &signals.canned {
                Some(topic) => self.canned(topic),
                None => self.nothing_found(pattern, criteria),
            },
        };
        Ok(response)
    }

    fn nothing_found(&self, pattern: FastPattern, criteria: &Criteria) -> RouteResponse {
        let filters = criteria.describe();
        RouteResponse::new(Tier::Fast(pattern), answers::nothing_found(&filters))
            .with_filters(filters)
            .with_follow_ups(answers::follow_ups(pattern))
    }

    async fn answer_product_question(
        &self,
        question: &ProductQuestion,
    ) -> Result<RouteResponse, StepError> {
        let limit = self.settings.limits.product_lookup;
        let mut candidates = self
            .catalog
            .query(search::product_lookup(&question.name, limit))
            .await?;
        if candidates.is_empty() {
            if let Some(query) = search::product_lookup_by_words(&question.name, limit) {
                candidates = self.catalog.query(query).await?;
            }
        }

        let tier = Tier::Fast(FastPattern::ProductQuestion);
        let response = match search::best_name_match(&question.name, &candidates) {
            Some(item) => {
                debug!(product = %item.name, kind = ?question.kind, "Product resolved");
                RouteResponse::new(tier, answers::product_answer(question, item))
                    .with_items(vec![item.clone()], 1)
            }
            None => RouteResponse::new(tier, answers::product_not_found(&question.name)),
        };
        Ok(response
            .with_filters(vec![format!("product: {}", question.name)])
            .with_follow_ups(answers::follow_ups(FastPattern::ProductQuestion)))
    }

    /// Query, select and compose. An empty result gets the templated reply
    /// without any reasoning call.
    async fn listing(
        &self,
        pattern: FastPattern,
        query: CatalogQuery,
        filters: Vec<String>,
        cheaper: bool,
        text: &str,
        context: &[String],
    ) -> Result<RouteResponse, StepError> {
        let items = self.catalog.query(query).await?;
        let tier = Tier::Fast(pattern);
        if items.is_empty() {
            return Ok(RouteResponse::new(tier, answers::nothing_found(&filters))
                .with_filters(filters)
                .with_follow_ups(answers::follow_ups(pattern)));
        }

        let (shown, total) = select(items, cheaper, self.display_limits());
        let composed = self
            .reasoner
            .compose_answer(text, Intent::Recommendation, &shown, context)
            .await?;
        let follow_ups = if composed.follow_ups.is_empty() {
            answers::follow_ups(pattern)
        } else {
            composed.follow_ups
        };
        Ok(RouteResponse::new(tier, composed.text)
            .with_items(shown, total)
            .with_filters(filters)
            .with_follow_ups(follow_ups))
    }

    async fn overview(&self, request: &OverviewRequest) -> Result<RouteResponse, StepError> {
        let predicates = search::overview_predicates(
            request.circuit.as_deref(),
            request.kind == OverviewKind::TrackSystems,
        );
        let counts = self.catalog.count_by(Field::Category2, predicates).await?;
        let total = counts.iter().map(|c| c.count).sum();
        let mut filters = vec!["category overview".to_string()];
        if let Some(circuit) = &request.circuit {
            filters.push(format!("category: {circuit}"));
        }
        Ok(RouteResponse::new(
            Tier::Fast(FastPattern::CategoryOverview),
            answers::overview_answer(request.kind, &counts),
        )
        .with_items(Vec::new(), total)
        .with_filters(filters)
        .with_follow_ups(answers::follow_ups(FastPattern::CategoryOverview)))
    }

    async fn protection_listing(
        &self,
        min_code: &str,
        cheaper: bool,
    ) -> Result<RouteResponse, StepError> {
        let items = self
            .catalog
            .query(search::protection_query(
                min_code,
                self.settings.limits.protection,
            ))
            .await?;
        let luminaires: Vec<CatalogItem> =
            items.into_iter().filter(CatalogItem::is_luminaire).collect();
        let found = luminaires.len();
        let (shown, total) = select(luminaires, cheaper, self.display_limits());
        Ok(RouteResponse::new(
            Tier::Fast(FastPattern::ProtectionOnly),
            answers::protection_answer(min_code, found),
        )
        .with_items(shown, total)
        .with_filters(vec![
            format!("IP protection >= {min_code}"),
            "luminaires only".to_string(),
        ])
        .with_follow_ups(answers::follow_ups(FastPattern::ProtectionOnly)))
    }

    fn canned(&self, topic: &CannedTopic) -> RouteResponse {
        RouteResponse::new(
            Tier::Fast(FastPattern::CannedAnswer),
            answers::canned_answer(topic),
        )
        .with_follow_ups(answers::follow_ups(FastPattern::CannedAnswer))
    }

    // --- Optimized path ---

    /// Classification and the direct query run concurrently. Usable direct
    /// results are composed; everything else falls through to text search.
    async fn optimized_path(
        &self,
        text: &str,
        criteria: &Criteria,
        context: &[String],
    ) -> Result<RouteResponse, RouteError> {
        let limits = &self.settings.limits;
        let direct = async {
            if criteria.has_constraints() {
                Some(
                    self.catalog
                        .query(search::direct_query(criteria, limits.type_query))
                        .await,
                )
            } else {
                None
            }
        };
        let (classification, direct) =
            futures::future::join(self.reasoner.classify(text, context), direct).await;

        let intent = match classification {
            Ok(classification) => {
                match direct {
                    Some(Ok(items)) if !items.is_empty() => {
                        let (shown, total) = select(items, criteria.cheaper, self.display_limits());
                        match self
                            .reasoner
                            .compose_answer(text, classification.intent, &shown, context)
                            .await
                        {
                            Ok(composed) => {
                                return Ok(RouteResponse::new(Tier::Optimized, composed.text)
                                    .with_items(shown, total)
                                    .with_filters(criteria.describe())
                                    .with_follow_ups(composed.follow_ups));
                            }
                            Err(e) => warn!(error = %e, "Composition failed, trying text search"),
                        }
                    }
                    Some(Err(e)) => warn!(error = %e, "Direct query failed, trying text search"),
                    Some(Ok(_)) => debug!("Direct query found nothing"),
                    None => debug!("No constraints for a direct query"),
                }
                Some(classification.intent)
            }
            Err(e) => {
                warn!(error = %e, "Classification failed, trying text search");
                None
            }
        };

        self.text_search(text, intent, criteria, context).await
    }

    async fn text_search(
        &self,
        text: &str,
        intent: Option<Intent>,
        criteria: &Criteria,
        context: &[String],
    ) -> Result<RouteResponse, RouteError> {
        let term = match self.reasoner.extract_search_term(text).await {
            Ok(term) => term,
            Err(e) => {
                warn!(error = %e, "Search term extraction failed, searching raw text");
                text.to_string()
            }
        };

        let query = search::text_search_query(&term, self.settings.limits.text_search);
        let items = match self.catalog.query(query).await {
            Ok(items) if !items.is_empty() => items,
            Ok(_) => {
                debug!(term = %term, "Text search found nothing");
                return self.fallback_path(text, criteria, context).await;
            }
            Err(e) => {
                warn!(error = %e, "Text search failed");
                return self.fallback_path(text, criteria, context).await;
            }
        };

        let (shown, total) = select(items, criteria.cheaper, self.display_limits());
        let intent = intent.unwrap_or(Intent::Recommendation);
        match self
            .reasoner
            .compose_answer(text, intent, &shown, context)
            .await
        {
            Ok(composed) => Ok(RouteResponse::new(Tier::Optimized, composed.text)
                .with_items(shown, total)
                .with_filters(vec![format!("search term: {term}")])
                .with_follow_ups(composed.follow_ups)),
            Err(e) => {
                warn!(error = %e, "Composition failed after text search");
                self.fallback_path(text, criteria, context).await
            }
        }
    }

    // --- Fallback path ---

    /// Full reasoning: classify, generate filters, query, compose. Failures
    /// here end the request.
    async fn fallback_path(
        &self,
        text: &str,
        criteria: &Criteria,
        context: &[String],
    ) -> Result<RouteResponse, RouteError> {
        let classification = self
            .reasoner
            .classify(text, context)
            .await
            .map_err(RouteError::ReasoningUnavailable)?;
        let mut spec = self
            .reasoner
            .extract_filters(text, classification.intent, context)
            .await
            .map_err(RouteError::ReasoningUnavailable)?;
        if !spec.broad && spec.criteria.housing_color.is_none() {
            spec.criteria.housing_color = criteria.housing_color.clone();
        }

        let items = self
            .catalog
            .query(search::fallback_query(&spec, self.settings.limits.fallback))
            .await
            .map_err(RouteError::CatalogUnavailable)?;

        let mut filters = if spec.broad {
            vec!["available items".to_string()]
        } else {
            spec.criteria.describe()
        };
        if let Some(term) = spec.search_term.as_deref().filter(|_| !spec.broad) {
            filters.push(format!("search term: {term}"));
        }

        if items.is_empty() {
            return Ok(RouteResponse::new(Tier::Fallback, answers::nothing_found(&filters))
                .with_filters(filters));
        }

        let cheaper = spec.criteria.cheaper || criteria.cheaper;
        let (shown, total) = select(items, cheaper, self.display_limits());
        let composed = self
            .reasoner
            .compose_answer(text, classification.intent, &shown, context)
            .await
            .map_err(RouteError::ReasoningUnavailable)?;
        Ok(RouteResponse::new(Tier::Fallback, composed.text)
            .with_items(shown, total)
            .with_filters(filters)
            .with_follow_ups(composed.follow_ups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingCatalog, MockReasoner, ScriptedProvider, sample_catalog};
    use luxroute_core::criteria::LuminaireType;
    use luxroute_core::reasoner::FilterSpec;

    fn router(reasoner: Arc<MockReasoner>) -> TieredRouter {
        TieredRouter::new(Arc::new(sample_catalog()), reasoner)
    }

    fn turns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn white_wall_light_takes_type_with_cct() {
        let reasoner = Arc::new(MockReasoner::new());
        let response = router(reasoner.clone())
            .route("weiße Wandleuchte 3000K", &[])
            .await
            .unwrap();
        assert_eq!(response.path_taken, Tier::Fast(FastPattern::TypeWithCct));
        assert!(response.applied_filters.contains(&"CCT: 3000K".to_string()));
        assert!(response.applied_filters.contains(&"luminaire type: wall".to_string()));
        assert!(response.applied_filters.contains(&"housing color: White".to_string()));
        let names: Vec<&str> = response.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Mezy Wall"]);
        assert_eq!(reasoner.calls(), vec!["compose_answer"]);
    }

    #[tokio::test]
    async fn product_question_resolves_one_item_and_ignores_context() {
        let reasoner = Arc::new(MockReasoner::new());
        let response = router(reasoner.clone())
            .route("ist Salsa Lid dimmbar?", &turns(&["Wandleuchte 3000K"]))
            .await
            .unwrap();
        assert_eq!(response.path_taken, Tier::Fast(FastPattern::ProductQuestion));
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].name, "Salsa Lid");
        assert!(response.answer.starts_with("Ja, Salsa Lid ist dimmbar"));
        assert!(reasoner.calls().is_empty());
    }

    #[tokio::test]
    async fn product_question_skips_context_filter() {
        let provider = Arc::new(ScriptedProvider::replying(&["1"]));
        let router = router(Arc::new(MockReasoner::new()))
            .with_context_filter(ContextFilter::new(provider.clone(), "m"));
        router
            .route("ist Salsa Lid dimmbar?", &turns(&["Wandleuchte"]))
            .await
            .unwrap();
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_product_gets_not_found() {
        let response = router(Arc::new(MockReasoner::new()))
            .route("ist Quasar Neo dimmbar?", &[])
            .await
            .unwrap();
        assert_eq!(response.path_taken, Tier::Fast(FastPattern::ProductQuestion));
        assert!(response.items.is_empty());
        assert!(response.answer.contains("Quasar Neo"));
    }

    #[tokio::test]
    async fn protection_only_needs_luminaire_noun() {
        let reasoner = Arc::new(MockReasoner::new());
        let response = router(reasoner.clone())
            .route("IP44 Leuchten", &[])
            .await
            .unwrap();
        assert_eq!(response.path_taken, Tier::Fast(FastPattern::ProtectionOnly));
        assert!(response.items.iter().all(CatalogItem::is_luminaire));
        assert!(response.items.iter().all(|i| i.name != "Driver 20W"));
        assert!(response.answer.starts_with("Ich habe 5 Leuchten"));
        assert!(reasoner.calls().is_empty());

        let response = router(Arc::new(MockReasoner::new()))
            .route("IP44", &[])
            .await
            .unwrap();
        assert_ne!(response.path_taken, Tier::Fast(FastPattern::ProtectionOnly));
    }

    #[tokio::test]
    async fn strip_search_excludes_connectors() {
        let response = router(Arc::new(MockReasoner::new()))
            .route("LED Strip 3000K", &[])
            .await
            .unwrap();
        assert_eq!(response.path_taken, Tier::Fast(FastPattern::LedStrip));
        let names: Vec<&str> = response.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Flex Strip 24V"]);
    }

    #[tokio::test]
    async fn overview_counts_track_categories() {
        let reasoner = Arc::new(MockReasoner::new());
        let response = router(reasoner.clone())
            .route("Welche Schienensysteme habt ihr?", &[])
            .await
            .unwrap();
        assert_eq!(response.path_taken, Tier::Fast(FastPattern::CategoryOverview));
        assert_eq!(response.total_matches, 2);
        assert!(response.answer.contains("Insgesamt 2 Produkte in 2 Kategorien"));
        assert!(reasoner.calls().is_empty());
    }

    #[tokio::test]
    async fn canned_question_needs_no_calls() {
        let reasoner = Arc::new(MockReasoner::new());
        let response = router(reasoner.clone())
            .route("Was ist IP44?", &[])
            .await
            .unwrap();
        assert_eq!(response.path_taken, Tier::Fast(FastPattern::CannedAnswer));
        assert_eq!(response.follow_ups[0], "Haben Sie weitere Fragen?");
        assert!(reasoner.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_fast_path_is_templated() {
        let reasoner = Arc::new(MockReasoner::new());
        let response = router(reasoner.clone())
            .route("schwarze Stehleuchte", &[])
            .await
            .unwrap();
        assert_eq!(response.path_taken, Tier::Fast(FastPattern::TypeOnly));
        assert!(response.items.is_empty());
        assert!(response.answer.starts_with("Leider"));
        assert!(reasoner.calls().is_empty());
    }

    #[tokio::test]
    async fn context_supplies_missing_type() {
        let response = router(Arc::new(MockReasoner::new()))
            .route("lieber 4000K", &turns(&["Ich suche eine Wandleuchte"]))
            .await
            .unwrap();
        assert_eq!(response.path_taken, Tier::Fast(FastPattern::TypeWithCct));
        assert_eq!(response.items[0].name, "Orbit Wall");
    }

    #[tokio::test]
    async fn cheaper_selects_by_price() {
        let response = router(Arc::new(MockReasoner::new()))
            .route("günstige Wandleuchte", &[])
            .await
            .unwrap();
        let prices: Vec<f64> = response.items.iter().filter_map(|i| i.price).collect();
        assert_eq!(prices, vec![65.0, 79.0, 89.0, 119.0]);
    }

    #[tokio::test]
    async fn fast_path_compose_failure_escalates() {
        let reasoner = Arc::new(MockReasoner::new().fail_compose());
        let result = router(reasoner.clone())
            .route("Pendelleuchte", &[])
            .await;
        assert!(matches!(result, Err(RouteError::ReasoningUnavailable(_))));
        let calls = reasoner.calls();
        assert_eq!(calls[0], "compose_answer");
        assert_eq!(calls[1], "classify");
        assert!(calls.contains(&"extract_search_term"));
    }

    #[tokio::test]
    async fn optimized_path_composes_direct_results() {
        let reasoner = Arc::new(MockReasoner::new());
        let response = router(reasoner.clone())
            .route("etwas Dimmbares", &[])
            .await
            .unwrap();
        assert_eq!(response.path_taken, Tier::Optimized);
        assert!(response.applied_filters.contains(&"dimmable".to_string()));
        assert!(!response.items.is_empty());
        assert_eq!(reasoner.calls(), vec!["classify", "compose_answer"]);
    }

    #[tokio::test]
    async fn classification_failure_falls_to_text_search() {
        let reasoner = Arc::new(MockReasoner::new().fail_classify().with_search_term("Glas"));
        let response = router(reasoner.clone())
            .route("etwas aus Glas fürs Esszimmer", &[])
            .await
            .unwrap();
        assert_eq!(response.path_taken, Tier::Optimized);
        assert_eq!(response.items[0].name, "Salsa Lid");
        assert_eq!(response.applied_filters, vec!["search term: Glas".to_string()]);
        assert_eq!(reasoner.count("classify"), 1);
    }

    #[tokio::test]
    async fn empty_text_search_escalates_to_fallback() {
        let reasoner = Arc::new(
            MockReasoner::new()
                .with_search_term("Kronleuchter")
                .with_filters(FilterSpec {
                    criteria: Criteria {
                        luminaire: Some(LuminaireType::Pendant),
                        ..Criteria::default()
                    },
                    ..FilterSpec::default()
                }),
        );
        let response = router(reasoner.clone())
            .route("etwas Elegantes", &[])
            .await
            .unwrap();
        assert_eq!(response.path_taken, Tier::Fallback);
        assert_eq!(response.items[0].name, "Salsa Lid");
        assert_eq!(reasoner.count("extract_filters"), 1);
    }

    #[tokio::test]
    async fn fallback_reasoning_failure_is_user_safe() {
        let err = router(Arc::new(MockReasoner::failing()))
            .route("etwas Elegantes", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, RouteError::ReasoningUnavailable(_)));
        assert!(!err.user_message().contains("quota"));
    }

    #[tokio::test]
    async fn catalog_outage_surfaces_as_catalog_unavailable() {
        let catalog = Arc::new(FailingCatalog::new());
        let router = TieredRouter::new(catalog.clone(), Arc::new(MockReasoner::new()));
        let err = router.route("Pendelleuchte", &[]).await.unwrap_err();
        assert!(matches!(err, RouteError::CatalogUnavailable(_)));
        assert!(catalog.calls() >= 3);
    }

    #[tokio::test]
    async fn only_fast_path_results_are_cached() {
        let cache = Arc::new(ResponseCache::new(Duration::from_secs(300)));
        let reasoner = Arc::new(MockReasoner::new());
        let router = router(reasoner.clone()).with_cache(cache.clone());

        let first = router.route("Pendelleuchte", &[]).await.unwrap();
        assert!(!first.cached);
        let second = router.route("Pendelleuchte", &[]).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.answer, first.answer);
        assert_eq!(reasoner.count("compose_answer"), 1);

        router.route("etwas Dimmbares", &[]).await.unwrap();
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn cache_key_depends_on_context() {
        let cache = Arc::new(ResponseCache::new(Duration::from_secs(300)));
        let reasoner = Arc::new(MockReasoner::new());
        let router = router(reasoner.clone()).with_cache(cache.clone());
        router.route("lieber 3000K", &turns(&["Wandleuchte"])).await.unwrap();
        let other = router
            .route("lieber 3000K", &turns(&["Deckenleuchte"]))
            .await
            .unwrap();
        assert!(!other.cached);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn vocabulary_override_raises_minimum() {
        let vocabulary = ProtectionVocabulary::default()
            .with_entry("pool", "IP68")
            .unwrap();
        let response = router(Arc::new(MockReasoner::new()))
            .with_vocabulary(vocabulary)
            .route("Leuchten für den Pool", &[])
            .await
            .unwrap();
        assert_eq!(response.path_taken, Tier::Fast(FastPattern::ProtectionOnly));
        assert!(response.applied_filters.contains(&"IP protection >= IP68".to_string()));
        assert!(response.items.is_empty());
    }

    #[tokio::test]
    async fn from_config_wires_cache_and_filter() {
        let config = AppConfig::default();
        let provider = Arc::new(ScriptedProvider::replying(&[]));
        let router =
            TieredRouter::from_config(&config, Arc::new(sample_catalog()), provider).unwrap();
        assert!(router.cache().is_some());
        assert!(router.context_filter.is_some());
    }
}
