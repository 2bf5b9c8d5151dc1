//! Shared test collaborators for router tests.

use async_trait::async_trait;
use luxroute_catalog::InMemoryCatalog;
use luxroute_core::catalog::{CatalogItem, CatalogQuery, CatalogStore};
use luxroute_core::error::{CatalogError, ProviderError, ReasonerError};
use luxroute_core::message::Message;
use luxroute_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use luxroute_core::reasoner::{Classification, ComposedAnswer, FilterSpec, Intent, Reasoner};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A provider that answers from a queue of scripted replies.
///
/// An exhausted script answers with an API error.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
    hang: bool,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            hang: false,
        }
    }

    pub fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn failing() -> Self {
        Self::new(vec![Err(ProviderError::QuotaExceeded("insufficient_quota".into()))])
    }

    /// Never answers.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new(vec![])
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        if self.hang {
            std::future::pending::<()>().await;
        }
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Ok(text)) => Ok(ProviderResponse {
                message: Message::assistant(text),
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
                model: "mock-model".into(),
            }),
            Some(Err(e)) => Err(e),
            None => Err(ProviderError::ApiError {
                status_code: 500,
                message: "script exhausted".into(),
            }),
        }
    }
}

/// A reasoner with switchable failures that records which calls it got.
pub struct MockReasoner {
    intent: Intent,
    filters: FilterSpec,
    search_term: String,
    fail_classify: bool,
    fail_filters: bool,
    fail_compose: bool,
    fail_search_term: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl MockReasoner {
    pub fn new() -> Self {
        Self {
            intent: Intent::Recommendation,
            filters: FilterSpec::broad("mock"),
            search_term: String::new(),
            fail_classify: false,
            fail_filters: false,
            fail_compose: false,
            fail_search_term: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a quota error.
    pub fn failing() -> Self {
        Self {
            fail_classify: true,
            fail_filters: true,
            fail_compose: true,
            fail_search_term: true,
            ..Self::new()
        }
    }

    pub fn with_filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_search_term(mut self, term: &str) -> Self {
        self.search_term = term.to_string();
        self
    }

    pub fn fail_classify(mut self) -> Self {
        self.fail_classify = true;
        self
    }

    pub fn fail_compose(mut self) -> Self {
        self.fail_compose = true;
        self
    }

    pub fn fail_search_term(mut self) -> Self {
        self.fail_search_term = true;
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    fn record(&self, call: &'static str, fail: bool) -> Result<(), ReasonerError> {
        self.calls.lock().unwrap().push(call);
        if fail {
            Err(ReasonerError::Provider(ProviderError::QuotaExceeded(
                "insufficient_quota".into(),
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Reasoner for MockReasoner {
    async fn classify(
        &self,
        _text: &str,
        _context: &[String],
    ) -> Result<Classification, ReasonerError> {
        self.record("classify", self.fail_classify)?;
        Ok(Classification {
            intent: self.intent,
            confidence: 0.9,
            rationale: "mock".into(),
        })
    }

    async fn extract_filters(
        &self,
        _text: &str,
        _intent: Intent,
        _context: &[String],
    ) -> Result<FilterSpec, ReasonerError> {
        self.record("extract_filters", self.fail_filters)?;
        Ok(self.filters.clone())
    }

    async fn compose_answer(
        &self,
        _text: &str,
        _intent: Intent,
        items: &[CatalogItem],
        _context: &[String],
    ) -> Result<ComposedAnswer, ReasonerError> {
        self.record("compose_answer", self.fail_compose)?;
        Ok(ComposedAnswer {
            text: format!("{} passende Produkte", items.len()),
            follow_ups: vec!["Soll ich nach Preis sortieren?".into()],
        })
    }

    async fn extract_search_term(&self, text: &str) -> Result<String, ReasonerError> {
        self.record("extract_search_term", self.fail_search_term)?;
        if self.search_term.is_empty() {
            Ok(text.to_string())
        } else {
            Ok(self.search_term.clone())
        }
    }
}

/// A catalog whose every call fails.
pub struct FailingCatalog {
    calls: Mutex<usize>,
}

impl FailingCatalog {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl CatalogStore for FailingCatalog {
    fn name(&self) -> &str {
        "failing"
    }

    async fn query(&self, _query: CatalogQuery) -> Result<Vec<CatalogItem>, CatalogError> {
        *self.calls.lock().unwrap() += 1;
        Err(CatalogError::Unavailable("connection refused".into()))
    }

    async fn count(&self) -> Result<usize, CatalogError> {
        Err(CatalogError::Unavailable("connection refused".into()))
    }
}

fn item(id: i64, name: &str, cat1: &str, cat2: &str) -> CatalogItem {
    CatalogItem {
        id,
        name: name.into(),
        category_1: Some(cat1.into()),
        category_2: Some(cat2.into()),
        available: true,
        ..CatalogItem::default()
    }
}

/// A small catalog covering every routing branch.
pub fn sample_items() -> Vec<CatalogItem> {
    vec![
        CatalogItem {
            housing_color: Some("White".into()),
            ingress_protection: Some("IP44".into()),
            cct: Some(3000),
            price: Some(79.0),
            operating_mode: Some("Phase-cut dimmable".into()),
            lumen: Some(850.0),
            wattage: Some(9.0),
            ..item(1, "Mezy Wall", "Indoor", "Surface wall luminaires")
        },
        CatalogItem {
            housing_color: Some("Black".into()),
            ingress_protection: Some("IP44".into()),
            cct: Some(3000),
            price: Some(89.0),
            ..item(2, "Mezy Wall Black", "Indoor", "Surface wall luminaires")
        },
        CatalogItem {
            housing_color: Some("White".into()),
            ingress_protection: Some("IP65/IP44".into()),
            cct: Some(4000),
            price: Some(119.0),
            ..item(3, "Orbit Wall", "Indoor", "Surface wall luminaires")
        },
        CatalogItem {
            housing_color: Some("White".into()),
            ingress_protection: Some("IP20".into()),
            cct_switch: Some("2700/3000/4000".into()),
            price: Some(129.0),
            ..item(4, "Nova Ceiling", "Indoor", "Surface ceiling luminares")
        },
        CatalogItem {
            housing_color: Some("Black".into()),
            ingress_protection: Some("IP20".into()),
            cct: Some(2700),
            price: Some(249.0),
            operating_mode: Some("DALI dimmable".into()),
            short_description: Some("Pendelleuchte aus Glas".into()),
            ..item(5, "Salsa Lid", "Indoor", "Pendant lamps")
        },
        CatalogItem {
            ingress_protection: Some("IP65".into()),
            cct: Some(3000),
            price: Some(59.0),
            ..item(6, "Spike One", "Outdoor", "Spike lights")
        },
        CatalogItem {
            group_name: Some("LED Strip".into()),
            short_description: Some("LED strip 5m".into()),
            cct: Some(3000),
            price: Some(39.0),
            operating_mode: Some("PWM dimmable".into()),
            ..item(7, "Flex Strip 24V", "Components", "LED strips single Colour")
        },
        CatalogItem {
            group_name: Some("LED Strip".into()),
            price: Some(5.0),
            ..item(8, "Flex Strip Connector", "Components", "Electrical components")
        },
        CatalogItem {
            cct_switch: Some("1800-3000".into()),
            price: Some(99.0),
            ..item(9, "Dim to Warm Downlight", "Indoor", "Recessed ceiling luminaires")
        },
        CatalogItem {
            price: Some(69.0),
            ..item(10, "Track Spot One", "Indoor", "1 circuit track system luminaires")
        },
        CatalogItem {
            price: Some(79.0),
            ..item(11, "Track Spot Three", "Indoor", "3 circuit track system luminaires")
        },
        CatalogItem {
            ingress_protection: Some("IP67".into()),
            price: Some(25.0),
            ..item(12, "Driver 20W", "Components", "Transformers")
        },
        CatalogItem {
            housing_color: Some("White".into()),
            ingress_protection: Some("IP44".into()),
            cct: Some(2700),
            price: Some(65.0),
            ..item(13, "Bath Wall", "Indoor", "Surface wall luminaires")
        },
    ]
}

pub fn sample_catalog() -> InMemoryCatalog {
    InMemoryCatalog::with_items(sample_items())
}
