//! Context relevance filter.
//!
//! Decides which of the last few user turns still bear on the new query.
//! The judgment is delegated to the reasoning provider with a prompt that
//! may only answer with 1-based indices or "keine". Any failure degrades to
//! the single most recent turn.

use luxroute_core::message::Message;
use luxroute_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const RELEVANCE_PROMPT: &str = "Du entscheidest, welche früheren Nachrichten eines Kunden \
für seine neue Frage zu Leuchten noch relevant sind. Antworte ausschließlich mit den \
Nummern der relevanten Nachrichten, durch Kommas getrennt (z.B. \"1,3\"), oder mit \
\"keine\", wenn keine relevant ist. Keine weiteren Wörter.";

/// Filters a conversation window down to the turns relevant to a new query.
pub struct ContextFilter {
    provider: Arc<dyn Provider>,
    model: String,
    max_tokens: u32,
    timeout: Duration,
    window: usize,
}

impl ContextFilter {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: 20,
            timeout: Duration::from_secs(20),
            window: 3,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// How many of the most recent turns are considered (at most 3).
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.clamp(1, 3);
        self
    }

    /// The relevant turns among the last `window` of `turns`, oldest first.
    pub async fn filter(&self, query: &str, turns: &[String]) -> Vec<String> {
        let start = turns.len().saturating_sub(self.window);
        let recent = &turns[start..];
        let Some(last) = recent.last() else {
            return Vec::new();
        };

        let listing = recent
            .iter()
            .enumerate()
            .map(|(i, turn)| format!("{}. {turn}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");
        let request = ProviderRequest::new(
            &self.model,
            vec![
                Message::system(RELEVANCE_PROMPT),
                Message::user(format!(
                    "Frühere Nachrichten:\n{listing}\n\nNeue Frage: {query}"
                )),
            ],
        )
        .with_temperature(0.0)
        .with_max_tokens(self.max_tokens);

        let reply = match tokio::time::timeout(self.timeout, self.provider.complete(request)).await
        {
            Ok(Ok(response)) => response.message.content,
            Ok(Err(e)) => {
                warn!(error = %e, "Context relevance call failed, keeping last turn");
                return vec![last.clone()];
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "Context relevance call timed out, keeping last turn"
                );
                return vec![last.clone()];
            }
        };

        match parse_indices(&reply, recent.len()) {
            Some(indices) => {
                debug!(?indices, "Relevant context turns");
                indices.into_iter().map(|i| recent[i - 1].clone()).collect()
            }
            None => {
                warn!(reply = %reply, "Unusable relevance answer, keeping last turn");
                vec![last.clone()]
            }
        }
    }
}

/// Parse a relevance answer into sorted, deduplicated 1-based indices.
///
/// Out-of-range and non-numeric tokens are dropped. `Some(vec![])` means
/// the model answered "none"; `None` means the answer held nothing usable.
pub fn parse_indices(answer: &str, count: usize) -> Option<Vec<usize>> {
    let answer = answer.trim().to_lowercase();
    let mut indices = Vec::new();
    let mut saw_number = false;
    for token in answer
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(|t| t.trim_matches(|c: char| !c.is_ascii_alphanumeric()))
        .filter(|t| !t.is_empty())
    {
        if let Ok(index) = token.parse::<usize>() {
            saw_number = true;
            if (1..=count).contains(&index) && !indices.contains(&index) {
                indices.push(index);
            }
        }
    }

    if saw_number {
        indices.sort_unstable();
        return Some(indices);
    }
    let none = ["keine", "keiner", "none", "nichts"]
        .iter()
        .any(|word| answer.split_whitespace().any(|w| w.trim_matches('.') == *word));
    none.then(Vec::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedProvider;

    fn turns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_lists_and_none() {
        assert_eq!(parse_indices("1,3", 3), Some(vec![1, 3]));
        assert_eq!(parse_indices(" 3; 1 ,3 ", 3), Some(vec![1, 3]));
        assert_eq!(parse_indices("2, 7, 0", 3), Some(vec![2]));
        assert_eq!(parse_indices("Keine.", 3), Some(vec![]));
        assert_eq!(parse_indices("none", 2), Some(vec![]));
        assert_eq!(parse_indices("vielleicht", 3), None);
        assert_eq!(parse_indices("", 3), None);
    }

    #[tokio::test]
    async fn keeps_indicated_turns_in_order() {
        let provider = Arc::new(ScriptedProvider::replying(&["3, 1"]));
        let filter = ContextFilter::new(provider.clone(), "m");
        let relevant = filter
            .filter("und in schwarz?", &turns(&["Wandleuchte", "Lieferzeit?", "3000K bitte"]))
            .await;
        assert_eq!(relevant, turns(&["Wandleuchte", "3000K bitte"]));
        assert_eq!(provider.calls(), 1);
        assert_eq!(provider.requests()[0].max_tokens, Some(20));
    }

    #[tokio::test]
    async fn only_last_three_turns_are_considered() {
        let provider = Arc::new(ScriptedProvider::replying(&["1"]));
        let filter = ContextFilter::new(provider.clone(), "m");
        let relevant = filter
            .filter("x", &turns(&["alt", "eins", "zwei", "drei"]))
            .await;
        assert_eq!(relevant, turns(&["eins"]));
        let prompt = &provider.requests()[0].messages[1].content;
        assert!(!prompt.contains("alt"));
    }

    #[tokio::test]
    async fn none_answer_drops_everything() {
        let provider = Arc::new(ScriptedProvider::replying(&["keine"]));
        let filter = ContextFilter::new(provider, "m");
        assert!(filter.filter("x", &turns(&["a", "b"])).await.is_empty());
    }

    #[tokio::test]
    async fn failure_keeps_only_last_turn() {
        let filter = ContextFilter::new(Arc::new(ScriptedProvider::failing()), "m");
        let relevant = filter.filter("x", &turns(&["a", "b", "c"])).await;
        assert_eq!(relevant, turns(&["c"]));
    }

    #[tokio::test]
    async fn garbage_keeps_only_last_turn() {
        let provider = Arc::new(ScriptedProvider::replying(&["Die erste ist relevant"]));
        let filter = ContextFilter::new(provider, "m");
        assert_eq!(filter.filter("x", &turns(&["a", "b"])).await, turns(&["b"]));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_keeps_only_last_turn() {
        let filter = ContextFilter::new(Arc::new(ScriptedProvider::hanging()), "m")
            .with_timeout(Duration::from_secs(2));
        assert_eq!(filter.filter("x", &turns(&["a", "b"])).await, turns(&["b"]));
    }

    #[tokio::test]
    async fn empty_window_needs_no_call() {
        let provider = Arc::new(ScriptedProvider::failing());
        let filter = ContextFilter::new(provider.clone(), "m");
        assert!(filter.filter("x", &[]).await.is_empty());
        assert_eq!(provider.calls(), 0);
    }
}
