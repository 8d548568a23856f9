//! Shared agent plumbing.
//!
//! `BaseAgent` owns the provider and config source and performs the single
//! model call every agent needs. The free functions cover what each agent
//! does with the raw text afterwards: pull JSON out of it, check field
//! shapes, retry with backoff, and time the work.

use rand::Rng;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use super::errors::AgentError;
use crate::domain::foundation::ValidationError;
use crate::ports::{AIProvider, ApiConfig, ApiConfigSource, CompletionRequest, MessageRole, RequestMetadata};

/// Model access shared by all agents.
#[derive(Clone)]
pub struct BaseAgent {
    name: &'static str,
    provider: Arc<dyn AIProvider>,
    api_source: Arc<dyn ApiConfigSource>,
    timeout: Option<Duration>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl BaseAgent {
    pub fn new(
        name: &'static str,
        provider: Arc<dyn AIProvider>,
        api_source: Arc<dyn ApiConfigSource>,
    ) -> Self {
        Self {
            name,
            provider,
            api_source,
            timeout: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Per-call timeout forwarded to the transport.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Sends one prompt to the model and returns the raw text.
    ///
    /// Uses `api` when given, otherwise the configured source. Fails with
    /// `AgentError::Configuration` before any network call when no key is set.
    pub async fn invoke(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        api: Option<&ApiConfig>,
    ) -> Result<String, AgentError> {
        let api = match api {
            Some(api) => api.clone(),
            None => self.api_source.api_config(),
        };

        if !api.has_credentials() {
            tracing::warn!(agent = self.name, provider = %api.name, "no API key configured");
            return Err(AgentError::Configuration {
                agent: self.name.to_string(),
                provider: api.name,
            });
        }

        let mut request = CompletionRequest::new(api, RequestMetadata::for_agent(self.name))
            .with_message(MessageRole::User, prompt);
        if let Some(system) = system_prompt {
            request = request.with_system_prompt(system);
        }
        if let Some(timeout) = self.timeout {
            request = request.with_timeout(timeout);
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let trace_id = request.metadata.trace_id.clone();
        let response = self.provider.complete(request).await.map_err(|e| {
            tracing::warn!(agent = self.name, trace_id = %trace_id, error = %e, "model call failed");
            AgentError::execution(self.name, e)
        })?;

        tracing::debug!(
            agent = self.name,
            trace_id = %trace_id,
            tokens = response.usage.total_tokens,
            "model call succeeded"
        );

        Ok(response.content)
    }

    /// Single-prompt variant of [`invoke`](Self::invoke).
    pub async fn generate_response(&self, prompt: &str) -> Result<String, AgentError> {
        self.invoke(prompt, None, None).await
    }
}

/// Pulls the JSON payload out of a model reply.
///
/// Prefers a fenced code block, then the first balanced object or array,
/// else returns the trimmed text unchanged.
pub fn extract_json(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Some(json) = extract_from_code_block(trimmed) {
        return json;
    }

    let obj_start = trimmed.find('{');
    let arr_start = trimmed.find('[');

    let (start, open, close) = match (obj_start, arr_start) {
        (Some(o), Some(a)) if a < o => (a, '[', ']'),
        (Some(o), _) => (o, '{', '}'),
        (None, Some(a)) => (a, '[', ']'),
        (None, None) => return trimmed.to_string(),
    };

    extract_balanced_json(trimmed, start, open, close).unwrap_or_else(|| trimmed.to_string())
}

fn extract_from_code_block(s: &str) -> Option<String> {
    let patterns = ["```json\n", "```json\r\n", "```JSON\n", "```\n", "```\r\n"];

    for pattern in patterns {
        if let Some(start) = s.find(pattern) {
            let json_start = start + pattern.len();
            if let Some(end) = s[json_start..].find("```") {
                return Some(s[json_start..json_start + end].trim().to_string());
            }
        }
    }
    None
}

fn extract_balanced_json(s: &str, start: usize, open: char, close: char) -> Option<String> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(s[start..start + i + c.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses a model reply into `T`, returning `fallback` on any failure.
pub fn parse_json_response<T: DeserializeOwned>(raw: &str, fallback: T) -> T {
    match serde_json::from_str(&extract_json(raw)) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "falling back after unparseable response");
            fallback
        }
    }
}

/// Strict variant of [`parse_json_response`] returning a JSON value.
pub fn try_parse_json(raw: &str) -> Result<Value, AgentError> {
    serde_json::from_str(&extract_json(raw)).map_err(|e| AgentError::Parse(e.to_string()))
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, ValidationError> {
    value
        .as_object()
        .ok_or_else(|| ValidationError::wrong_type("response", "an object"))
}

/// Fails on the first field that is absent or null.
pub fn require_fields(value: &Value, fields: &[&str]) -> Result<(), ValidationError> {
    let object = as_object(value)?;
    for field in fields {
        match object.get(*field) {
            None | Some(Value::Null) => return Err(ValidationError::missing_field(*field)),
            Some(_) => {}
        }
    }
    Ok(())
}

pub fn require_array<'a>(value: &'a Value, field: &str) -> Result<&'a Vec<Value>, ValidationError> {
    match as_object(value)?.get(field) {
        None | Some(Value::Null) => Err(ValidationError::missing_field(field)),
        Some(v) => v
            .as_array()
            .ok_or_else(|| ValidationError::wrong_type(field, "an array")),
    }
}

pub fn require_number_in_range(
    value: &Value,
    field: &str,
    min: f64,
    max: f64,
) -> Result<f64, ValidationError> {
    let number = match as_object(value)?.get(field) {
        None | Some(Value::Null) => return Err(ValidationError::missing_field(field)),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| ValidationError::wrong_type(field, "a number"))?,
    };

    if number < min || number > max {
        return Err(ValidationError::out_of_range(field, min, max, number));
    }
    Ok(number)
}

pub fn require_string<'a>(value: &'a Value, field: &str) -> Result<&'a str, ValidationError> {
    match as_object(value)?.get(field) {
        None | Some(Value::Null) => Err(ValidationError::missing_field(field)),
        Some(v) => v
            .as_str()
            .ok_or_else(|| ValidationError::wrong_type(field, "a string")),
    }
}

pub fn require_boolean(value: &Value, field: &str) -> Result<bool, ValidationError> {
    match as_object(value)?.get(field) {
        None | Some(Value::Null) => Err(ValidationError::missing_field(field)),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| ValidationError::wrong_type(field, "a boolean")),
    }
}

/// Runs `operation` up to `max_retries` times (at least once).
///
/// After a failed attempt `n` (zero-based) it sleeps
/// `base_delay * 2^n` plus a uniform jitter in `[0, base_delay]`.
/// Returns the last error once attempts are exhausted.
pub async fn retry_with_backoff<T, E, F, Fut>(
    mut operation: F,
    max_retries: u32,
    base_delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = max_retries.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt + 1 >= attempts => {
                tracing::warn!(attempts, error = %e, "giving up after final attempt");
                return Err(e);
            }
            Err(e) => {
                let delay = backoff_delay(base_delay, attempt);
                tracing::debug!(
                    attempt = attempt + 1,
                    attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "attempt failed, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

fn backoff_delay(base_delay: Duration, attempt: u32) -> Duration {
    let base_ms = base_delay.as_millis().min(u64::MAX as u128) as u64;
    let exponential = base_ms.saturating_mul(1u64 << attempt.min(20));
    let jitter = rand::thread_rng().gen_range(0..=base_ms);
    Duration::from_millis(exponential.saturating_add(jitter))
}

/// Output of [`measure_execution_time`].
#[derive(Debug)]
pub struct Timed<T> {
    pub result: T,
    pub execution_time: Duration,
}

/// Awaits `operation`, logging start and finish, and records how long it took.
pub async fn measure_execution_time<T, E, Fut>(
    operation_name: &str,
    operation: Fut,
) -> Timed<Result<T, E>>
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    tracing::debug!(operation = operation_name, "starting");
    let started = Instant::now();
    let result = operation.await;
    let execution_time = started.elapsed();

    match &result {
        Ok(_) => tracing::info!(
            operation = operation_name,
            elapsed_ms = execution_time.as_millis() as u64,
            "finished"
        ),
        Err(e) => tracing::warn!(
            operation = operation_name,
            elapsed_ms = execution_time.as_millis() as u64,
            error = %e,
            "failed"
        ),
    }

    Timed {
        result,
        execution_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockAIProvider, MockError, StaticApiConfigSource};
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn agent(provider: MockAIProvider, api: ApiConfig) -> BaseAgent {
        BaseAgent::new(
            "TestAgent",
            Arc::new(provider),
            Arc::new(StaticApiConfigSource::new(api)),
        )
    }

    fn keyed_api() -> ApiConfig {
        ApiConfig::new("test", "http://localhost", "test-model").with_api_key("key")
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        ok: bool,
    }

    // ───────────────────────────────────────────────────────────────
    // invoke
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn invoke_without_key_fails_before_calling_provider() {
        let provider = MockAIProvider::new().with_response("unused");
        let agent = agent(provider.clone(), ApiConfig::new("openai", "http://x", "m"));

        let err = agent.invoke("hi", None, None).await.unwrap_err();

        assert!(matches!(err, AgentError::Configuration { ref provider, .. } if provider == "openai"));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn invoke_prefers_explicit_api_config() {
        let provider = MockAIProvider::new().with_response("hello");
        let agent = agent(provider.clone(), ApiConfig::new("none", "http://x", "m"));

        let text = agent
            .invoke("hi", Some("system text"), Some(&keyed_api()))
            .await
            .unwrap();

        assert_eq!(text, "hello");
        let calls = provider.get_calls();
        assert_eq!(calls[0].system_prompt.as_deref(), Some("system text"));
        assert_eq!(calls[0].metadata.agent, "TestAgent");
    }

    #[tokio::test]
    async fn invoke_wraps_transport_errors() {
        let provider = MockAIProvider::new().with_error(MockError::Network {
            message: "reset".into(),
        });
        let agent = agent(provider, keyed_api());

        let err = agent.generate_response("hi").await.unwrap_err();

        assert!(matches!(err, AgentError::Execution { ref agent, .. } if agent == "TestAgent"));
    }

    #[tokio::test]
    async fn invoke_forwards_timeout() {
        let provider = MockAIProvider::new();
        let agent = agent(provider.clone(), keyed_api()).with_timeout(Duration::from_millis(250));

        agent.generate_response("hi").await.unwrap();

        assert_eq!(provider.get_calls()[0].timeout, Some(Duration::from_millis(250)));
    }

    // ───────────────────────────────────────────────────────────────
    // JSON extraction
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn extracts_from_fenced_block() {
        let raw = "Here you go:\n```json\n{\"ok\": true}\n```\nThanks";
        assert_eq!(extract_json(raw), "{\"ok\": true}");
    }

    #[test]
    fn extracts_first_balanced_object_from_prose() {
        let raw = "Sure! {\"ok\": true, \"note\": \"a } inside\"} trailing {\"x\": 1}";
        assert_eq!(extract_json(raw), "{\"ok\": true, \"note\": \"a } inside\"}");
    }

    #[test]
    fn extracts_array_when_it_comes_first() {
        assert_eq!(extract_json("list: [1, {\"a\": 2}] end"), "[1, {\"a\": 2}]");
    }

    #[test]
    fn handles_multibyte_text_before_json() {
        assert_eq!(extract_json("Voilà → {\"ok\": true}"), "{\"ok\": true}");
    }

    #[test]
    fn parse_json_response_returns_fallback_on_garbage() {
        let parsed = parse_json_response("not json at all", Probe { ok: false });
        assert_eq!(parsed, Probe { ok: false });
    }

    #[test]
    fn try_parse_json_reports_parse_error() {
        assert!(matches!(try_parse_json("nope"), Err(AgentError::Parse(_))));
        assert_eq!(try_parse_json("```\n[1]\n```").unwrap(), json!([1]));
    }

    proptest! {
        #[test]
        fn fenced_and_bare_json_parse_identically(ok in any::<bool>(), text in "[a-zA-Z0-9 ]{0,20}") {
            let bare = json!({"ok": ok, "text": text}).to_string();
            let fenced = format!("```json\n{}\n```", bare);

            let from_bare: Value = parse_json_response(&bare, Value::Null);
            let from_fenced: Value = parse_json_response(&fenced, Value::Null);
            prop_assert_eq!(from_bare, from_fenced);
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Validators
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn require_fields_names_missing_field() {
        let value = json!({"a": 1, "b": null});
        assert!(require_fields(&value, &["a"]).is_ok());
        assert_eq!(
            require_fields(&value, &["a", "b"]).unwrap_err(),
            ValidationError::missing_field("b")
        );
    }

    #[test]
    fn typed_validators_check_shape() {
        let value = json!({"list": [1], "n": 0.4, "s": "x", "flag": true, "wrong": "1"});

        assert_eq!(require_array(&value, "list").unwrap().len(), 1);
        assert_eq!(require_number_in_range(&value, "n", 0.0, 1.0).unwrap(), 0.4);
        assert_eq!(require_string(&value, "s").unwrap(), "x");
        assert!(require_boolean(&value, "flag").unwrap());

        assert_eq!(
            require_array(&value, "wrong").unwrap_err(),
            ValidationError::wrong_type("wrong", "an array")
        );
        assert!(matches!(
            require_number_in_range(&value, "n", 0.5, 1.0),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(require_boolean(&json!([]), "flag").is_err());
    }

    // ───────────────────────────────────────────────────────────────
    // Retry and timing
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn retry_stops_at_first_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<u32, String> = retry_with_backoff(
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 2 { Err(format!("attempt {}", n)) } else { Ok(n) }
            },
            3,
            Duration::ZERO,
        )
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retry_returns_last_error() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<(), String> = retry_with_backoff(
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Err(format!("attempt {}", n))
            },
            3,
            Duration::ZERO,
        )
        .await;

        assert_eq!(result, Err("attempt 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_makes_at_least_one_attempt() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let _: Result<(), String> = retry_with_backoff(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("no".to_string())
            },
            0,
            Duration::ZERO,
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backoff_delay_grows_and_stays_within_jitter() {
        let base = Duration::from_millis(100);
        for attempt in 0..3 {
            let delay = backoff_delay(base, attempt).as_millis() as u64;
            let floor = 100 * (1 << attempt);
            assert!(delay >= floor && delay <= floor + 100);
        }
        assert_eq!(backoff_delay(Duration::ZERO, 5), Duration::ZERO);
    }

    #[tokio::test]
    async fn measure_execution_time_keeps_result() {
        let timed = measure_execution_time("sleepy", async {
            sleep(Duration::from_millis(20)).await;
            Ok::<_, String>(7)
        })
        .await;

        assert_eq!(timed.result, Ok(7));
        assert!(timed.execution_time >= Duration::from_millis(20));
    }
}
