//! Mock speech engine for testing
//!
//! Provides a configurable engine that can simulate failures, retries, and
//! successful responses without touching the network.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::engine::{InputFormat, SpeechEngine};
use crate::error::{Result, TtsError};

enum Response {
    /// Return the unit's own bytes
    Echo,
    /// Return the same bytes for every unit
    Fixed(Vec<u8>),
}

/// A mock engine for testing retry and progress behavior
pub struct MockEngine {
    /// Number of calls to fail before succeeding (0 = always succeed)
    fail_count: usize,
    /// Units that fail on every attempt
    failing_units: Vec<String>,
    /// Current call count
    call_count: AtomicUsize,
    /// Every unit received, in call order
    calls: Mutex<Vec<String>>,
    response: Response,
    format: InputFormat,
    name: &'static str,
}

impl MockEngine {
    fn with_response(response: Response, fail_count: usize) -> Self {
        Self {
            fail_count,
            failing_units: Vec::new(),
            call_count: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            response,
            format: InputFormat::Ssml,
            name: "mock",
        }
    }

    /// Create an engine that returns each unit's bytes as its audio
    pub fn echo() -> Self {
        Self::with_response(Response::Echo, 0)
    }

    /// Create an engine that always returns `audio`
    pub fn always_succeeds(audio: &[u8]) -> Self {
        Self::with_response(Response::Fixed(audio.to_vec()), 0)
    }

    /// Create an engine that fails `n` calls, then returns `audio`
    pub fn fails_then_succeeds(n: usize, audio: &[u8]) -> Self {
        Self::with_response(Response::Fixed(audio.to_vec()), n)
    }

    /// Create an engine that always fails
    pub fn always_fails() -> Self {
        Self::with_response(Response::Echo, usize::MAX)
    }

    /// Fail every attempt whose unit equals `unit`
    pub fn failing_on(mut self, unit: &str) -> Self {
        self.failing_units.push(unit.to_string());
        self
    }

    /// Report a different input format
    pub fn with_format(mut self, format: InputFormat) -> Self {
        self.format = format;
        self
    }

    /// Get the number of times synthesize_one() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get every unit received so far
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl SpeechEngine for MockEngine {
    async fn synthesize_one(&self, unit: &str) -> Result<Vec<u8>> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(unit.to_string());

        if call_num < self.fail_count || self.failing_units.iter().any(|u| u == unit) {
            return Err(TtsError::Api {
                message: "mock failure".to_string(),
                status_code: Some(500),
            });
        }

        Ok(match &self.response {
            Response::Echo => unit.as_bytes().to_vec(),
            Response::Fixed(audio) => audio.clone(),
        })
    }

    fn input_format(&self) -> InputFormat {
        self.format
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
