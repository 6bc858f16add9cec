//! Recording SDK double for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{LnfiSdk, SdkError, SdkMethod};

pub struct MockSdk {
    config: Value,
    config_delay: Duration,
    config_failures: AtomicUsize,
    config_calls: AtomicUsize,
    replies: HashMap<SdkMethod, Result<Value, SdkError>>,
    calls: Mutex<Vec<(SdkMethod, Vec<Value>)>>,
}

impl MockSdk {
    pub fn new() -> Self {
        Self {
            config: json!({}),
            config_delay: Duration::ZERO,
            config_failures: AtomicUsize::new(0),
            config_calls: AtomicUsize::new(0),
            replies: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_robots(market: &str, token: &str) -> Self {
        Self::new().config(json!({
            "MARKET_ROBOT_ADDR": market,
            "TOKEN_ROBOT_ADDR": token,
        }))
    }

    pub fn config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn config_delay(mut self, delay: Duration) -> Self {
        self.config_delay = delay;
        self
    }

    pub fn fail_config_times(self, n: usize) -> Self {
        self.config_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn reply(mut self, method: SdkMethod, reply: Result<Value, SdkError>) -> Self {
        self.replies.insert(method, reply);
        self
    }

    pub fn config_calls(&self) -> usize {
        self.config_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<(SdkMethod, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<(SdkMethod, Vec<Value>)> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LnfiSdk for MockSdk {
    async fn get_config(&self) -> Result<Value, SdkError> {
        self.config_calls.fetch_add(1, Ordering::SeqCst);
        if !self.config_delay.is_zero() {
            tokio::time::sleep(self.config_delay).await;
        }
        let failing = self
            .config_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SdkError::Transport("relay unreachable".into()));
        }
        Ok(self.config.clone())
    }

    async fn call(&self, method: SdkMethod, args: Vec<Value>) -> Result<Value, SdkError> {
        self.calls.lock().unwrap().push((method, args));
        self.replies
            .get(&method)
            .cloned()
            .unwrap_or_else(|| Ok(json!({"ok": true})))
    }
}
