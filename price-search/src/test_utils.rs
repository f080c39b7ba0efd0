//! Scripted adapters and listing builders shared by unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::time::Instant;

use crate::adapter::SourceAdapter;
use crate::context::SearchContext;
use crate::error::SearchError;
use crate::types::{Currency, ProductListing, Query};

/// What a scripted adapter does on one call.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Return(Vec<ProductListing>),
    Fail(SearchError),
    /// Answer after a delay, honouring the context.
    Slow(Duration, Vec<ProductListing>),
    /// Never answer; only the context can end the call.
    Hang,
    /// Ignore the context entirely and never answer.
    Stuck,
    Panic,
}

/// Adapter that replays `steps`, repeating the last one once exhausted.
pub(crate) struct ScriptedAdapter {
    id: String,
    steps: Vec<Step>,
    calls: AtomicU32,
    call_times: Mutex<Vec<Instant>>,
}

impl ScriptedAdapter {
    pub(crate) fn new(id: &str, steps: Vec<Step>) -> Self {
        assert!(!steps.is_empty(), "scripted adapter needs at least one step");
        Self {
            id: id.to_string(),
            steps,
            calls: AtomicU32::new(0),
            call_times: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn returning(id: &str, listings: Vec<ProductListing>) -> Self {
        Self::new(id, vec![Step::Return(listings)])
    }

    pub(crate) fn failing(id: &str) -> Self {
        Self::new(
            id,
            vec![Step::Fail(SearchError::Http(format!("{id} unavailable")))],
        )
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn call_times(&self) -> Vec<Instant> {
        self.call_times
            .lock()
            .map(|times| times.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SourceAdapter for ScriptedAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch(
        &self,
        _query: &Query,
        ctx: &SearchContext,
    ) -> Result<Vec<ProductListing>, SearchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        if let Ok(mut times) = self.call_times.lock() {
            times.push(Instant::now());
        }
        let step = self.steps[n.min(self.steps.len() - 1)].clone();
        match step {
            Step::Return(listings) => Ok(listings),
            Step::Fail(err) => Err(err),
            Step::Slow(delay, listings) => {
                ctx.guard(&self.id, async move {
                    tokio::time::sleep(delay).await;
                    Ok(listings)
                })
                .await
            }
            Step::Hang => ctx.guard(&self.id, std::future::pending()).await,
            Step::Stuck => std::future::pending().await,
            Step::Panic => panic!("{} exploded", self.id),
        }
    }
}

pub(crate) fn listing(source: &str, title: &str, price: Decimal) -> ProductListing {
    ProductListing::new(
        title,
        price,
        Currency::Ils,
        source,
        format!(
            "https://{}.example/{}",
            source.to_lowercase(),
            title.to_lowercase().replace(' ', "-")
        ),
    )
}
