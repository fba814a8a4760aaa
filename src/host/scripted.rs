//! Scripted in-memory host for tests.
//!
//! Records every call and answers `window.client` methods from canned
//! replies keyed by method name. The capacity script is keyed as
//! `cellsCapacity`.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::PageId;

use super::ExecutionHost;
use super::script::{CALL_CLIENT, CELLS_CAPACITY};

/// Reply key for the capacity script.
pub(crate) const CELLS_CAPACITY_KEY: &str = "cellsCapacity";

/// One recorded host call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HostCall {
    Open(PageId),
    Close(PageId),
    Navigate(PageId, String),
    Trigger(PageId, String),
    Evaluate {
        page: PageId,
        method: String,
        args: Value,
    },
}

#[derive(Default)]
pub(crate) struct ScriptedHost {
    next_page: AtomicU32,
    open: Mutex<FxHashSet<PageId>>,
    calls: Mutex<Vec<HostCall>>,
    replies: Mutex<FxHashMap<String, std::result::Result<Value, String>>>,
    fail_trigger: AtomicBool,
    evaluate_delay: Mutex<Option<Duration>>,
    method_delays: Mutex<FxHashMap<String, Duration>>,
}

impl ScriptedHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answers `method` with `value`.
    pub(crate) fn reply(&self, method: &str, value: Value) {
        self.replies.lock().insert(method.to_string(), Ok(value));
    }

    /// Rejects `method` with `message`.
    pub(crate) fn reject(&self, method: &str, message: &str) {
        self.replies
            .lock()
            .insert(method.to_string(), Err(message.to_string()));
    }

    /// Makes every control click fail until reset.
    pub(crate) fn fail_trigger(&self, fail: bool) {
        self.fail_trigger.store(fail, Ordering::SeqCst);
    }

    /// Delays every evaluation.
    pub(crate) fn delay_evaluate(&self, delay: Duration) {
        *self.evaluate_delay.lock() = Some(delay);
    }

    /// Delays evaluations of `method` only.
    pub(crate) fn delay_method(&self, method: &str, delay: Duration) {
        self.method_delays.lock().insert(method.to_string(), delay);
    }

    pub(crate) fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    pub(crate) fn open_pages(&self) -> Vec<PageId> {
        let mut pages: Vec<_> = self.open.lock().iter().copied().collect();
        pages.sort_by_key(PageId::as_u32);
        pages
    }

    /// Arguments of the last evaluation of `method`.
    pub(crate) fn last_args(&self, method: &str) -> Option<Value> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            HostCall::Evaluate {
                method: called,
                args,
                ..
            } if called == method => Some(args.clone()),
            _ => None,
        })
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().push(call);
    }

    fn ensure_open(&self, page: PageId) -> Result<()> {
        if self.open.lock().contains(&page) {
            Ok(())
        } else {
            Err(Error::protocol(format!("no such page: {page}")))
        }
    }
}

#[async_trait]
impl ExecutionHost for ScriptedHost {
    async fn open_page(&self) -> Result<PageId> {
        let page = PageId::new(self.next_page.fetch_add(1, Ordering::SeqCst) + 1);
        self.open.lock().insert(page);
        self.record(HostCall::Open(page));
        Ok(page)
    }

    async fn close_page(&self, page: PageId) -> Result<()> {
        self.record(HostCall::Close(page));
        if self.open.lock().remove(&page) {
            Ok(())
        } else {
            Err(Error::protocol(format!("no such page: {page}")))
        }
    }

    async fn navigate(&self, page: PageId, url: &str) -> Result<()> {
        self.ensure_open(page)?;
        self.record(HostCall::Navigate(page, url.to_string()));
        Ok(())
    }

    async fn trigger_control(&self, page: PageId, control: &str) -> Result<()> {
        self.ensure_open(page)?;
        self.record(HostCall::Trigger(page, control.to_string()));
        if self.fail_trigger.load(Ordering::SeqCst) {
            return Err(Error::protocol(format!("no control named {control}")));
        }
        Ok(())
    }

    async fn evaluate(&self, page: PageId, function: &str, args: Value) -> Result<Value> {
        self.ensure_open(page)?;

        let (method, args) = match function {
            CALL_CLIENT => (
                args["method"].as_str().unwrap_or_default().to_string(),
                args["args"].clone(),
            ),
            CELLS_CAPACITY => (CELLS_CAPACITY_KEY.to_string(), args),
            other => (other.to_string(), args),
        };
        self.record(HostCall::Evaluate {
            page,
            method: method.clone(),
            args,
        });

        let delay = self
            .method_delays
            .lock()
            .get(&method)
            .copied()
            .or(*self.evaluate_delay.lock());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
            // A page closed mid-call loses its answer.
            self.ensure_open(page)?;
        }

        match self.replies.lock().get(&method) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(Error::remote(message.clone())),
            None => Ok(Value::Null),
        }
    }
}
