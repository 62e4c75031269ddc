//! Lifecycle hooks for search and flatten calls
//!
//! The client reports one [`SpanEvent`] per finished span. The default sink
//! discards them; plug in a [`SearchHooks`] implementation to forward them to
//! a log or tracing backend.

use crate::error::{Error, Result};
use std::time::{Duration, Instant};

/// Operations that produce a span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanName {
    GetMany,
    GetOne,
    Search,
    Flatten,
}

impl SpanName {
    pub const fn as_str(self) -> &'static str {
        match self {
            SpanName::GetMany => "get_many",
            SpanName::GetOne => "get_one",
            SpanName::Search => "search",
            SpanName::Flatten => "flatten",
        }
    }
}

/// Outcome classification of a span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStatus {
    Ok,
    NotFound,
    OutOfRange,
    ResourceExhausted,
    Internal,
    Unknown,
}

impl SpanStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            SpanStatus::Ok => "ok",
            SpanStatus::NotFound => "not_found",
            SpanStatus::OutOfRange => "out_of_range",
            SpanStatus::ResourceExhausted => "resource_exhausted",
            SpanStatus::Internal => "internal",
            SpanStatus::Unknown => "unknown",
        }
    }
}

impl From<&Error> for SpanStatus {
    fn from(err: &Error) -> Self {
        match err {
            Error::NoEntries => SpanStatus::NotFound,
            Error::MoreThanOneEntry => SpanStatus::OutOfRange,
            Error::TooManyRequests => SpanStatus::ResourceExhausted,
            Error::StructuralMismatch(_)
            | Error::Metadata(_)
            | Error::Decode(_)
            | Error::InvalidUrl(_) => SpanStatus::Internal,
            _ => SpanStatus::Unknown,
        }
    }
}

/// A finished span
#[derive(Debug, Clone)]
pub struct SpanEvent {
    pub span: SpanName,
    pub status: SpanStatus,
    /// Error message when the span failed
    pub message: Option<String>,
    pub elapsed: Duration,
    /// e.g. `http.host`, `http.status_code`
    pub attributes: Vec<(&'static str, String)>,
}

impl SpanEvent {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Sink for span events
pub trait SearchHooks: Send + Sync {
    fn record(&self, event: &SpanEvent);
}

/// Discards every event
pub struct NoopHooks;

impl SearchHooks for NoopHooks {
    fn record(&self, _event: &SpanEvent) {}
}

/// An open span; reports itself to the hooks when finished
pub(crate) struct Span<'a> {
    hooks: &'a dyn SearchHooks,
    name: SpanName,
    started: Instant,
    attributes: Vec<(&'static str, String)>,
}

impl<'a> Span<'a> {
    pub(crate) fn start(hooks: &'a dyn SearchHooks, name: SpanName) -> Self {
        Span {
            hooks,
            name,
            started: Instant::now(),
            attributes: Vec::new(),
        }
    }

    /// Set an attribute, replacing an earlier value under the same key
    pub(crate) fn attribute(&mut self, key: &'static str, value: impl ToString) {
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub(crate) fn finish<T>(self, result: &Result<T>) {
        let (status, message) = match result {
            Ok(_) => (SpanStatus::Ok, None),
            Err(err) => (SpanStatus::from(err), Some(err.to_string())),
        };

        self.hooks.record(&SpanEvent {
            span: self.name,
            status,
            message,
            elapsed: self.started.elapsed(),
            attributes: self.attributes,
        });
    }
}
