//! Rolling Logger
//!
//! A `tracing_subscriber` layer that keeps the most recent log lines in a
//! bounded ring buffer and forwards each line to a sink (the browser
//! console in the app, a `Vec` in tests).

use std::collections::VecDeque;
use std::fmt::{self, Write};
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::Layer;

/// Destination for formatted lines
pub trait LogSink: Send + Sync + 'static {
    fn write(&self, level: Level, line: &str);
}

impl<F> LogSink for F
where
    F: Fn(Level, &str) + Send + Sync + 'static,
{
    fn write(&self, level: Level, line: &str) {
        self(level, line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5} {}: {}", self.level, self.target, self.message)
    }
}

/// Shared ring buffer; the oldest line is evicted once full
#[derive(Debug, Clone)]
pub struct LogBuffer {
    lines: Arc<Mutex<VecDeque<LogLine>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn push(&self, line: LogLine) {
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Copy of the buffered lines, oldest first
    pub fn snapshot(&self) -> Vec<LogLine> {
        let lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct RollingLayer<K> {
    buffer: LogBuffer,
    sink: K,
}

impl<K: LogSink> RollingLayer<K> {
    pub fn new(buffer: LogBuffer, sink: K) -> Self {
        Self { buffer, sink }
    }
}

/// Collects the message and the remaining fields of an event
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }
}

impl<S, K> Layer<S> for RollingLayer<K>
where
    S: Subscriber,
    K: LogSink,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let mut message = visitor.message;
        if !visitor.fields.is_empty() {
            let _ = write!(message, " {{{} }}", visitor.fields);
        }
        let line = LogLine {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
        };
        self.sink.write(line.level, &line.to_string());
        self.buffer.push(line);
    }
}

/// Install the layer as the global subscriber. Fails (without panicking)
/// if a global subscriber is already set.
pub fn init<K: LogSink>(capacity: usize, max_level: Level, sink: K) -> Result<LogBuffer, TryInitError> {
    let buffer = LogBuffer::new(capacity);
    tracing_subscriber::registry()
        .with(RollingLayer::new(buffer.clone(), sink).with_filter(LevelFilter::from_level(max_level)))
        .try_init()?;
    Ok(buffer)
}
