//! Per-call diagnostics
//!
//! Every dispatch reports what it does to a [`DiagnosticsSink`]. The sink is
//! borrowed for one scope ([`with_sink`]), which always closes with an
//! [`TraceKind::End`] entry and a flush, whether the call succeeds, fails or
//! panics.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Start,
    Request,
    Response,
    Error,
    End,
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraceKind::Start => "start",
            TraceKind::Request => "request",
            TraceKind::Response => "response",
            TraceKind::Error => "error",
            TraceKind::End => "end",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    pub operation: String,
    pub kind: TraceKind,
    pub message: String,
}

impl TraceEntry {
    pub fn new(operation: impl Into<String>, kind: TraceKind, message: impl Into<String>) -> Self {
        Self {
            at: OffsetDateTime::now_utc(),
            operation: operation.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = self
            .at
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.at.unix_timestamp().to_string());
        write!(f, "{} {} {} {}", at, self.operation, self.kind, self.message)
    }
}

pub trait DiagnosticsSink {
    fn record(&mut self, entry: TraceEntry);

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Forwards entries to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&mut self, entry: TraceEntry) {
        match entry.kind {
            TraceKind::Error => tracing::warn!(
                operation = %entry.operation,
                kind = %entry.kind,
                "{}",
                entry.message
            ),
            TraceKind::Request | TraceKind::Response => tracing::debug!(
                operation = %entry.operation,
                kind = %entry.kind,
                "{}",
                entry.message
            ),
            TraceKind::Start | TraceKind::End => tracing::trace!(
                operation = %entry.operation,
                kind = %entry.kind,
                "{}",
                entry.message
            ),
        }
    }
}

/// Keeps entries in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Vec<TraceEntry>,
    flushes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn kinds(&self) -> Vec<TraceKind> {
        self.entries.iter().map(|entry| entry.kind).collect()
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Writes one line per entry
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl WriterSink<BufWriter<File>> {
    /// Append to a trace file, creating it if needed
    pub fn append(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticsSink for WriterSink<W> {
    fn record(&mut self, entry: TraceEntry) {
        if let Err(e) = writeln!(self.writer, "{}", entry) {
            tracing::warn!("failed to write trace entry: {}", e);
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

struct Scope<'a, S: DiagnosticsSink + ?Sized> {
    sink: &'a mut S,
    operation: &'a str,
}

impl<S: DiagnosticsSink + ?Sized> Drop for Scope<'_, S> {
    fn drop(&mut self) {
        self.sink
            .record(TraceEntry::new(self.operation, TraceKind::End, ""));
        if let Err(e) = self.sink.flush() {
            tracing::warn!(operation = %self.operation, "failed to flush diagnostics: {}", e);
        }
    }
}

/// Run `f` with `sink` bracketed by start and end entries
///
/// An `Err` result is recorded as an [`TraceKind::Error`] entry before the
/// scope closes.
pub fn with_sink<S, T, E, F>(sink: &mut S, operation: &str, f: F) -> Result<T, E>
where
    S: DiagnosticsSink + ?Sized,
    E: fmt::Display,
    F: FnOnce(&mut S) -> Result<T, E>,
{
    sink.record(TraceEntry::new(operation, TraceKind::Start, ""));
    let scope = Scope { sink, operation };

    let result = f(&mut *scope.sink);
    if let Err(e) = &result {
        scope
            .sink
            .record(TraceEntry::new(operation, TraceKind::Error, e.to_string()));
    }
    result
}
