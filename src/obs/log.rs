//! Leveled logging with an injectable, best-effort sink.

// std
use std::{
	panic::{self, AssertUnwindSafe},
	sync::OnceLock,
};
// self
use crate::{_prelude::*, error::ErrorCode};

/// Error type a [`LogSink`] may return; the engine discards it.
pub type SinkError = Box<dyn StdError + Send + Sync>;

/// Severity of a log entry, ordered from most to least verbose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
	/// Step-by-step protocol detail.
	#[default]
	Verbose,
	/// Diagnostic detail.
	Debug,
	/// Informational events.
	Info,
	/// Recoverable anomalies (e.g. correlation mismatch).
	Warn,
	/// Failures.
	Error,
	/// Minimum level that suppresses every entry.
	Off,
}
impl LogLevel {
	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			LogLevel::Verbose => "verbose",
			LogLevel::Debug => "debug",
			LogLevel::Info => "info",
			LogLevel::Warn => "warn",
			LogLevel::Error => "error",
			LogLevel::Off => "off",
		}
	}
}
impl Display for LogLevel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Structured event delivered to a [`LogSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
	/// Severity.
	pub level: LogLevel,
	/// Component tag (e.g. `oauth2_engine.flows`).
	pub tag: &'static str,
	/// Primary message; never contains token material.
	pub message: String,
	/// Optional supplementary text.
	pub detail: Option<String>,
	/// Stable code for failures and anomalies.
	pub code: Option<ErrorCode>,
	/// Rendered cause chain, when an error triggered the entry.
	pub cause: Option<String>,
}

/// External destination for engine log entries.
///
/// Delivery is best-effort: returned errors and panics are swallowed so a broken sink can
/// never abort a flow.
pub trait LogSink: Send + Sync {
	/// Receives one entry that passed the logger's minimum level.
	fn log(&self, entry: &LogEntry) -> Result<(), SinkError>;
}

/// Logging context injected into the engine.
///
/// Holds a minimum level and an optional sink. Tests construct their own instance with a
/// capturing sink; applications that want one shared instance can use [`Logger::global`].
pub struct Logger {
	level: RwLock<LogLevel>,
	sink: RwLock<Option<Arc<dyn LogSink>>>,
}
impl Logger {
	/// Creates a logger at [`LogLevel::Verbose`] without a sink.
	pub fn new() -> Self {
		Self { level: RwLock::new(LogLevel::default()), sink: RwLock::new(None) }
	}

	/// Returns the lazily-initialized process-wide logger.
	pub fn global() -> Arc<Logger> {
		static GLOBAL: OnceLock<Arc<Logger>> = OnceLock::new();

		GLOBAL.get_or_init(|| Arc::new(Logger::new())).clone()
	}

	/// Sets the minimum level.
	pub fn with_level(self, level: LogLevel) -> Self {
		self.set_level(level);

		self
	}

	/// Installs an external sink.
	pub fn with_sink(self, sink: Arc<dyn LogSink>) -> Self {
		self.set_sink(Some(sink));

		self
	}

	/// Replaces the minimum level at runtime.
	pub fn set_level(&self, level: LogLevel) {
		*self.level.write() = level;
	}

	/// Replaces (or removes) the external sink at runtime.
	pub fn set_sink(&self, sink: Option<Arc<dyn LogSink>>) {
		*self.sink.write() = sink;
	}

	/// Current minimum level.
	pub fn level(&self) -> LogLevel {
		*self.level.read()
	}

	/// Returns `true` if an entry at `level` would be emitted.
	pub fn enabled(&self, level: LogLevel) -> bool {
		level != LogLevel::Off && level >= self.level()
	}

	/// Emits a verbose entry.
	pub fn verbose(&self, tag: &'static str, message: impl Into<String>) {
		self.emit(LogLevel::Verbose, tag, message, None, None, None);
	}

	/// Emits a debug entry.
	pub fn debug(&self, tag: &'static str, message: impl Into<String>) {
		self.emit(LogLevel::Debug, tag, message, None, None, None);
	}

	/// Emits an info entry.
	pub fn info(&self, tag: &'static str, message: impl Into<String>) {
		self.emit(LogLevel::Info, tag, message, None, None, None);
	}

	/// Emits a warning tagged with `code`.
	pub fn warn(&self, tag: &'static str, message: impl Into<String>, code: ErrorCode) {
		self.emit(LogLevel::Warn, tag, message, None, Some(code), None);
	}

	/// Emits an error tagged with `code` and an optional cause.
	pub fn error(
		&self,
		tag: &'static str,
		message: impl Into<String>,
		code: ErrorCode,
		cause: Option<&dyn StdError>,
	) {
		self.emit(LogLevel::Error, tag, message, None, Some(code), cause);
	}

	/// Emits a fully specified entry.
	pub fn emit(
		&self,
		level: LogLevel,
		tag: &'static str,
		message: impl Into<String>,
		detail: Option<String>,
		code: Option<ErrorCode>,
		cause: Option<&dyn StdError>,
	) {
		if !self.enabled(level) {
			return;
		}

		let entry = LogEntry {
			level,
			tag,
			message: message.into(),
			detail,
			code,
			cause: cause.map(render_cause),
		};

		forward_to_tracing(&entry);

		let sink = self.sink.read().clone();

		if let Some(sink) = sink {
			let _ = panic::catch_unwind(AssertUnwindSafe(|| sink.log(&entry)));
		}
	}
}
impl Default for Logger {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for Logger {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Logger")
			.field("level", &self.level())
			.field("sink_set", &self.sink.read().is_some())
			.finish()
	}
}

fn render_cause(err: &dyn StdError) -> String {
	let mut rendered = err.to_string();
	let mut source = err.source();

	while let Some(inner) = source {
		rendered.push_str(": ");
		rendered.push_str(&inner.to_string());

		source = inner.source();
	}

	rendered
}

#[cfg(feature = "tracing")]
fn forward_to_tracing(entry: &LogEntry) {
	let code = entry.code.map(ErrorCode::as_str).unwrap_or_default();
	let detail = entry.detail.as_deref().unwrap_or_default();
	let cause = entry.cause.as_deref().unwrap_or_default();

	match entry.level {
		LogLevel::Verbose =>
			tracing::trace!(tag = entry.tag, code, detail, cause, "{}", entry.message),
		LogLevel::Debug =>
			tracing::debug!(tag = entry.tag, code, detail, cause, "{}", entry.message),
		LogLevel::Info => tracing::info!(tag = entry.tag, code, detail, cause, "{}", entry.message),
		LogLevel::Warn => tracing::warn!(tag = entry.tag, code, detail, cause, "{}", entry.message),
		LogLevel::Error =>
			tracing::error!(tag = entry.tag, code, detail, cause, "{}", entry.message),
		LogLevel::Off => {},
	}
}

#[cfg(not(feature = "tracing"))]
fn forward_to_tracing(entry: &LogEntry) {
	let _ = entry;
}
