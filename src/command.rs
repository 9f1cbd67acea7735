//! Mention command parsing
//!
//! Turns the free text of an incoming mention into exactly one [`Command`].
//! Rules are checked in order because some phrases overlap:
//!
//! ```text
//! "hello" / "hi" (whole word)  → Greeting
//! "stop monitoring"            → StopMonitoring
//! "resume monitoring"          → ResumeMonitoring
//! "report" (whole word)        → Report
//! "dynamic aqi monitoring"     → NotImplemented(DynamicAqiMonitoring)
//! "monitor aqi ..."            → NotImplemented(StaticAqiMonitoring)
//! anything else                → Unknown
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Intent parsed from a single mention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Greeting,
    StopMonitoring,
    ResumeMonitoring,
    Report,
    /// Recognized, but there is no behavior behind it yet
    NotImplemented(ReservedCommand),
    Unknown,
}

/// Threshold-based monitoring modes that are reserved but not available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedCommand {
    /// e.g. "Dynamic AQI monitoring"
    DynamicAqiMonitoring,
    /// e.g. "Monitor AQI [40,50]"
    StaticAqiMonitoring,
}

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:<[@!][^>]*>\s*)+").expect("valid mention regex"));

static GREETING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:hello|hi)\b").expect("valid greeting regex"));

static STOP_MONITORING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)stop\s+monitoring").expect("valid stop regex"));

static RESUME_MONITORING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)resume\s+monitoring").expect("valid resume regex"));

static REPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\breports?\b").expect("valid report regex"));

static DYNAMIC_AQI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdynamic\s+aqi\s+monitoring\b").expect("valid dynamic aqi regex")
});

static STATIC_AQI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmonitor\s+aqi\b").expect("valid static aqi regex"));

/// Remove the leading address token(s), e.g. `<@U024BE7LH>`.
pub fn strip_mention(text: &str) -> &str {
    match MENTION.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

impl Command {
    /// Parse the text of a mention, address token included.
    pub fn parse(text: &str) -> Command {
        let body = strip_mention(text);

        if GREETING.is_match(body) {
            Command::Greeting
        } else if STOP_MONITORING.is_match(body) {
            Command::StopMonitoring
        } else if RESUME_MONITORING.is_match(body) {
            Command::ResumeMonitoring
        } else if REPORT.is_match(body) {
            Command::Report
        } else if DYNAMIC_AQI.is_match(body) {
            Command::NotImplemented(ReservedCommand::DynamicAqiMonitoring)
        } else if STATIC_AQI.is_match(body) {
            Command::NotImplemented(ReservedCommand::StaticAqiMonitoring)
        } else {
            Command::Unknown
        }
    }
}
