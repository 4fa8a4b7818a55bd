//! A small hand-rolled Prometheus text-exposition parser.
//!
//! The original spec's §9 design note is explicit: "do not pull a
//! heavyweight dependency for the subset of the format required; parse
//! only simple numeric gauges; ignore labels unless the engine mapping
//! disambiguates". This parser handles exactly that subset: `# HELP`/`#
//! TYPE` comment lines are skipped, a metric line is `name{labels} value
//! [timestamp]`, and a metric name repeated across label sets (e.g. one
//! gauge reported per model/adapter) resolves by last-value-wins, which is
//! the documented aggregator for the single-engine-process case this
//! sidecar targets.

use std::collections::HashMap;

use crate::error::MetricsError;

/// Parse a full Prometheus text exposition into a flat `name -> value`
/// map. Unparseable individual lines are skipped rather than failing the
/// whole scrape outright is *not* the policy here: the original spec
/// treats the whole response as either parseable or a `MetricsParseError`
/// for that member, so any malformed metric line fails the parse.
pub fn parse_exposition(body: &str) -> Result<HashMap<String, f64>, MetricsError> {
    let mut out = HashMap::new();
    for raw_line in body.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (name, value) = parse_line(line)?;
        // Last value for a repeated metric name wins (label-suffix
        // aggregation, §4.2).
        out.insert(name, value);
    }
    Ok(out)
}

fn parse_line(line: &str) -> Result<(String, f64), MetricsError> {
    let (name, rest) = if let Some(brace_start) = line.find('{') {
        let brace_end = line[brace_start..]
            .find('}')
            .map(|i| brace_start + i)
            .ok_or_else(|| MetricsError::Parse(format!("unterminated label set: {line:?}")))?;
        (&line[..brace_start], line[brace_end + 1..].trim_start())
    } else {
        let split = line
            .find(char::is_whitespace)
            .ok_or_else(|| MetricsError::Parse(format!("missing value: {line:?}")))?;
        (&line[..split], line[split..].trim_start())
    };

    if name.is_empty() {
        return Err(MetricsError::Parse(format!("empty metric name: {line:?}")));
    }

    let value_token = rest
        .split_whitespace()
        .next()
        .ok_or_else(|| MetricsError::Parse(format!("missing value: {line:?}")))?;
    let value: f64 = value_token
        .parse()
        .map_err(|_| MetricsError::Parse(format!("non-numeric value {value_token:?} in {line:?}")))?;

    Ok((name.to_string(), value))
}

/// Project a raw `name -> value` exposition down to the semantic metrics
/// (`waiting_queue`, `cache_usage`, `running_req`) the given engine kind
/// maps to (§3 "Engine metric mapping"). Metric names the engine does not
/// recognize are dropped.
pub fn extract_semantic_metrics(
    engine: scheduler_types::EngineKind,
    raw: &HashMap<String, f64>,
) -> HashMap<String, f64> {
    let mut out = HashMap::new();
    for (name, value) in raw {
        if let Some(semantic) = engine.semantic_of(name) {
            out.insert(semantic.key().to_string(), *value);
        }
    }
    out
}
