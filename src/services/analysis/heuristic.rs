//! Local Heuristic Analyzer
//!
//! Deterministic keyword classifier used whenever the remote provider is
//! unavailable or fails. Pure: no I/O, no randomness, no shared state.
//!
//! Rules are checked in a fixed priority order and the first match wins, so
//! "connection timeout to db" is a timeout, not a database problem.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use nexus_core::AnalysisResult;

/// Which canned hypothesis matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicRule {
    Timeout,
    Database,
    Memory,
    UpstreamGateway,
    Performance,
    Generic,
}

impl std::fmt::Display for HeuristicRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeuristicRule::Timeout => write!(f, "timeout"),
            HeuristicRule::Database => write!(f, "database"),
            HeuristicRule::Memory => write!(f, "memory"),
            HeuristicRule::UpstreamGateway => write!(f, "upstream_gateway"),
            HeuristicRule::Performance => write!(f, "performance"),
            HeuristicRule::Generic => write!(f, "generic"),
        }
    }
}

/// Canned hypothesis and remediation for one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicVerdict {
    pub rule: HeuristicRule,
    pub analysis: &'static str,
    pub suggestion: &'static str,
}

impl HeuristicVerdict {
    pub fn into_result(self) -> AnalysisResult {
        AnalysisResult::local(self.analysis, self.suggestion)
    }
}

const GENERIC: HeuristicVerdict = HeuristicVerdict {
    rule: HeuristicRule::Generic,
    analysis: "No clear failure pattern in the event payload; the root cause needs manual investigation.",
    suggestion: "Inspect logs with the event's correlation id for RCA; \
                 check recent deploys and third-party API rate limits.",
};

struct KeywordRule {
    regex: Regex,
    verdict: HeuristicVerdict,
}

/// Keyword-based fallback classifier.
pub struct LocalHeuristicAnalyzer {
    rules: Vec<KeywordRule>,
}

impl Default for LocalHeuristicAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalHeuristicAnalyzer {
    /// Create a new analyzer with compiled keyword patterns, in priority order.
    pub fn new() -> Self {
        Self {
            rules: Self::compile_rules(&[
                (
                    r"timeout|timed out|time out|connection[ -]reset|econnreset|etimedout|deadline exceeded",
                    HeuristicVerdict {
                        rule: HeuristicRule::Timeout,
                        analysis: "A dependency stopped answering within its deadline or reset the connection.",
                        suggestion: "Check DB/network connection pools and timeouts; \
                                     verify the dependency's health and the network path; \
                                     review retry/backoff settings so retries do not amplify load.",
                    },
                ),
                (
                    r"database|\bdb\b|connection pool|\block(s|ed|ing)?\b|deadlock|\bsql\b|postgres|mysql",
                    HeuristicVerdict {
                        rule: HeuristicRule::Database,
                        analysis: "The database is under pressure: pool exhaustion, lock contention or a failing query.",
                        suggestion: "Inspect DB connection pool usage and limits; \
                                     look for long-running transactions and lock waits; \
                                     review the slow query log for the affected service.",
                    },
                ),
                (
                    r"memory|\boom|out[ -]of[ -]memory",
                    HeuristicVerdict {
                        rule: HeuristicRule::Memory,
                        analysis: "The process likely ran out of memory (OOM kill or leak).",
                        suggestion: "Investigate memory usage: inspect recent allocations, GC activity and cgroup limits; \
                                     reduce worker concurrency or raise limits; \
                                     check for leaks introduced by the latest deploy.",
                    },
                ),
                (
                    r"\b502\b|\b504\b|bad gateway",
                    HeuristicVerdict {
                        rule: HeuristicRule::UpstreamGateway,
                        analysis: "Gateway errors (502/504) usually mean an upstream service failed or was unreachable.",
                        suggestion: "Check upstream health and request latencies; \
                                     verify load balancer target health and recent upstream deploys; \
                                     align proxy timeouts with upstream response times.",
                    },
                ),
                (
                    r"\bcpu\b|latency|\bp95\b|\bp99\b",
                    HeuristicVerdict {
                        rule: HeuristicRule::Performance,
                        analysis: "Performance regression: elevated CPU usage or tail latency.",
                        suggestion: "Investigate p95/p99 latency, slow queries, thread/worker saturation and external API calls; \
                                     compare CPU profiles against the last healthy deploy.",
                    },
                ),
            ]),
        }
    }

    fn compile_rules(raw: &[(&str, HeuristicVerdict)]) -> Vec<KeywordRule> {
        raw.iter()
            .filter_map(|(pattern, verdict)| {
                Regex::new(pattern).ok().map(|regex| KeywordRule {
                    regex,
                    verdict: *verdict,
                })
            })
            .collect()
    }

    /// Classify a payload into a canned hypothesis and remediation.
    ///
    /// Accepts any JSON value or none at all; never fails.
    pub fn classify(&self, payload: Option<&Value>) -> HeuristicVerdict {
        let text = searchable_text(payload);
        self.classify_text(&text)
    }

    /// Classify already-lowercased text.
    pub fn classify_text(&self, text: &str) -> HeuristicVerdict {
        self.rules
            .iter()
            .find(|r| r.regex.is_match(text))
            .map(|r| r.verdict)
            .unwrap_or(GENERIC)
    }
}

/// Lowercase text form of a payload. Strings are used as-is rather than
/// JSON-quoted.
fn searchable_text(payload: Option<&Value>) -> String {
    match payload {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.to_lowercase(),
        Some(other) => other.to_string().to_lowercase(),
    }
}
