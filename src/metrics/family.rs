//! Metric families produced by collectors
//!
//! A collector flattens what it fetched into [`MetricFamily`] values: a name,
//! a help string, label names and one or more labeled samples. The exposition
//! layer turns these into Prometheus text.

use serde::Serialize;

// =============================================================================
// Metric Value
// =============================================================================

/// Value of a single sample.
///
/// Status tokens the cast does not recognize are carried through as `Raw`
/// so that the exposition layer decides what to do with them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Raw(String),
}

impl MetricValue {
    /// Numeric value, if this sample has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(v) => Some(*v),
            MetricValue::Raw(_) => None,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Number(v) => write!(f, "{}", v),
            MetricValue::Raw(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Number(v)
    }
}

// =============================================================================
// Status Cast
// =============================================================================

/// Tokens that mean "healthy" or "on".
pub const GOOD_STATUS_TOKENS: [&str; 2] = ["OK", "Enabled"];

/// Tokens that mean "unhealthy" or "off" under [`StatusMapping::Strict`].
pub const BAD_STATUS_TOKENS: [&str; 3] = ["", "KO", "Disabled"];

/// How Redfish status tokens are turned into gauge values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusMapping {
    /// Good tokens map to `1`; everything else passes through untouched.
    #[default]
    Compatible,
    /// Like `Compatible`, but bad tokens additionally map to `0`.
    Strict,
}

impl StatusMapping {
    /// Cast a status token into a sample value.
    pub fn cast(&self, token: &str) -> MetricValue {
        if GOOD_STATUS_TOKENS.contains(&token) {
            return MetricValue::Number(1.0);
        }
        if *self == StatusMapping::Strict && BAD_STATUS_TOKENS.contains(&token) {
            return MetricValue::Number(0.0);
        }
        MetricValue::Raw(token.to_string())
    }
}

impl std::fmt::Display for StatusMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusMapping::Compatible => write!(f, "compatible"),
            StatusMapping::Strict => write!(f, "strict"),
        }
    }
}

// =============================================================================
// Metric Family
// =============================================================================

/// Kind of a metric family. Only gauges are produced today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Gauge,
}

/// One labeled observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub label_values: Vec<String>,
    pub value: MetricValue,
}

/// A named metric with its label schema and samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Vec<String>,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    /// Create an empty gauge family.
    pub fn gauge(name: impl Into<String>, help: impl Into<String>, label_names: &[&str]) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            kind: MetricKind::Gauge,
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
            samples: Vec::new(),
        }
    }

    /// Append a sample. `label_values` must line up with `label_names`.
    pub fn add_sample<S: AsRef<str>>(&mut self, label_values: &[S], value: MetricValue) {
        debug_assert_eq!(label_values.len(), self.label_names.len());
        self.samples.push(Sample {
            label_values: label_values.iter().map(|v| v.as_ref().to_string()).collect(),
            value,
        });
    }

    /// Builder-style variant of [`MetricFamily::add_sample`].
    pub fn with_sample<S: AsRef<str>>(mut self, label_values: &[S], value: MetricValue) -> Self {
        self.add_sample(label_values, value);
        self
    }

    /// Label value for `label` on the sample at `index`.
    pub fn label(&self, index: usize, label: &str) -> Option<&str> {
        let pos = self.label_names.iter().position(|l| l == label)?;
        self.samples
            .get(index)
            .and_then(|s| s.label_values.get(pos))
            .map(String::as_str)
    }
}
