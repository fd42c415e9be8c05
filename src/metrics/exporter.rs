//! Prometheus Exporter
//!
//! Runs one RAID collection pass per scrape and renders the resulting metric
//! families, plus scrape bookkeeping, in the Prometheus text format.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use prometheus::{Encoder, Gauge, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::{debug, error, instrument, warn};

use crate::domain::ports::RedfishConnector;
use crate::error::{Error, Result};
use crate::hardware::RaidCollector;
use crate::metrics::{MetricFamily, MetricValue, StatusMapping};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the exporter
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Prefix for every exported metric name
    pub prefix: String,

    /// How status tokens become gauge values
    pub status_mapping: StatusMapping,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            prefix: "idrac".to_string(),
            status_mapping: StatusMapping::Compatible,
        }
    }
}

impl ExporterConfig {
    /// Check that the prefix forms valid Prometheus metric names.
    pub fn validate(&self) -> Result<()> {
        let mut chars = self.prefix.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_' || first == ':')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
            }
            None => false,
        };

        if valid {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "Invalid metric prefix '{}': must match [a-zA-Z_:][a-zA-Z0-9_:]*",
                self.prefix
            )))
        }
    }
}

// =============================================================================
// Exporter
// =============================================================================

/// Collects from a Redfish connector on demand and renders Prometheus text.
pub struct Exporter {
    config: ExporterConfig,
    connector: Arc<dyn RedfishConnector>,
    scrapes_total: IntCounterVec,
    healthy: RwLock<bool>,
}

impl Exporter {
    /// Create a new exporter
    pub fn new(config: ExporterConfig, connector: Arc<dyn RedfishConnector>) -> Result<Arc<Self>> {
        let scrapes_total = IntCounterVec::new(
            Opts::new(
                format!("{}_scrapes_total", config.prefix),
                "Redfish collection passes by result",
            ),
            &["result"],
        )?;

        Ok(Arc::new(Self {
            config,
            connector,
            scrapes_total,
            healthy: RwLock::new(true),
        }))
    }

    /// Exporter configuration
    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    /// Whether the most recent collection pass succeeded.
    ///
    /// Optimistically true before the first scrape.
    pub fn is_healthy(&self) -> bool {
        *self.healthy.read()
    }

    /// Run one collection pass and render it.
    ///
    /// A failed collection is not an error here: it is logged and reported
    /// through `{prefix}_scrape_success 0`. Errors are only returned when the
    /// registry itself cannot be built or encoded; such a pass still counts
    /// as a failure.
    #[instrument(skip(self), fields(connector = %self.connector.describe()))]
    pub async fn scrape(&self) -> Result<String> {
        let started = Instant::now();
        let registry = Registry::new();

        let outcome = RaidCollector::collect_with_mapping(
            self.connector.as_ref(),
            self.config.prefix.as_str(),
            self.config.status_mapping,
        )
        .await;

        let rendered = match outcome {
            Ok(collector) => register_families(&registry, &collector.metric_families()).map(Some),
            Err(e) => {
                error!("Redfish collection failed: {}", e);
                Ok(None)
            }
        };
        let success = matches!(rendered, Ok(Some(_)));
        self.record_pass(success);
        let unmapped = rendered?.unwrap_or(0);

        let scrape_success = Gauge::with_opts(Opts::new(
            format!("{}_scrape_success", self.config.prefix),
            "Whether the Redfish collection pass succeeded",
        ))?;
        scrape_success.set(if success { 1.0 } else { 0.0 });

        let scrape_duration = Gauge::with_opts(Opts::new(
            format!("{}_scrape_duration_seconds", self.config.prefix),
            "Duration of the Redfish collection pass",
        ))?;
        scrape_duration.set(started.elapsed().as_secs_f64());

        let unmapped_samples = Gauge::with_opts(Opts::new(
            format!("{}_unmapped_status_samples", self.config.prefix),
            "Status samples without a numeric mapping, exported as info series",
        ))?;
        unmapped_samples.set(unmapped as f64);

        registry.register(Box::new(scrape_success))?;
        registry.register(Box::new(scrape_duration))?;
        registry.register(Box::new(unmapped_samples))?;
        registry.register(Box::new(self.scrapes_total.clone()))?;

        debug!(success, unmapped, elapsed_ms = started.elapsed().as_millis() as u64, "Scrape finished");
        encode(&registry)
    }

    fn record_pass(&self, success: bool) {
        *self.healthy.write() = success;
        let result = if success { "success" } else { "failure" };
        self.scrapes_total.with_label_values(&[result]).inc();
    }
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("config", &self.config)
            .field("connector", &self.connector.describe())
            .finish()
    }
}

// =============================================================================
// Registry Helpers
// =============================================================================

/// Label carrying the raw token on `{family}_info` series.
pub const STATUS_LABEL: &str = "status";

/// Register `families` as gauge vectors on `registry`.
///
/// Families sharing a name are merged into one vector; the first family's
/// help and labels win. A sample without a numeric value is exported on a
/// companion `{family}_info` gauge with an extra `status` label holding the
/// token, set to 1.
///
/// Returns the number of samples exported that way.
pub fn register_families(registry: &Registry, families: &[MetricFamily]) -> Result<usize> {
    let mut vecs: Vec<(String, GaugeVec)> = Vec::new();
    let mut unmapped = 0;

    for family in families {
        let labels: Vec<&str> = family.label_names.iter().map(String::as_str).collect();
        let gauge = gauge_vec(&mut vecs, &family.name, &family.help, &labels)?;

        for sample in &family.samples {
            let mut values: Vec<&str> = sample.label_values.iter().map(String::as_str).collect();
            match &sample.value {
                MetricValue::Number(value) => {
                    gauge.get_metric_with_label_values(&values)?.set(*value);
                }
                MetricValue::Raw(token) => {
                    warn!(
                        metric = %family.name,
                        labels = ?sample.label_values,
                        "Unmapped status token {:?}, exporting as info series",
                        token
                    );
                    let mut info_labels = labels.clone();
                    info_labels.push(STATUS_LABEL);
                    let info_name = format!("{}_info", family.name);
                    let info = gauge_vec(&mut vecs, &info_name, "", &info_labels)?;

                    values.push(token.as_str());
                    info.get_metric_with_label_values(&values)?.set(1.0);
                    unmapped += 1;
                }
            }
        }
    }

    for (_, gauge) in vecs {
        registry.register(Box::new(gauge))?;
    }
    Ok(unmapped)
}

fn gauge_vec(
    vecs: &mut Vec<(String, GaugeVec)>,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<GaugeVec> {
    if let Some((_, gauge)) = vecs.iter().find(|(existing, _)| existing == name) {
        return Ok(gauge.clone());
    }

    // The prometheus crate rejects empty help strings.
    let help = if help.is_empty() { name } else { help };
    let gauge = GaugeVec::new(Opts::new(name, help), labels)?;
    vecs.push((name.to_string(), gauge.clone()));
    Ok(gauge)
}

/// Encode everything registered on `registry` in the text format.
pub fn encode(registry: &Registry) -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| Error::Internal(format!("Exposition is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRedfishConnector;
    use crate::domain::ports::{controller_detail_path, RAID_CONTROLLERS_PATH};
    use serde_json::json;

    const CTRL: &str = "RAID.Integrated.1-1";

    fn idrac_connector(disk_health: &str) -> Arc<InMemoryRedfishConnector> {
        Arc::new(
            InMemoryRedfishConnector::new()
                .with_document(
                    RAID_CONTROLLERS_PATH,
                    json!({ "Members": [{ "@odata.id": format!("/redfish/v1{}/{}", RAID_CONTROLLERS_PATH, CTRL) }] }),
                )
                .with_document(
                    controller_detail_path(CTRL),
                    json!({
                        "Status": { "Health": "OK", "State": "Enabled" },
                        "Devices": [{ "Name": "Disk.Bay.0", "Status": { "Health": disk_health, "State": "Enabled" } }]
                    }),
                ),
        )
    }

    #[test]
    fn test_exporter_config_default() {
        let config = ExporterConfig::default();
        assert_eq!(config.prefix, "idrac");
        assert_eq!(config.status_mapping, StatusMapping::Compatible);
    }

    #[test]
    fn test_exporter_config_validate() {
        for prefix in ["idrac", "redfish_raid", "_x", "ns:idrac", "bmc2"] {
            let config = ExporterConfig {
                prefix: prefix.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "{} should be valid", prefix);
        }
        for prefix in ["", "2idrac", "idrac-1", "i drac"] {
            let config = ExporterConfig {
                prefix: prefix.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{} should be invalid", prefix);
        }
    }

    #[tokio::test]
    async fn test_scrape_renders_raid_series() {
        let exporter = Exporter::new(ExporterConfig::default(), idrac_connector("OK")).unwrap();

        let text = exporter.scrape().await.unwrap();

        assert!(text.contains(r#"idrac_controller_health{name="RAID.Integrated.1-1"} 1"#));
        assert!(text.contains(r#"idrac_controller_state{name="RAID.Integrated.1-1"} 1"#));
        assert!(text.contains(r#"idrac_disk_health{controller="RAID.Integrated.1-1",name="Disk.Bay.0"} 1"#));
        assert!(text.contains(r#"idrac_disk_state{controller="RAID.Integrated.1-1",name="Disk.Bay.0"} 1"#));
        assert!(text.contains("idrac_scrape_success 1"));
        assert!(text.contains(r#"idrac_scrapes_total{result="success"} 1"#));
        assert!(exporter.is_healthy());
    }

    #[tokio::test]
    async fn test_scrape_exports_unmapped_tokens_as_info() {
        let exporter = Exporter::new(ExporterConfig::default(), idrac_connector("Critical")).unwrap();

        let text = exporter.scrape().await.unwrap();

        assert!(!text.contains("idrac_disk_health{"));
        assert!(text.contains(
            r#"idrac_disk_health_info{controller="RAID.Integrated.1-1",name="Disk.Bay.0",status="Critical"} 1"#
        ));
        assert!(text.contains(r#"idrac_disk_state{controller="RAID.Integrated.1-1",name="Disk.Bay.0"} 1"#));
        assert!(text.contains("idrac_unmapped_status_samples 1"));
        assert!(text.contains("idrac_scrape_success 1"));
    }

    #[tokio::test]
    async fn test_scrape_all_mapped_reports_no_unmapped() {
        let exporter = Exporter::new(ExporterConfig::default(), idrac_connector("OK")).unwrap();

        let text = exporter.scrape().await.unwrap();

        assert!(text.contains("idrac_unmapped_status_samples 0"));
        assert!(!text.contains("_info{"));
    }

    #[tokio::test]
    async fn test_render_failure_is_recorded() {
        let exporter = Exporter {
            config: ExporterConfig {
                prefix: "not a metric".into(),
                ..Default::default()
            },
            connector: idrac_connector("OK"),
            scrapes_total: IntCounterVec::new(Opts::new("t_scrapes_total", "t"), &["result"]).unwrap(),
            healthy: RwLock::new(true),
        };

        assert!(exporter.scrape().await.is_err());

        assert!(!exporter.is_healthy());
        assert_eq!(exporter.scrapes_total.with_label_values(&["failure"]).get(), 1);
        assert_eq!(exporter.scrapes_total.with_label_values(&["success"]).get(), 0);
    }

    #[tokio::test]
    async fn test_scrape_failure_reports_zero() {
        let conn = Arc::new(InMemoryRedfishConnector::new());
        let exporter = Exporter::new(ExporterConfig::default(), conn).unwrap();

        let text = exporter.scrape().await.unwrap();

        assert!(text.contains("idrac_scrape_success 0"));
        assert!(text.contains(r#"idrac_scrapes_total{result="failure"} 1"#));
        assert!(!text.contains("idrac_controller_health"));
        assert!(!exporter.is_healthy());
    }

    #[tokio::test]
    async fn test_scrape_counter_accumulates() {
        let exporter = Exporter::new(ExporterConfig::default(), idrac_connector("OK")).unwrap();

        exporter.scrape().await.unwrap();
        let text = exporter.scrape().await.unwrap();

        assert!(text.contains(r#"idrac_scrapes_total{result="success"} 2"#));
    }

    #[tokio::test]
    async fn test_each_scrape_fetches_again() {
        let conn = idrac_connector("OK");
        let exporter = Exporter::new(ExporterConfig::default(), conn.clone()).unwrap();

        exporter.scrape().await.unwrap();
        exporter.scrape().await.unwrap();

        assert_eq!(conn.requests().len(), 4);
    }

    #[test]
    fn test_register_families_merges_by_name() {
        let families = vec![
            MetricFamily::gauge("x_disk_health", "", &["name", "controller"])
                .with_sample(&["d0", "c0"], MetricValue::Number(1.0)),
            MetricFamily::gauge("x_disk_health", "", &["name", "controller"])
                .with_sample(&["d1", "c0"], MetricValue::Number(1.0)),
        ];
        let registry = Registry::new();

        register_families(&registry, &families).unwrap();

        let text = encode(&registry).unwrap();
        assert_eq!(registry.gather().len(), 1);
        assert_eq!(text.matches("# TYPE x_disk_health gauge").count(), 1);
        assert!(text.contains("# HELP x_disk_health x_disk_health"));
        assert!(text.contains(r#"x_disk_health{controller="c0",name="d0"} 1"#));
        assert!(text.contains(r#"x_disk_health{controller="c0",name="d1"} 1"#));
    }

    #[test]
    fn test_register_families_counts_unmapped_samples() {
        let families = vec![
            MetricFamily::gauge("x_controller_health", "", &["name"])
                .with_sample(&["c0"], MetricValue::Raw("Degraded".into())),
            MetricFamily::gauge("x_controller_health", "", &["name"])
                .with_sample(&["c1"], MetricValue::Raw("Warning".into())),
            MetricFamily::gauge("x_controller_state", "", &["name"])
                .with_sample(&["c1"], MetricValue::Number(1.0)),
        ];
        let registry = Registry::new();

        let unmapped = register_families(&registry, &families).unwrap();

        let text = encode(&registry).unwrap();
        assert_eq!(unmapped, 2);
        assert!(text.contains(r#"x_controller_health_info{name="c0",status="Degraded"} 1"#));
        assert!(text.contains(r#"x_controller_health_info{name="c1",status="Warning"} 1"#));
        assert!(text.contains(r#"x_controller_state{name="c1"} 1"#));
    }

    #[test]
    fn test_register_families_rejects_label_mismatch() {
        let families = vec![MetricFamily {
            name: "x_controller_health".into(),
            help: "".into(),
            kind: crate::metrics::MetricKind::Gauge,
            label_names: vec!["name".into()],
            samples: vec![crate::metrics::Sample {
                label_values: vec!["a".into(), "b".into()],
                value: MetricValue::Number(1.0),
            }],
        }];

        assert!(register_families(&Registry::new(), &families).is_err());
    }
}
