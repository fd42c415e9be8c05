//! RAID Controller Collector
//!
//! Polls the Redfish storage controller collection, fetches each controller's
//! detail document and keeps the controller and disk health/state tokens for
//! one collection pass. [`RaidCollector::metric_families`] flattens them into
//! labeled gauges.
//!
//! ```text
//! GET  /Systems/System.Embedded.1/Storage/Controllers          (list)
//!   └─ GET  /Systems/System.Embedded.1/Storage/Controllers/{id} (detail, per member)
//! ```

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::domain::ports::{
    controller_detail_path, controller_id_from_reference, RedfishConnector, RAID_CONTROLLERS_PATH,
};
use crate::error::{Error, Result};
use crate::metrics::{MetricFamily, StatusMapping};

// =============================================================================
// Records
// =============================================================================

/// Health and state of one disk attached to a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskRecord {
    pub name: String,
    pub health: String,
    pub state: String,
}

/// Health and state of one RAID controller and its disks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerRecord {
    pub name: String,
    pub health: String,
    pub state: String,
    pub disks: Vec<DiskRecord>,
}

// =============================================================================
// Collector
// =============================================================================

/// One collection pass over the RAID controllers of a Redfish endpoint.
///
/// Construction performs all I/O; the result is immutable afterwards.
#[derive(Debug, Clone)]
pub struct RaidCollector {
    prefix: String,
    mapping: StatusMapping,
    controllers: Vec<ControllerRecord>,
}

impl RaidCollector {
    /// Fetch controller and disk status through `conn`.
    ///
    /// Fails on the first connector error or malformed document; no partial
    /// result is ever returned.
    pub async fn collect<C>(conn: &C, prefix: impl Into<String>) -> Result<Self>
    where
        C: RedfishConnector + ?Sized,
    {
        Self::collect_with_mapping(conn, prefix, StatusMapping::default()).await
    }

    /// Like [`RaidCollector::collect`], with an explicit status mapping.
    #[instrument(skip(conn, prefix), fields(connector = %conn.describe()))]
    pub async fn collect_with_mapping<C>(
        conn: &C,
        prefix: impl Into<String>,
        mapping: StatusMapping,
    ) -> Result<Self>
    where
        C: RedfishConnector + ?Sized,
    {
        let ids = list_controllers(conn).await?;
        debug!("Found {} storage controllers", ids.len());

        let mut controllers: Vec<ControllerRecord> = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(record) = controller_details(conn, &id).await? else {
                debug!(controller = %id, "Skipping controller without health/state");
                continue;
            };

            match controllers.iter_mut().find(|c| c.name == record.name) {
                Some(existing) => *existing = record,
                None => controllers.push(record),
            }
        }

        info!(
            controllers = controllers.len(),
            disks = controllers.iter().map(|c| c.disks.len()).sum::<usize>(),
            "RAID collection complete"
        );

        Ok(Self {
            prefix: prefix.into(),
            mapping,
            controllers,
        })
    }

    /// Controllers retained by this pass, in listing order.
    pub fn controllers(&self) -> &[ControllerRecord] {
        &self.controllers
    }

    /// Flatten the collected records into gauge families.
    ///
    /// Per controller: health, state, then health and state for each disk.
    pub fn metric_families(&self) -> Vec<MetricFamily> {
        let ctrl_labels = ["name"];
        let disk_labels = ["name", "controller"];
        let mut families = Vec::new();

        for ctrl in &self.controllers {
            families.push(
                MetricFamily::gauge(self.metric_name("controller_health"), "", &ctrl_labels)
                    .with_sample(&[&ctrl.name], self.mapping.cast(&ctrl.health)),
            );
            families.push(
                MetricFamily::gauge(self.metric_name("controller_state"), "", &ctrl_labels)
                    .with_sample(&[&ctrl.name], self.mapping.cast(&ctrl.state)),
            );

            for disk in &ctrl.disks {
                families.push(
                    MetricFamily::gauge(self.metric_name("disk_health"), "", &disk_labels)
                        .with_sample(&[&disk.name, &ctrl.name], self.mapping.cast(&disk.health)),
                );
                families.push(
                    MetricFamily::gauge(self.metric_name("disk_state"), "", &disk_labels)
                        .with_sample(&[&disk.name, &ctrl.name], self.mapping.cast(&disk.state)),
                );
            }
        }

        families
    }

    fn metric_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }
}

// =============================================================================
// Document Parsing
// =============================================================================

async fn list_controllers<C>(conn: &C) -> Result<Vec<String>>
where
    C: RedfishConnector + ?Sized,
{
    let doc = conn.get(RAID_CONTROLLERS_PATH).await?;
    let context = "controller list";

    array_field(&doc, "Members", context)?
        .iter()
        .map(|member| -> Result<String> {
            let reference = str_field(member, "@odata.id", context)?;
            Ok(controller_id_from_reference(reference).to_string())
        })
        .collect()
}

async fn controller_details<C>(conn: &C, id: &str) -> Result<Option<ControllerRecord>>
where
    C: RedfishConnector + ?Sized,
{
    let doc = conn.get(&controller_detail_path(id)).await?;
    let context = format!("controller detail {}", id);

    let status = object_field(&doc, "Status", &context)?;
    let health = status_token(status, "Health", &context)?;
    let state = status_token(status, "State", &context)?;

    // Devices are validated even when the controller itself is dropped.
    let disks = array_field(&doc, "Devices", &context)?
        .iter()
        .map(|device| -> Result<DiskRecord> {
            let name = str_field(device, "Name", &context)?;
            let disk_context = format!("{} device {}", context, name);
            let disk_status = object_field(device, "Status", &disk_context)?;
            Ok(DiskRecord {
                name: name.to_string(),
                health: status_token(disk_status, "Health", &disk_context)?.to_string(),
                state: status_token(disk_status, "State", &disk_context)?.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if health.is_empty() || state.is_empty() {
        return Ok(None);
    }

    Ok(Some(ControllerRecord {
        name: id.to_string(),
        health: health.to_string(),
        state: state.to_string(),
        disks,
    }))
}

fn field<'a>(doc: &'a Value, name: &str, context: &str) -> Result<&'a Value> {
    doc.get(name).ok_or_else(|| Error::malformed(name, context))
}

fn object_field<'a>(doc: &'a Value, name: &str, context: &str) -> Result<&'a Value> {
    let value = field(doc, name, context)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(Error::malformed(name, context))
    }
}

fn array_field<'a>(doc: &'a Value, name: &str, context: &str) -> Result<&'a Vec<Value>> {
    field(doc, name, context)?
        .as_array()
        .ok_or_else(|| Error::malformed(name, context))
}

fn str_field<'a>(doc: &'a Value, name: &str, context: &str) -> Result<&'a str> {
    field(doc, name, context)?
        .as_str()
        .ok_or_else(|| Error::malformed(name, context))
}

/// Status tokens may be `null` on idle hardware; that reads as empty.
fn status_token<'a>(status: &'a Value, name: &str, context: &str) -> Result<&'a str> {
    match field(status, name, context)? {
        Value::Null => Ok(""),
        Value::String(s) => Ok(s.as_str()),
        _ => Err(Error::malformed(name, context)),
    }
}
