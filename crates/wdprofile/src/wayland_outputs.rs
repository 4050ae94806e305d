// Author: Dustin Pilgrim
// License: MIT
// Output discovery: wlr-output-management first, SCTK's OutputState
// (wl_output + xdg-output) when the compositor lacks it.

use eventline::{debug, warn};
use smithay_client_toolkit::{
    output::{OutputHandler, OutputInfo, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
};
use wayland_client::{Connection, QueueHandle, globals::registry_queue_init, protocol::wl_output};
use wdprofile_core::{OutputMode, OutputRecord, Transform};

use crate::output_heads;

struct AppData {
    registry_state: RegistryState,
    output_state: OutputState,
}

impl ProvidesRegistryState for AppData {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    registry_handlers![OutputState];
}

impl OutputHandler for AppData {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _output: wl_output::WlOutput) {}

    fn update_output(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _output: wl_output::WlOutput) {}

    fn output_destroyed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _output: wl_output::WlOutput) {}
}

/// What one discovery backend knows about an output, before validation.
#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshot {
    pub name: Option<String>,
    pub description: Option<String>,
    pub mode: Option<CurrentMode>,
    pub position: (i32, i32),
    pub scale: f64,
    /// wl_output transform value.
    pub transform: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CurrentMode {
    pub width: i32,
    pub height: i32,
    pub refresh_mhz: i32,
}

/// Connected outputs with a current mode, ordered top-left first.
///
/// Prefers wlr-output-management; falls back to wl_output + xdg-output.
pub fn query_outputs() -> Result<Vec<OutputRecord>, String> {
    let conn = Connection::connect_to_env().map_err(|e| format!("wayland connect: {e}"))?;

    let snapshots = match output_heads::query_heads(&conn) {
        Ok(Some(heads)) => heads,
        Ok(None) => {
            debug!("zwlr_output_manager_v1 not available, using wl_output");
            query_wl_outputs(&conn)?
        }
        Err(e) => {
            warn!("output management failed ({e}), using wl_output");
            query_wl_outputs(&conn)?
        }
    };

    let mut records: Vec<OutputRecord> = snapshots.iter().filter_map(to_record).collect();
    records.sort_by_key(|r| (r.y, r.x));

    Ok(records)
}

fn query_wl_outputs(conn: &Connection) -> Result<Vec<Snapshot>, String> {
    let (globals, mut event_queue) =
        registry_queue_init(conn).map_err(|e| format!("registry init: {e}"))?;

    let qh = event_queue.handle();
    let mut app_data = AppData {
        registry_state: RegistryState::new(&globals),
        output_state: OutputState::new(&globals, &qh),
    };

    // wl_output globals, then their info and xdg-output events
    event_queue
        .roundtrip(&mut app_data)
        .map_err(|e| format!("roundtrip 1: {e}"))?;
    event_queue
        .roundtrip(&mut app_data)
        .map_err(|e| format!("roundtrip 2: {e}"))?;

    Ok(app_data
        .output_state
        .outputs()
        .filter_map(|output| app_data.output_state.info(&output))
        .map(|info| snapshot_from_info(&info))
        .collect())
}

fn snapshot_from_info(info: &OutputInfo) -> Snapshot {
    let transform = u32::from(info.transform);
    let mode = info.modes.iter().find(|m| m.current).map(|m| CurrentMode {
        width: m.dimensions.0,
        height: m.dimensions.1,
        refresh_mhz: m.refresh_rate,
    });

    let scale = mode
        .and_then(|m| derived_scale(m, info.logical_size, transform))
        .unwrap_or_else(|| f64::from(info.scale_factor));

    Snapshot {
        name: info.name.clone(),
        description: info.description.clone(),
        mode,
        position: info.logical_position.unwrap_or(info.location),
        scale,
        transform,
    }
}

/// Scale implied by the xdg-output logical size, snapped to 1/120 steps.
///
/// wl_output only reports an integer scale; the logical size is what a
/// fractional scale actually produced.
fn derived_scale(mode: CurrentMode, logical_size: Option<(i32, i32)>, transform: u32) -> Option<f64> {
    let (logical_w, _) = logical_size?;
    // odd transforms are the 90/270 rotations
    let physical_w = if transform % 2 == 1 { mode.height } else { mode.width };
    if logical_w <= 0 || physical_w <= 0 {
        return None;
    }

    let ratio = f64::from(physical_w) / f64::from(logical_w);
    Some((ratio * 120.0).round() / 120.0)
}

fn to_record(snap: &Snapshot) -> Option<OutputRecord> {
    let Some(name) = identifying_name(snap.name.as_deref(), snap.description.as_deref()) else {
        warn!("skipping output without a name or description");
        return None;
    };

    let Some(mode) = snap.mode else {
        warn!("skipping output {name}: no current mode");
        return None;
    };

    let refresh_mhz = match u32::try_from(mode.refresh_mhz) {
        Ok(r) if r > 0 => r,
        _ => {
            warn!("skipping output {name}: unusable refresh rate {} mHz", mode.refresh_mhz);
            return None;
        }
    };

    let (x, y) = snap.position;
    debug!("output {name}: {}x{} at {x},{y} scale {}", mode.width, mode.height, snap.scale);

    Some(OutputRecord {
        name,
        x,
        y,
        mode: OutputMode {
            width: u32::try_from(mode.width).unwrap_or(0),
            height: u32::try_from(mode.height).unwrap_or(0),
            refresh_mhz,
        },
        scale: snap.scale,
        transform: Transform::from_raw(snap.transform),
    })
}

/// Raw identifying string for an output: the description with the connector
/// in trailing parentheses when the compositor provides one.
fn identifying_name(name: Option<&str>, description: Option<&str>) -> Option<String> {
    let name = name.map(str::trim).filter(|n| !n.is_empty());
    let description = description.map(str::trim).filter(|d| !d.is_empty());

    match (name, description) {
        (Some(n), Some(d)) if d.ends_with(&format!("({n})")) => Some(d.to_string()),
        (Some(n), Some(d)) => Some(format!("{d} ({n})")),
        (Some(n), None) => Some(n.to_string()),
        (None, Some(d)) => Some(d.to_string()),
        (None, None) => None,
    }
}

smithay_client_toolkit::delegate_output!(AppData);
smithay_client_toolkit::delegate_registry!(AppData);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_description_that_already_names_the_connector() {
        assert_eq!(
            identifying_name(Some("DP-3"), Some("Dell Inc. DELL U2415 ABC (DP-3)")),
            Some("Dell Inc. DELL U2415 ABC (DP-3)".to_string())
        );
    }

    #[test]
    fn appends_connector_to_plain_description() {
        assert_eq!(
            identifying_name(Some("eDP-1"), Some("BOE 0x095F")),
            Some("BOE 0x095F (eDP-1)".to_string())
        );
    }

    #[test]
    fn falls_back_to_whatever_is_there() {
        assert_eq!(identifying_name(Some("HDMI-A-1"), Some("  ")), Some("HDMI-A-1".to_string()));
        assert_eq!(identifying_name(None, Some("Panel")), Some("Panel".to_string()));
        assert_eq!(identifying_name(None, None), None);
    }

    #[test]
    fn empty_name_counts_as_missing() {
        assert_eq!(identifying_name(Some(""), None), None);
        assert_eq!(identifying_name(Some("  "), Some("")), None);
        assert_eq!(identifying_name(Some(""), Some("Panel")), Some("Panel".to_string()));
    }

    fn snapshot(refresh_mhz: i32) -> Snapshot {
        Snapshot {
            name: Some("DP-1".into()),
            description: None,
            mode: Some(CurrentMode {
                width: 2560,
                height: 1440,
                refresh_mhz,
            }),
            position: (0, 0),
            scale: 1.25,
            transform: 0,
        }
    }

    #[test]
    fn keeps_fractional_scale_and_exact_refresh() {
        let record = to_record(&snapshot(143912)).unwrap();
        assert_eq!(record.scale, 1.25);
        assert_eq!(record.mode.refresh_mhz, 143912);
    }

    #[test]
    fn skips_outputs_without_a_usable_refresh() {
        assert!(to_record(&snapshot(0)).is_none());
        assert!(to_record(&snapshot(-1)).is_none());
    }

    #[test]
    fn skips_unnamed_or_modeless_outputs() {
        let mut snap = snapshot(60000);
        snap.name = Some(String::new());
        assert!(to_record(&snap).is_none());

        let mut snap = snapshot(60000);
        snap.mode = None;
        assert!(to_record(&snap).is_none());
    }

    #[test]
    fn scale_follows_logical_size() {
        let mode = CurrentMode {
            width: 2560,
            height: 1440,
            refresh_mhz: 60000,
        };
        assert_eq!(derived_scale(mode, Some((2048, 1152)), 0), Some(1.25));
        assert_eq!(derived_scale(mode, Some((1707, 960)), 0), Some(1.5));
        // rotated 90: logical width runs along the mode height
        assert_eq!(derived_scale(mode, Some((960, 1707)), 1), Some(1.5));
        assert_eq!(derived_scale(mode, None, 0), None);
        assert_eq!(derived_scale(mode, Some((0, 0)), 0), None);
    }
}
