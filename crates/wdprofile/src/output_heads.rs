// Author: Dustin Pilgrim
// License: MIT
//
// Output discovery through wlr-output-management. Heads carry the exact
// current mode and a fixed-point scale, so fractional scales survive.
//
// Returns Ok(None) when the compositor doesn't advertise zwlr_output_manager_v1.

use std::collections::HashMap;

use wayland_client::{
    Connection, Dispatch, Proxy, QueueHandle, WEnum, backend::ObjectId, event_created_child,
    globals::registry_queue_init, protocol::wl_registry,
};
use wayland_protocols_wlr::output_management::v1::client::{
    zwlr_output_head_v1, zwlr_output_manager_v1, zwlr_output_mode_v1,
};

use crate::wayland_outputs::{CurrentMode, Snapshot};

#[derive(Debug, Default)]
struct Head {
    name: Option<String>,
    description: Option<String>,
    enabled: bool,
    current_mode: Option<ObjectId>,
    position: (i32, i32),
    transform: u32,
    scale: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Mode {
    width: i32,
    height: i32,
    refresh: i32,
}

#[derive(Default)]
struct App {
    heads: HashMap<ObjectId, Head>,
    modes: HashMap<ObjectId, Mode>,
    done: bool,
}

impl App {
    fn snapshots(&self) -> Vec<Snapshot> {
        self.heads
            .values()
            .filter(|h| h.enabled)
            .map(|h| Snapshot {
                name: h.name.clone(),
                description: h.description.clone(),
                mode: h
                    .current_mode
                    .as_ref()
                    .and_then(|id| self.modes.get(id))
                    .map(|m| CurrentMode {
                        width: m.width,
                        height: m.height,
                        refresh_mhz: m.refresh,
                    }),
                position: h.position,
                scale: h.scale,
                transform: h.transform,
            })
            .collect()
    }
}

// -------------------- Dispatch impls --------------------

impl Dispatch<wl_registry::WlRegistry, wayland_client::globals::GlobalListContents> for App {
    fn event(
        _state: &mut Self,
        _registry: &wl_registry::WlRegistry,
        _event: wl_registry::Event,
        _data: &wayland_client::globals::GlobalListContents,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<zwlr_output_manager_v1::ZwlrOutputManagerV1, ()> for App {
    fn event(
        state: &mut Self,
        _: &zwlr_output_manager_v1::ZwlrOutputManagerV1,
        event: zwlr_output_manager_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_output_manager_v1::Event::Head { head } => {
                state.heads.insert(
                    head.id(),
                    Head {
                        scale: 1.0,
                        ..Head::default()
                    },
                );
            }
            zwlr_output_manager_v1::Event::Done { .. } => state.done = true,
            zwlr_output_manager_v1::Event::Finished => state.done = true,
            _ => {}
        }
    }

    event_created_child!(App, zwlr_output_manager_v1::ZwlrOutputManagerV1, [
        zwlr_output_manager_v1::EVT_HEAD_OPCODE => (zwlr_output_head_v1::ZwlrOutputHeadV1, ())
    ]);
}

impl Dispatch<zwlr_output_head_v1::ZwlrOutputHeadV1, ()> for App {
    fn event(
        state: &mut Self,
        proxy: &zwlr_output_head_v1::ZwlrOutputHeadV1,
        event: zwlr_output_head_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let zwlr_output_head_v1::Event::Finished = event {
            state.heads.remove(&proxy.id());
            return;
        }

        let Some(head) = state.heads.get_mut(&proxy.id()) else {
            return;
        };

        match event {
            zwlr_output_head_v1::Event::Name { name } => head.name = Some(name),
            zwlr_output_head_v1::Event::Description { description } => {
                head.description = Some(description)
            }
            zwlr_output_head_v1::Event::Enabled { enabled } => head.enabled = enabled != 0,
            zwlr_output_head_v1::Event::CurrentMode { mode } => head.current_mode = Some(mode.id()),
            zwlr_output_head_v1::Event::Position { x, y } => head.position = (x, y),
            zwlr_output_head_v1::Event::Transform { transform } => {
                head.transform = match transform {
                    WEnum::Value(t) => u32::from(t),
                    WEnum::Unknown(raw) => raw,
                }
            }
            zwlr_output_head_v1::Event::Scale { scale } => head.scale = scale,
            _ => {}
        }
    }

    event_created_child!(App, zwlr_output_head_v1::ZwlrOutputHeadV1, [
        zwlr_output_head_v1::EVT_MODE_OPCODE => (zwlr_output_mode_v1::ZwlrOutputModeV1, ())
    ]);
}

impl Dispatch<zwlr_output_mode_v1::ZwlrOutputModeV1, ()> for App {
    fn event(
        state: &mut Self,
        proxy: &zwlr_output_mode_v1::ZwlrOutputModeV1,
        event: zwlr_output_mode_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_output_mode_v1::Event::Size { width, height } => {
                let mode = state.modes.entry(proxy.id()).or_default();
                mode.width = width;
                mode.height = height;
            }
            zwlr_output_mode_v1::Event::Refresh { refresh } => {
                state.modes.entry(proxy.id()).or_default().refresh = refresh;
            }
            zwlr_output_mode_v1::Event::Finished => {
                state.modes.remove(&proxy.id());
            }
            _ => {}
        }
    }
}

// -------------------- Public entrypoint --------------------

pub(crate) fn query_heads(conn: &Connection) -> Result<Option<Vec<Snapshot>>, String> {
    let (globals, mut queue) =
        registry_queue_init::<App>(conn).map_err(|e| format!("registry init: {e}"))?;

    let qh = queue.handle();
    let mut app = App::default();

    let Some(_manager) = globals
        .bind::<zwlr_output_manager_v1::ZwlrOutputManagerV1, _, _>(&qh, 1..=4, ())
        .ok()
    else {
        return Ok(None);
    };

    // heads and modes arrive on bind, closed by `done`
    for _ in 0..2 {
        queue
            .roundtrip(&mut app)
            .map_err(|e| format!("roundtrip: {e}"))?;
        if app.done {
            break;
        }
    }

    if !app.done {
        return Err("zwlr_output_manager_v1 never sent done".into());
    }

    Ok(Some(app.snapshots()))
}
