// Author: Dustin Pilgrim
// License: MIT

use wdprofile_core::{OutputRecord, StoreOptions, describe_all, find_profile, store};

use eventline::{debug, error, info};

use crate::cli::{Args, Cmd};
use crate::config;
use crate::paths::{self, PathInputs};
use crate::print;
use crate::wayland_outputs;

pub fn run(args: Args) -> Result<(), String> {
    info!("starting wdprofile");
    debug!("parsed args: {:?}", args.cmd);

    let inputs = PathInputs::from_env(args.config);
    let settings = config::load(&inputs)?;
    debug!("settings: {:?}", settings);

    let path = paths::resolve_store_path(&inputs, &settings).map_err(|e| e.to_string())?;
    info!("config path: {}", path.display());

    match args.cmd {
        Cmd::Path => {
            println!("{}", path.display());
            Ok(())
        }

        Cmd::Outputs { naming } => {
            let outputs = discover()?;
            let descriptors = describe_all(&outputs, naming.unwrap_or(settings.output_naming))
                .map_err(|e| e.to_string())?;
            print::print_descriptors(&descriptors);
            Ok(())
        }

        Cmd::Match => {
            let outputs = discover()?;
            let outcome =
                find_profile(&path, &outputs, settings.output_naming).map_err(|e| e.to_string())?;
            debug!("scan outcome: {:?}", outcome);
            print::print_scan_outcome(&path, &outcome);
            Ok(())
        }

        Cmd::Store { naming, name } => {
            let outputs = discover()?;
            let opts = StoreOptions {
                naming: naming.unwrap_or(settings.output_naming),
                profile_name: name.or(settings.profile_name),
            };

            let outcome = store(&path, &outputs, &opts).map_err(|e| {
                error!("store into {} failed: {e}", path.display());
                format!("failed to store layout in {}: {e}", path.display())
            })?;

            info!("stored {} outputs: {:?}", outputs.len(), outcome);
            print::print_store_outcome(&path, &outcome);
            Ok(())
        }
    }
}

fn discover() -> Result<Vec<OutputRecord>, String> {
    let outputs = wayland_outputs::query_outputs().map_err(|e| {
        error!("output discovery failed: {e}");
        format!("failed to query outputs: {e}\nIs a Wayland compositor running?")
    })?;

    info!("found {} outputs", outputs.len());
    for o in &outputs {
        debug!("  {} at {},{}", o.name, o.x, o.y);
    }

    Ok(outputs)
}
