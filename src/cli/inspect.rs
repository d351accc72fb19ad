//! Inspect command implementation

use std::path::Path;
use std::process::ExitCode;

use serde_json::json;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::models::{Artifact, ArtifactKind};
use crate::store::{ArtifactStore, FileStore, ASSET_EXTENSION};

/// Run the inspect command
pub fn run_inspect(asset: &Path, json: bool) -> ExitCode {
    let is_asset = asset
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ASSET_EXTENSION));
    if !is_asset {
        eprintln!("Error: '{}' is not an .{} file", asset.display(), ASSET_EXTENSION);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    if !asset.exists() {
        eprintln!("Error: '{}' does not exist", asset.display());
        return ExitCode::from(EXIT_ERROR);
    }

    let store = match FileStore::open(asset) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if json {
        let value = json!({
            "path": asset.display().to_string(),
            "created_at": store.created_at(),
            "updated_at": store.updated_at(),
            "source": store.source_info(),
            "primary": store.primary(),
            "artifacts": store.all(),
        });
        match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    println!("{}", asset.display());
    if let Some(info) = store.source_info() {
        println!("  source:  {}", info.source);
        println!(
            "  import:  {} fps, {} px/unit, anchor ({}, {}), extrude {}, {} mesh",
            info.settings.frame_rate,
            info.settings.pixels_per_unit,
            info.settings.anchor[0],
            info.settings.anchor[1],
            info.settings.extrude,
            info.settings.mesh_type
        );
    }
    println!("  updated: {}", store.updated_at());

    for kind in ArtifactKind::ALL {
        let artifacts = store.enumerate(kind);
        if artifacts.is_empty() {
            continue;
        }
        println!();
        println!("{}s ({}):", kind, artifacts.len());
        for stored in artifacts {
            let primary = if store.primary() == Some(stored.id) { " (primary)" } else { "" };
            println!("  {} {}{}", stored.id, describe(&stored.artifact), primary);
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// One-line description of an artifact.
fn describe(artifact: &Artifact) -> String {
    match artifact {
        Artifact::Sprite(s) => format!(
            "{}: {} [{}, {} {}x{}] pivot ({}, {})",
            s.name, s.texture, s.rect.x, s.rect.y, s.rect.width, s.rect.height, s.pivot.x, s.pivot.y
        ),
        Artifact::Timeline(t) => format!(
            "{}: {} keyframes, {:.3}s at {} fps{}",
            t.name,
            t.keyframes.len(),
            t.duration,
            t.frame_rate,
            if t.loop_time { ", looping" } else { "" }
        ),
        Artifact::Selector(m) => {
            let states: Vec<String> = m
                .states
                .iter()
                .map(|s| match &s.motion {
                    Some(motion) => format!("{} -> {}", s.name, motion),
                    None => format!("{} -> (none)", s.name),
                })
                .collect();
            format!("{}: {} states [{}]", m.name, m.states.len(), states.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::synthesize_selector;

    #[test]
    fn test_describe_selector_lists_missing_motion() {
        let machine = synthesize_selector([("Walk", Some("Walk")), ("Jump", None)]);
        let line = describe(&Artifact::Selector(machine));
        assert_eq!(line, "Controller: 2 states [Walk State -> Walk, Jump State -> (none)]");
    }
}
