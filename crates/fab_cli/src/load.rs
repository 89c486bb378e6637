//! Minimal JSON loaders for fabric and design files.
//!
//! These are deliberately thin: a real flow would read fabric descriptions
//! and gate-level netlists out of vendor-specific formats, but that parsing
//! is out of scope here. The JSON shapes below exist only to exercise the
//! engine from the command line.

use fab_core::{DieBox, Fabric, InstanceSpec, NetSpec, Netlist};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct FabricFile {
    die: DieBox,
    slots: Vec<fab_core::Slot>,
}

#[derive(Deserialize)]
struct DesignFile {
    #[serde(default)]
    clock_net: Option<String>,
    instances: Vec<InstanceSpec>,
    #[serde(default)]
    nets: Vec<NetSpec>,
}

/// Loads a fabric description from a JSON file.
pub fn load_fabric(path: &Path) -> Result<Fabric, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let raw: FabricFile = serde_json::from_str(&text)?;
    Ok(Fabric::new(raw.die, raw.slots)?)
}

/// Loads a gate-level design description from a JSON file.
pub fn load_design(path: &Path) -> Result<Netlist, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let raw: DesignFile = serde_json::from_str(&text)?;
    Ok(Netlist::build(raw.instances, raw.nets, raw.clock_net.as_deref())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_a_well_formed_fabric_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fabric.json");
        std::fs::write(
            &path,
            r#"{
                "die": {"width": 10, "height": 10},
                "slots": [
                    {"id": 0, "x": 0, "y": 0, "kind": "Logic"},
                    {"id": 1, "x": 10, "y": 0, "kind": "Dff"}
                ]
            }"#,
        )
        .unwrap();
        let fabric = load_fabric(&path).unwrap();
        assert_eq!(fabric.len(), 2);
    }

    #[test]
    fn rejects_a_fabric_file_with_invalid_contents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fabric.json");
        std::fs::write(&path, r#"{"die": {"width": 10, "height": 10}, "slots": []}"#).unwrap();
        assert!(load_fabric(&path).is_err());
    }

    #[test]
    fn loads_a_well_formed_design_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("design.json");
        std::fs::write(
            &path,
            r#"{
                "instances": [
                    {"name": "a", "kind": "Combinational", "pins": ["Y"]},
                    {"name": "b", "kind": "Combinational", "pins": ["A"]}
                ],
                "nets": [
                    {"name": "n1", "driver": ["a", "Y"], "sinks": [["b", "A"]]}
                ]
            }"#,
        )
        .unwrap();
        let netlist = load_design(&path).unwrap();
        assert_eq!(netlist.instances().len(), 2);
    }

    #[test]
    fn missing_file_is_an_error_not_a_panic() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("does-not-exist.json");
        assert!(load_fabric(&path).is_err());
    }
}
