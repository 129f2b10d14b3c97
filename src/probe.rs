//! Best-effort container metadata via ffprobe. This is a capability, not a
//! requirement: any failure (missing binary, unparseable output, odd
//! container) yields `None` and analysis proceeds without it.

use serde::Serialize;
use std::path::Path;
use std::process::Command;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContainerInfo {
    pub codec: Option<String>,
    pub bit_rate: Option<u64>,
}

pub fn probe(path: &Path) -> Option<ContainerInfo> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).ok()?;

    let codec = value["streams"]
        .as_array()
        .and_then(|streams| {
            streams
                .iter()
                .find(|stream| stream["codec_type"] == "audio")
        })
        .and_then(|stream| stream["codec_name"].as_str())
        .map(str::to_string);

    let bit_rate = value["format"]["bit_rate"]
        .as_str()
        .and_then(|s| s.parse().ok());

    Some(ContainerInfo { codec, bit_rate })
}
