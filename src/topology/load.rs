use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use tracing::{info, warn};

use super::model::Dataset;

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let dataset = parse_dataset(&raw)
        .with_context(|| format!("failed to load dataset {}", path.display()))?;

    info!(
        path = %path.display(),
        assets = dataset.assets.len(),
        connections = dataset.connections.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Parses a `{ "assets": [...], "connections": [...] }` document.
///
/// Dangling connection endpoints are accepted and only reported; they
/// surface as placeholder assets when revealed.
pub fn parse_dataset(raw: &str) -> Result<Dataset> {
    let dataset: Dataset = serde_json::from_str(raw).context("dataset is not valid JSON")?;
    ensure!(!dataset.assets.is_empty(), "dataset contains no assets");

    let known = dataset
        .assets
        .iter()
        .map(|asset| asset.id.as_str())
        .collect::<HashSet<_>>();
    let dangling = dataset
        .connections
        .iter()
        .flat_map(|connection| [connection.source.as_str(), connection.target.as_str()])
        .filter(|id| !known.contains(id))
        .collect::<HashSet<_>>();
    if !dangling.is_empty() {
        warn!(
            count = dangling.len(),
            "connections reference assets missing from the dataset"
        );
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::topology::model::ConnectionId;

    const SAMPLE: &str = r#"{
        "assets": [
            { "id": "sys-1", "name": "Mail Service", "type": "System" },
            { "id": "asset-0", "name": "Servers 1", "type": "Servers", "status": "active", "ip": "192.168.1.2" }
        ],
        "connections": [
            { "source": "sys-1", "target": "asset-0", "label": "Hosts" },
            { "id": "c-9", "source": "asset-0", "target": "ghost", "label": "runs" }
        ]
    }"#;

    #[test]
    fn test_parse_keeps_dangling_connections() {
        let dataset = parse_dataset(SAMPLE).unwrap();
        assert_eq!(dataset.assets.len(), 2);
        assert_eq!(dataset.connections.len(), 2);
        assert_eq!(
            dataset.connections[1].id,
            Some(ConnectionId::Text("c-9".into()))
        );
    }

    #[test]
    fn test_parse_rejects_empty_and_malformed() {
        assert!(parse_dataset(r#"{ "assets": [] }"#).is_err());
        assert!(parse_dataset("{ not json").is_err());
    }

    #[test]
    fn test_missing_connections_default_to_empty() {
        let dataset =
            parse_dataset(r#"{ "assets": [{ "id": "a", "name": "A", "type": "Hardware" }] }"#)
                .unwrap();
        assert!(dataset.connections.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.asset("sys-1").unwrap().name, "Mail Service");
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let error = load_dataset(&path).unwrap_err();
        assert!(format!("{error:#}").contains("absent.json"));
    }
}
