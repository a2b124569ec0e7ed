//! Metadata records assembled from accepted items

use crate::generation::executor::GeneratedItem;
use crate::io::configuration::{
    METADATA_COMPILER, METADATA_INDEX_FILE, MetadataConfig, Network, SolanaMetadata,
};
use crate::io::error::{GenerationError, Result, file_system};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

/// Build the JSON record for one item
///
/// Extra metadata is merged after the fixed fields, so it can override
/// everything except `attributes` and `compiler`.
///
/// # Errors
///
/// Returns an error if the Solana section is missing for a Solana run
pub fn assemble(item: &GeneratedItem, config: &MetadataConfig, date_ms: i64) -> Result<Value> {
    let mut record = Map::new();
    let attributes = serde_json::to_value(&item.attributes)?;

    match config.network {
        Network::Eth => {
            record.insert(
                "name".into(),
                json!(format!("{} #{}", config.name_prefix, item.edition)),
            );
            record.insert("description".into(), json!(config.description));
            record.insert(
                "image".into(),
                json!(format!("{}/{}.png", config.base_uri, item.edition)),
            );
            record.insert("dna".into(), json!(item.content_hash));
            record.insert("edition".into(), json!(item.edition));
            record.insert("date".into(), json!(date_ms));
            merge_extra(&mut record, config);
            record.insert("attributes".into(), attributes);
            record.insert("compiler".into(), json!(METADATA_COMPILER));
        }
        Network::Sol => {
            let solana = solana_section(config)?;
            let image = format!("{}.png", item.edition);
            record.insert(
                "name".into(),
                json!(format!("{} #{}", config.name_prefix, item.edition)),
            );
            record.insert("symbol".into(), json!(solana.symbol));
            record.insert("description".into(), json!(config.description));
            record.insert(
                "seller_fee_basis_points".into(),
                json!(solana.seller_fee_basis_points),
            );
            record.insert("image".into(), json!(image));
            record.insert("external_url".into(), json!(solana.external_url));
            record.insert("edition".into(), json!(item.edition));
            merge_extra(&mut record, config);
            record.insert("attributes".into(), attributes);
            record.insert(
                "properties".into(),
                json!({
                    "files": [{ "uri": image, "type": "image/png" }],
                    "category": "image",
                    "creators": solana.creators,
                }),
            );
        }
    }

    Ok(Value::Object(record))
}

fn merge_extra(record: &mut Map<String, Value>, config: &MetadataConfig) {
    for (key, value) in &config.extra_metadata {
        record.insert(key.clone(), value.clone());
    }
}

fn solana_section(config: &MetadataConfig) -> Result<&SolanaMetadata> {
    config
        .solana
        .as_ref()
        .ok_or_else(|| GenerationError::InvalidParameter {
            parameter: "metadata.solana",
            value: "null".to_string(),
            reason: "required when network is sol".to_string(),
        })
}

/// Writes one JSON file per edition and the collected index at the end
pub struct MetadataWriter {
    json_dir: PathBuf,
    config: MetadataConfig,
    records: Vec<Value>,
}

impl MetadataWriter {
    /// Create a writer targeting `json_dir`
    pub const fn new(json_dir: PathBuf, config: MetadataConfig) -> Self {
        Self {
            json_dir,
            config,
            records: Vec::new(),
        }
    }

    /// Records written so far, in acceptance order
    pub fn records(&self) -> &[Value] {
        &self.records
    }

    /// Assemble, keep and write `<edition>.json` for one item
    ///
    /// # Errors
    ///
    /// Returns an error if assembly or writing fails
    pub fn write_item(&mut self, item: &GeneratedItem) -> Result<()> {
        let record = assemble(item, &self.config, chrono::Utc::now().timestamp_millis())?;
        let path = self.json_dir.join(format!("{}.json", item.edition));
        write_json(&path, &record)?;
        tracing::debug!(edition = item.edition, path = %path.display(), "wrote metadata");

        self.records.push(record);
        Ok(())
    }

    /// Write every record collected so far to the index file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn write_index(&self) -> Result<PathBuf> {
        let path = self.json_dir.join(METADATA_INDEX_FILE);
        write_json(&path, &Value::Array(self.records.clone()))?;
        Ok(path)
    }
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let content =
        serde_json::to_string_pretty(value).map_err(|source| GenerationError::Serialization {
            path: path.to_path_buf(),
            source,
        })?;
    std::fs::write(path, content).map_err(file_system(path, "write metadata"))
}
