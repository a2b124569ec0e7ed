//! Run constants, defaults, and the JSON run configuration

use crate::io::error::{GenerationError, Result, file_system, invalid_parameter};
use crate::rules::Rule;
use serde::{Deserialize, Serialize};
use std::path::Path;

// DNA encoding
/// Separator between per-layer DNA tokens
pub const DNA_DELIMITER: &str = "-";
/// Separator between an element id and its file name inside a token
pub const DNA_ID_SEPARATOR: char = ':';
/// Start of the option suffix inside a token
pub const DNA_OPTION_PREFIX: &str = "?";
/// Option key marking a token as exempt from uniqueness
pub const BYPASS_DNA_OPTION: &str = "bypassDNA";

// Catalog loading
/// Separator between an element name and its rarity weight
pub const DEFAULT_RARITY_DELIMITER: &str = "#";
/// Weight used when a file name carries none
pub const DEFAULT_ELEMENT_WEIGHT: u32 = 1;
/// Blend mode applied when a layer does not specify one
pub const DEFAULT_BLEND: &str = "source-over";

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;
/// Consecutive duplicate rejections tolerated before a run aborts
pub const DEFAULT_UNIQUE_DNA_TOLERANCE: usize = 10_000;
/// Directory holding one sub-directory per layer
pub const DEFAULT_LAYERS_DIR: &str = "layers";
/// Directory receiving images, metadata and animations
pub const DEFAULT_BUILD_DIR: &str = "build";

// Rendering
/// Canvas width used when the configuration omits a format
pub const DEFAULT_WIDTH: u32 = 512;
/// Canvas height used when the configuration omits a format
pub const DEFAULT_HEIGHT: u32 = 512;
/// Lightness used for generated pastel backgrounds
pub const DEFAULT_BACKGROUND_BRIGHTNESS: &str = "80%";
/// Colour used for static backgrounds
pub const DEFAULT_BACKGROUND_COLOR: &str = "#000000";
/// Delay between GIF animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 500;
/// Encoder quality used when the configuration omits one
pub const DEFAULT_GIF_QUALITY: u8 = 100;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 20;

// Metadata
/// Value written to the `compiler` field of every metadata record
pub const METADATA_COMPILER: &str = "layerforge";
/// File collecting every metadata record of a run
pub const METADATA_INDEX_FILE: &str = "_metadata.json";

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

/// Complete description of one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// Batches generated in order, each with its own layers and rules
    pub layer_configurations: Vec<BatchConfig>,
    /// Consecutive duplicate rejections tolerated before aborting
    #[serde(default = "default_tolerance", alias = "uniqueDnaTorrance")]
    pub unique_dna_tolerance: usize,
    /// Separator between element names and rarity weights in file names
    #[serde(default = "default_rarity_delimiter")]
    pub rarity_delimiter: String,
    /// Shuffle edition numbers across all batches
    #[serde(default)]
    pub shuffle_layer_configurations: bool,
    /// Canvas dimensions
    #[serde(default)]
    pub format: Format,
    /// Background fill applied below the first layer
    #[serde(default)]
    pub background: Background,
    /// Animated export settings
    #[serde(default)]
    pub gif: GifConfig,
    /// Fields copied into every metadata record
    #[serde(default)]
    pub metadata: MetadataConfig,
}

/// One batch of editions sharing a layer list and rule set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchConfig {
    /// Number of editions this batch produces
    pub size: usize,
    /// Layers in composition order
    pub layers_order: Vec<LayerSpec>,
    /// Rules forcing a later layer to specific values
    #[serde(default)]
    pub dependency_rules: Vec<Rule>,
    /// Rules forbidding specific values of a later layer
    #[serde(default)]
    pub mutually_exclusive_rules: Vec<Rule>,
}

/// A layer entry in a batch's composition order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Directory name under the layers root
    pub name: String,
    /// Optional per-layer overrides
    #[serde(default)]
    pub options: LayerOptions,
}

/// Per-layer overrides; unset fields fall back to defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerOptions {
    /// Name used in rules and metadata instead of the directory name
    pub display_name: Option<String>,
    /// Compositing operation, e.g. `multiply`
    pub blend: Option<String>,
    /// Layer opacity in `[0, 1]`
    pub opacity: Option<f32>,
    /// Exclude this layer from uniqueness comparison
    #[serde(rename = "bypassDNA")]
    pub bypass_dna: Option<bool>,
}

/// Output canvas settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Format {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Use a smoothing filter when scaling layer images
    #[serde(default)]
    pub smoothing: bool,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            smoothing: false,
        }
    }
}

/// Background fill settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    /// Draw a background at all
    #[serde(default)]
    pub generate: bool,
    /// Lightness of random pastel colours, e.g. `"80%"`
    #[serde(default = "default_brightness")]
    pub brightness: String,
    /// Use `default` instead of a random pastel colour
    #[serde(default, rename = "static")]
    pub static_color: bool,
    /// Hex colour used for static backgrounds
    #[serde(default = "default_background_color")]
    pub default: String,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            generate: false,
            brightness: default_brightness(),
            static_color: false,
            default: default_background_color(),
        }
    }
}

/// Animated GIF export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GifConfig {
    /// Write one GIF per edition showing layers being added
    #[serde(default)]
    pub export: bool,
    /// Loop count; 0 loops forever, negative plays once
    #[serde(default)]
    pub repeat: i32,
    /// Encoder quality from 1 (fastest) to 100 (best)
    #[serde(default = "default_gif_quality")]
    pub quality: u8,
    /// Delay between frames in milliseconds
    #[serde(default = "default_gif_delay")]
    pub delay: u32,
}

impl Default for GifConfig {
    fn default() -> Self {
        Self {
            export: false,
            repeat: 0,
            quality: DEFAULT_GIF_QUALITY,
            delay: GIF_FRAME_DELAY_MS,
        }
    }
}

/// Target chain flavour for metadata records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Ethereum style records, editions start at 1
    #[default]
    Eth,
    /// Solana style records, editions start at 0
    Sol,
}

impl Network {
    /// First edition number handed out for this network
    pub const fn first_edition(self) -> u32 {
        match self {
            Self::Eth => 1,
            Self::Sol => 0,
        }
    }
}

/// Fields shared by all metadata records of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataConfig {
    /// Prefix of every item name, followed by `#<edition>`
    #[serde(default)]
    pub name_prefix: String,
    /// Collection description
    #[serde(default)]
    pub description: String,
    /// Base URI images are published under
    #[serde(default)]
    pub base_uri: String,
    /// Record flavour
    #[serde(default)]
    pub network: Network,
    /// Arbitrary fields merged into every record
    #[serde(default)]
    pub extra_metadata: serde_json::Map<String, serde_json::Value>,
    /// Solana specific fields, required when `network` is `sol`
    #[serde(default)]
    pub solana: Option<SolanaMetadata>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            name_prefix: "Your Collection".to_string(),
            description: String::new(),
            base_uri: String::new(),
            network: Network::Eth,
            extra_metadata: serde_json::Map::new(),
            solana: None,
        }
    }
}

/// Solana record fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaMetadata {
    /// Token symbol
    pub symbol: String,
    /// Royalty in basis points
    pub seller_fee_basis_points: u32,
    /// Project URL
    #[serde(default)]
    pub external_url: String,
    /// Creator addresses and shares
    #[serde(default)]
    pub creators: Vec<SolanaCreator>,
}

/// A Solana creator entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolanaCreator {
    /// Wallet address
    pub address: String,
    /// Royalty share in percent
    pub share: u8,
}

fn default_tolerance() -> usize {
    DEFAULT_UNIQUE_DNA_TOLERANCE
}

fn default_rarity_delimiter() -> String {
    DEFAULT_RARITY_DELIMITER.to_string()
}

fn default_brightness() -> String {
    DEFAULT_BACKGROUND_BRIGHTNESS.to_string()
}

fn default_background_color() -> String {
    DEFAULT_BACKGROUND_COLOR.to_string()
}

const fn default_gif_quality() -> u8 {
    DEFAULT_GIF_QUALITY
}

const fn default_gif_delay() -> u32 {
    GIF_FRAME_DELAY_MS
}

impl RunConfig {
    /// Read and validate a run configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON for
    /// this schema, or fails validation
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(file_system(path, "read config"))?;
        let config: Self =
            serde_json::from_str(&content).map_err(|source| GenerationError::Serialization {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Total number of editions across all batches
    pub fn total_editions(&self) -> usize {
        self.layer_configurations.iter().map(|b| b.size).sum()
    }

    /// Check settings that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns an error if any run-wide or per-batch parameter is out of range
    pub fn validate(&self) -> Result<()> {
        if self.layer_configurations.is_empty() {
            return Err(invalid_parameter(
                "layerConfigurations",
                &"[]",
                &"at least one batch is required",
            ));
        }
        if self.unique_dna_tolerance == 0 {
            return Err(invalid_parameter(
                "uniqueDnaTolerance",
                &self.unique_dna_tolerance,
                &"must be at least 1",
            ));
        }
        if self.rarity_delimiter.is_empty() || self.rarity_delimiter.contains(DNA_DELIMITER) {
            return Err(invalid_parameter(
                "rarityDelimiter",
                &self.rarity_delimiter,
                &format!("must be non-empty and must not contain '{DNA_DELIMITER}'"),
            ));
        }
        if self.format.width == 0 || self.format.height == 0 {
            return Err(invalid_parameter(
                "format",
                &format!("{}x{}", self.format.width, self.format.height),
                &"dimensions must be positive",
            ));
        }
        if self.metadata.network == Network::Sol && self.metadata.solana.is_none() {
            return Err(invalid_parameter(
                "metadata.solana",
                &"null",
                &"required when network is sol",
            ));
        }
        for (index, batch) in self.layer_configurations.iter().enumerate() {
            if batch.layers_order.is_empty() {
                return Err(invalid_parameter(
                    "layersOrder",
                    &index,
                    &"batch has no layers",
                ));
            }
        }
        Ok(())
    }
}
