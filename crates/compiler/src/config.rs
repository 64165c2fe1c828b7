//! Parser configuration
//!
//! Tunables for the front-end. Values can be set programmatically with the
//! builder methods or loaded from the `[parser]` table of a `dungeon.toml`.

use serde::Deserialize;

const DEFAULT_TAB_SIZE: usize = 4;
const DEFAULT_MAX_IDENTIFIER_LEN: usize = 128;
const DEFAULT_MAX_STRING_LEN: usize = 2_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParserConfig {
    /// Spaces per tab. Only affects reported column indexes.
    pub tab_size: usize,
    /// Maximum identifier length in bytes.
    pub max_identifier_len: usize,
    /// Maximum string literal length in bytes.
    pub max_string_len: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            tab_size: DEFAULT_TAB_SIZE,
            max_identifier_len: DEFAULT_MAX_IDENTIFIER_LEN,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tab_size(mut self, tab_size: usize) -> Self {
        self.tab_size = tab_size;
        self
    }

    pub fn with_max_identifier_len(mut self, len: usize) -> Self {
        self.max_identifier_len = len;
        self
    }

    pub fn with_max_string_len(mut self, len: usize) -> Self {
        self.max_string_len = len;
        self
    }

    /// Load from TOML text. Unknown keys are ignored so the same file can
    /// carry tables for other tools.
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        #[derive(Deserialize)]
        struct ConfigFile {
            #[serde(default)]
            parser: ParserConfig,
        }
        toml::from_str::<ConfigFile>(toml_str)
            .map(|f| f.parser)
            .map_err(|e| format!("Failed to parse config: {e}"))
    }
}
