use serde::Deserialize;

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database schema collections are resolved in.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Server-side cap on the page size. Oversized requests are clamped
    /// with a warning instead of failing.
    #[serde(default)]
    pub hard_limit: Option<i64>,

    /// Explicit junction mappings for many-to-many pairs with more than one
    /// structural candidate.
    #[serde(default)]
    pub junctions: Vec<JunctionOverride>,

    /// Storage backend selector.
    #[serde(default)]
    pub backend: Backend,
}

/// Maps a collection pair to the junction collection joining them.
#[derive(Debug, Clone, Deserialize)]
pub struct JunctionOverride {
    pub left: String,
    pub right: String,
    pub junction: String,
}

/// The storage backend serving record requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Postgresql,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            hard_limit: None,
            junctions: vec![],
            backend: Backend::default(),
        }
    }
}

fn default_schema() -> String {
    "public".to_string()
}
