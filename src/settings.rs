//! Optional JSON settings file.
//! Every key may be omitted; command-line flags override what is set here.

use crate::encode::{RadiusDomain, VisualEncoder, DEFAULT_MAX_RADIUS};

fn default_max_radius() -> f64 {
    DEFAULT_MAX_RADIUS
}

fn default_top() -> usize {
    10
}

/// Settings read from `--config`.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_max_radius")]
    pub max_radius: f64,
    #[serde(default)]
    pub radius_domain: RadiusDomain,
    /// Stations listed on the console.
    #[serde(default = "default_top")]
    pub top: usize,
    #[serde(default)]
    pub stations: Option<std::path::PathBuf>,
    #[serde(default)]
    pub trips: Option<std::path::PathBuf>,
    #[serde(default)]
    pub cache: Option<std::path::PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_radius: default_max_radius(),
            radius_domain: RadiusDomain::default(),
            top: default_top(),
            stations: None,
            trips: None,
            cache: None,
        }
    }
}

impl Settings {
    /// Parses and validates a settings document.
    ///
    /// # Arguments
    /// * `text` - JSON object; missing keys take their defaults, unknown keys are rejected.
    ///
    /// # Returns
    /// * `anyhow::Result<Settings>` - Validated settings or a parse/validation error.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let settings: Settings = serde_json::from_str(text)
            .map_err(|e| anyhow::anyhow!("Invalid settings: {}", e))?;
        settings.validate()?;
        anyhow::Ok(settings)
    }

    /// Reads a settings file and passes it to [`Settings::from_json`].
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read settings {}: {}", path.as_ref().display(), e))?;
        Self::from_json(&text)
    }

    /// Rejects a negative or non-finite `max_radius` or fixed domain.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.max_radius.is_finite() && self.max_radius >= 0.0) {
            anyhow::bail!("max_radius must be a non-negative number, got {}", self.max_radius);
        }
        if let RadiusDomain::Fixed(max) = self.radius_domain {
            if !(max.is_finite() && max >= 0.0) {
                anyhow::bail!("fixed radius domain must be a non-negative number, got {}", max);
            }
        }
        anyhow::Ok(())
    }

    /// The visual encoder these settings describe.
    pub fn encoder(&self) -> VisualEncoder {
        VisualEncoder::new(self.max_radius, self.radius_domain)
    }
}
