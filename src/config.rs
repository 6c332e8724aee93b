//! Page configuration module.
//!
//! Handles loading, validating, and merging the configuration that drives every
//! behavior on the page: timings, thresholds, the persisted theme key, and the
//! selectors that make up the DOM contract. Stock defaults reproduce the
//! reference page exactly, so a page with no configuration at all behaves as
//! designed.
//!
//! ## Config Sources
//!
//! Two sources are layered over the stock defaults:
//!
//! ```text
//! stock defaults
//!   └── config.toml                        (site tooling, read with load_config)
//!         └── <script id="portfolio-config"> (JSON embedded in the page, read by the web host)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [theme]
//! storage_key = "theme"     # localStorage key for the light/dark flag
//! attribute = "data-theme"  # attribute set on <html>
//!
//! [nav]
//! compact_after = 100       # px scrolled before the navbar compacts
//! section_offset = 100      # px a section may sit below the viewport top and still be active
//! scroll_top_after = 300    # px scrolled before the scroll-to-top control shows
//!
//! [reveal]
//! threshold = 0.1
//! root_margin = "0px 0px -50px 0px"
//!
//! [counter]
//! duration_ms = 2000
//! frame_ms = 16
//!
//! [typing]
//! interval_ms = 100
//!
//! [parallax]
//! default_speed = 0.5
//! throttle = true           # coalesce updates to one per animation frame
//!
//! [form]
//! notice_ms = 5000
//!
//! [filter]
//! fade_ms = 300
//! reveal_delay_ms = 10
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::visibility::{ObserverOptions, RootMargin};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Page configuration.
///
/// All fields have defaults matching the reference page. Config sources need
/// only specify the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractConfig {
    /// Persisted light/dark flag.
    pub theme: ThemeConfig,
    /// Color schemes rendered into the page CSS.
    pub colors: ColorConfig,
    /// Navbar, active section and scroll-to-top thresholds.
    pub nav: NavConfig,
    /// Scroll reveal visibility settings.
    pub reveal: RevealConfig,
    /// Counter animation timing.
    pub counter: CounterConfig,
    /// Typing animation timing.
    pub typing: TypingConfig,
    /// Lazy image visibility settings.
    pub lazy: LazyConfig,
    /// Parallax speed and throttling.
    pub parallax: ParallaxConfig,
    /// Contact form notice settings.
    pub form: FormConfig,
    /// Project filter transition timing.
    pub filter: FilterConfig,
    /// Selectors making up the DOM contract.
    pub selectors: Selectors,
    /// Marker class names written by the behaviors.
    pub classes: Classes,
}

impl InteractConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, threshold) in [
            ("reveal.threshold", self.reveal.threshold),
            ("counter.threshold", self.counter.threshold),
            ("typing.threshold", self.typing.threshold),
            ("lazy.threshold", self.lazy.threshold),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::Validation(format!("{name} must be 0.0-1.0")));
            }
        }
        for (name, margin) in [
            ("reveal.root_margin", &self.reveal.root_margin),
            ("counter.root_margin", &self.counter.root_margin),
            ("typing.root_margin", &self.typing.root_margin),
            ("lazy.root_margin", &self.lazy.root_margin),
        ] {
            if RootMargin::parse(margin).is_none() {
                return Err(ConfigError::Validation(format!(
                    "{name} is not a valid margin: {margin:?}"
                )));
            }
        }
        if self.counter.frame_ms == 0 || self.counter.duration_ms == 0 {
            return Err(ConfigError::Validation(
                "counter.duration_ms and counter.frame_ms must be non-zero".into(),
            ));
        }
        if self.typing.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "typing.interval_ms must be non-zero".into(),
            ));
        }
        if !self.parallax.default_speed.is_finite() {
            return Err(ConfigError::Validation(
                "parallax.default_speed must be a finite number".into(),
            ));
        }
        if self.theme.storage_key.is_empty() {
            return Err(ConfigError::Validation(
                "theme.storage_key must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Persisted theme settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Browser-local storage key holding `"light"` or `"dark"`.
    pub storage_key: String,
    /// Attribute on the root element that CSS keys off.
    pub attribute: String,
    /// Inline transition applied to `<body>` on toggle.
    pub transition: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "theme".to_string(),
            attribute: "data-theme".to_string(),
            transition: "background 0.3s ease, color 0.3s ease".to_string(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    /// Cards, navbar and form fields.
    pub surface: String,
    pub text: String,
    /// Secondary text: captions, nav links, counters' labels.
    pub text_muted: String,
    /// Active nav link, active filter button, focus rings.
    pub accent: String,
    pub border: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            surface: "#f5f5f7".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            accent: "#4f46e5".to_string(),
            border: "#e0e0e0".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            surface: "#18181b".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            accent: "#818cf8".to_string(),
            border: "#333333".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

/// Navigation thresholds, in CSS pixels of vertical scroll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavConfig {
    pub compact_after: f64,
    pub section_offset: f64,
    pub scroll_top_after: f64,
    /// Navbar padding once compact.
    pub compact_padding: String,
    /// Navbar padding at the top of the page.
    pub expanded_padding: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            compact_after: 100.0,
            section_offset: 100.0,
            scroll_top_after: 300.0,
            compact_padding: "0.5rem 0".to_string(),
            expanded_padding: "1rem 0".to_string(),
        }
    }
}

/// Scroll reveal visibility settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    pub threshold: f64,
    pub root_margin: String,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
        }
    }
}

/// Counter animation timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CounterConfig {
    pub duration_ms: u32,
    /// Nominal animation frame length used to size the per-frame increment.
    pub frame_ms: u32,
    pub threshold: f64,
    pub root_margin: String,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            duration_ms: 2000,
            frame_ms: 16,
            threshold: 0.0,
            root_margin: "0px".to_string(),
        }
    }
}

/// Typing animation timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypingConfig {
    pub interval_ms: u32,
    pub threshold: f64,
    pub root_margin: String,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            threshold: 0.0,
            root_margin: "0px".to_string(),
        }
    }
}

/// Lazy image visibility settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LazyConfig {
    pub threshold: f64,
    pub root_margin: String,
}

impl Default for LazyConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: "0px".to_string(),
        }
    }
}

/// Parallax settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParallaxConfig {
    /// Speed used when an element has no usable `data-speed`.
    pub default_speed: f64,
    /// Coalesce scroll events into one update per animation frame.
    pub throttle: bool,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            default_speed: 0.5,
            throttle: true,
        }
    }
}

/// Contact form settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormConfig {
    /// How long the success notice stays in the form.
    pub notice_ms: u32,
    pub success_message: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            notice_ms: 5000,
            success_message: "Message sent successfully!".to_string(),
        }
    }
}

/// Project filter transition timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Fade-out length before a filtered item leaves the layout.
    pub fade_ms: u32,
    /// Pause between un-hiding an item and starting its fade-in.
    pub reveal_delay_ms: u32,
    /// Scale a filtered item shrinks to while fading.
    pub hidden_scale: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            fade_ms: 300,
            reveal_delay_ms: 10,
            hidden_scale: 0.8,
        }
    }
}

/// Selectors making up the DOM contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Selectors {
    pub theme_toggle: String,
    pub mobile_toggle: String,
    pub nav_menu: String,
    pub nav_link: String,
    pub navbar: String,
    pub section: String,
    pub reveal: String,
    pub counter: String,
    pub typing: String,
    pub lazy_image: String,
    pub parallax: String,
    pub scroll_top: String,
    pub contact_form: String,
    /// Fields inside the contact form that get submitted.
    pub form_fields: String,
    /// Fields inside the contact form that validate on blur.
    pub blur_fields: String,
    pub projects_grid: String,
    pub filter_button: String,
    pub project_item: String,
    pub anchor: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            theme_toggle: ".theme-toggle".to_string(),
            mobile_toggle: ".mobile-toggle".to_string(),
            nav_menu: ".nav-menu".to_string(),
            nav_link: ".nav-link".to_string(),
            navbar: ".navbar".to_string(),
            section: "section[id]".to_string(),
            reveal: ".animate-on-scroll".to_string(),
            counter: ".counter".to_string(),
            typing: ".typing-effect".to_string(),
            lazy_image: "img[data-src]".to_string(),
            parallax: ".parallax".to_string(),
            scroll_top: ".scroll-to-top".to_string(),
            contact_form: "#contact-form".to_string(),
            form_fields: "input, textarea, select".to_string(),
            blur_fields: "input, textarea".to_string(),
            projects_grid: ".projects-grid".to_string(),
            filter_button: ".filter-btn".to_string(),
            project_item: ".project-item".to_string(),
            anchor: r##"a[href^="#"]"##.to_string(),
        }
    }
}

/// Marker class names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Classes {
    /// Open menu, active nav link, active filter button.
    pub active: String,
    /// Revealed elements and the shown scroll-to-top control.
    pub visible: String,
    /// Images whose deferred source has been swapped in.
    pub loaded: String,
    pub field_error: String,
    pub field_success: String,
    /// Sibling slot receiving a field's validation message.
    pub error_message: String,
    pub form_message: String,
}

impl Default for Classes {
    fn default() -> Self {
        Self {
            active: "active".to_string(),
            visible: "visible".to_string(),
            loaded: "loaded".to_string(),
            field_error: "error".to_string(),
            field_success: "success".to_string(),
            error_message: "error-message".to_string(),
            form_message: "form-message".to_string(),
        }
    }
}

/// Build observer options from a validated threshold/margin pair.
///
/// An unparseable margin falls back to no margin; [`InteractConfig::validate`]
/// rejects those before they get here.
pub fn observer_options(threshold: f64, root_margin: &str) -> ObserverOptions {
    ObserverOptions {
        threshold,
        root_margin: RootMargin::parse(root_margin).unwrap_or_default(),
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(InteractConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<InteractConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: InteractConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<InteractConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Parse a JSON overlay (as embedded in the page) on top of stock defaults.
pub fn from_json_str(json: &str) -> Result<InteractConfig, ConfigError> {
    let overlay: toml::Value = serde_json::from_str(json)?;
    resolve_config(stock_defaults_value(), Some(overlay))
}

/// Serialize a config as the JSON the web host reads back with [`from_json_str`].
pub fn to_json_string(config: &InteractConfig) -> Result<String, ConfigError> {
    Ok(serde_json::to_string(config)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
pub fn stock_config_toml() -> &'static str {
    r##"# Portfolio Interactivity Configuration
# =====================================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Theme
# ---------------------------------------------------------------------------
[theme]
# localStorage key holding "light" or "dark".
storage_key = "theme"
# Attribute set on <html>; CSS selects on [data-theme="dark"].
attribute = "data-theme"
# Inline transition applied to <body> when the theme is toggled.
transition = "background 0.3s ease, color 0.3s ease"

[colors.light]
background = "#ffffff"
surface = "#f5f5f7"
text = "#111111"
text_muted = "#666666"
accent = "#4f46e5"
border = "#e0e0e0"

[colors.dark]
background = "#0a0a0a"
surface = "#18181b"
text = "#eeeeee"
text_muted = "#999999"
accent = "#818cf8"
border = "#333333"

# ---------------------------------------------------------------------------
# Navigation (pixels of vertical scroll)
# ---------------------------------------------------------------------------
[nav]
compact_after = 100.0
section_offset = 100.0
scroll_top_after = 300.0
compact_padding = "0.5rem 0"
expanded_padding = "1rem 0"

# ---------------------------------------------------------------------------
# Visibility-triggered effects
# ---------------------------------------------------------------------------
# threshold: fraction of the element that must be inside the viewport.
# root_margin: CSS margin shorthand applied to the viewport (px or %).
[reveal]
threshold = 0.1
root_margin = "0px 0px -50px 0px"

[counter]
duration_ms = 2000
frame_ms = 16
threshold = 0.0
root_margin = "0px"

[typing]
interval_ms = 100
threshold = 0.0
root_margin = "0px"

[lazy]
threshold = 0.0
root_margin = "0px"

# ---------------------------------------------------------------------------
# Parallax
# ---------------------------------------------------------------------------
[parallax]
# Used when an element has no data-speed attribute.
default_speed = 0.5
# Apply at most one update per animation frame.
throttle = true

# ---------------------------------------------------------------------------
# Contact form
# ---------------------------------------------------------------------------
[form]
notice_ms = 5000
success_message = "Message sent successfully!"

# ---------------------------------------------------------------------------
# Project filter
# ---------------------------------------------------------------------------
[filter]
fade_ms = 300
reveal_delay_ms = 10
hidden_scale = 0.8

# ---------------------------------------------------------------------------
# DOM contract
# ---------------------------------------------------------------------------
[selectors]
theme_toggle = ".theme-toggle"
mobile_toggle = ".mobile-toggle"
nav_menu = ".nav-menu"
nav_link = ".nav-link"
navbar = ".navbar"
section = "section[id]"
reveal = ".animate-on-scroll"
counter = ".counter"
typing = ".typing-effect"
lazy_image = "img[data-src]"
parallax = ".parallax"
scroll_top = ".scroll-to-top"
contact_form = "#contact-form"
form_fields = "input, textarea, select"
blur_fields = "input, textarea"
projects_grid = ".projects-grid"
filter_button = ".filter-btn"
project_item = ".project-item"
anchor = 'a[href^="#"]'

[classes]
active = "active"
visible = "visible"
loaded = "loaded"
field_error = "error"
field_success = "success"
error_message = "error-message"
form_message = "form-message"
"##
}

/// Generate CSS custom properties for both themes, keyed on the theme attribute.
pub fn generate_theme_css(theme: &ThemeConfig, colors: &ColorConfig) -> String {
    format!(
        r#":root, [{attr}="light"] {{
    --color-bg: {light_bg};
    --color-surface: {light_surface};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-accent: {light_accent};
    --color-border: {light_border};
}}

[{attr}="dark"] {{
    --color-bg: {dark_bg};
    --color-surface: {dark_surface};
    --color-text: {dark_text};
    --color-text-muted: {dark_text_muted};
    --color-accent: {dark_accent};
    --color-border: {dark_border};
}}"#,
        attr = theme.attribute,
        light_bg = colors.light.background,
        light_surface = colors.light.surface,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_accent = colors.light.accent,
        light_border = colors.light.border,
        dark_bg = colors.dark.background,
        dark_surface = colors.dark.surface,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_accent = colors.dark.accent,
        dark_border = colors.dark.border,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_reference_page() {
        let config = InteractConfig::default();
        assert_eq!(config.theme.storage_key, "theme");
        assert_eq!(config.nav.compact_after, 100.0);
        assert_eq!(config.nav.scroll_top_after, 300.0);
        assert_eq!(config.reveal.threshold, 0.1);
        assert_eq!(config.counter.duration_ms, 2000);
        assert_eq!(config.typing.interval_ms, 100);
        assert_eq!(config.form.notice_ms, 5000);
        assert_eq!(config.filter.fade_ms, 300);
        assert_eq!(config.selectors.contact_form, "#contact-form");
        assert_eq!(config.selectors.blur_fields, "input, textarea");
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(InteractConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[counter]
duration_ms = 1000
"#;
        let config: InteractConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.counter.duration_ms, 1000);
        // Defaults preserved
        assert_eq!(config.counter.frame_ms, 16);
        assert_eq!(config.typing.interval_ms, 100);
    }

    #[test]
    fn observer_options_from_reveal_defaults() {
        let config = InteractConfig::default();
        let options = observer_options(config.reveal.threshold, &config.reveal.root_margin);
        assert_eq!(options.threshold, 0.1);
        assert_eq!(options.root_margin.bottom.resolve(800.0), -50.0);
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_threshold_out_of_range() {
        let mut config = InteractConfig::default();
        config.reveal.threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("reveal.threshold"));
    }

    #[test]
    fn validate_bad_root_margin() {
        let mut config = InteractConfig::default();
        config.lazy.root_margin = "10em".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("lazy.root_margin"));
    }

    #[test]
    fn validate_zero_timings() {
        let mut config = InteractConfig::default();
        config.counter.frame_ms = 0;
        assert!(config.validate().is_err());

        let mut config = InteractConfig::default();
        config.typing.interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_storage_key() {
        let mut config = InteractConfig::default();
        config.theme.storage_key.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Loading tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.theme.storage_key, "theme");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[theme]
storage_key = "site-theme"

[filter]
fade_ms = 150
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.theme.storage_key, "site-theme");
        assert_eq!(config.filter.fade_ms, 150);
        assert_eq!(config.theme.attribute, "data-theme");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[reveal]
threshold = 2.0
"#,
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn json_overlay_merges_onto_defaults() {
        let config = from_json_str(r#"{"typing": {"interval_ms": 40}}"#).unwrap();
        assert_eq!(config.typing.interval_ms, 40);
        assert_eq!(config.counter.duration_ms, 2000);
    }

    #[test]
    fn json_round_trip_through_page_script() {
        let mut config = InteractConfig::default();
        config.nav.compact_after = 64.0;
        let json = to_json_string(&config).unwrap();
        let back = from_json_str(&json).unwrap();
        assert_eq!(back.nav.compact_after, 64.0);
    }

    #[test]
    fn json_unknown_key_rejected() {
        let result = from_json_str(r#"{"typing": {"intervall_ms": 40}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_json_is_error() {
        assert!(matches!(from_json_str("{"), Err(ConfigError::Json(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r##"
[colors.light]
background = "#fff"
text = "#000"
"##,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r##"
[colors.light]
background = "#fafafa"
"##,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let light = merged.get("colors").unwrap().get("light").unwrap();
        assert_eq!(light.get("background").unwrap().as_str(), Some("#fafafa"));
        assert_eq!(light.get("text").unwrap().as_str(), Some("#000"));
    }

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[nav]
compact_afer = 90
"#;
        let result: Result<InteractConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: InteractConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = InteractConfig::default();
        assert_eq!(config.reveal.root_margin, defaults.reveal.root_margin);
        assert_eq!(config.selectors.anchor, defaults.selectors.anchor);
        assert_eq!(config.selectors.blur_fields, defaults.selectors.blur_fields);
        assert_eq!(config.colors.dark.accent, defaults.colors.dark.accent);
        assert_eq!(config.parallax.default_speed, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        for section in ["theme", "colors", "nav", "reveal", "counter", "typing"] {
            assert!(val.get(section).is_some(), "missing [{section}]");
        }
        for section in ["lazy", "parallax", "form", "filter", "selectors", "classes"] {
            assert!(val.get(section).is_some(), "missing [{section}]");
        }
    }

    // =========================================================================
    // CSS generation tests
    // =========================================================================

    #[test]
    fn theme_css_keys_on_attribute() {
        let config = InteractConfig::default();
        let css = generate_theme_css(&config.theme, &config.colors);
        assert!(css.contains(r#"[data-theme="dark"]"#));
        assert!(css.contains("--color-bg: #0a0a0a"));
        assert!(css.contains("--color-bg: #ffffff"));
    }
}
