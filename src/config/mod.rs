mod types;

pub use types::*;

use crate::batch::Conversion;
use anyhow::{Context, Result};
use std::path::Path;

/// Locations searched when no config file is given.
const DEFAULT_PATHS: &[&str] = &["./vidbatch.toml", "~/.config/vidbatch/config.toml"];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config).with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    Conversion::from_config(config)?;

    for (name, path) in [
        ("ffmpeg", &config.tools.ffmpeg_path),
        ("ffprobe", &config.tools.ffprobe_path),
    ] {
        if let Some(path) = path {
            if !path.exists() {
                tracing::warn!("Configured {} path does not exist: {:?}", name, path);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_historical_constants() {
        let config = Config::default();
        assert_eq!(config.naming.source_pattern, r"\.avi$");
        assert_eq!(config.naming.video_suffix, " AD.avi");
        assert_eq!(config.naming.image_suffix, ".jpg");
        assert!(config.naming.image_rename.enabled);
        assert_eq!(config.pipeline.first_frame, 3);
        assert_eq!(config.pipeline.target_fps, 7.5);
        assert_eq!(config.pipeline.rotation.angle, 90.0);
        assert_eq!(config.pipeline.codec.id, "mjpeg");
        assert_eq!(config.pipeline.codec.mode, BitrateMode::Cbr);
        assert_eq!(config.pipeline.codec.value, 1000);
        assert_eq!(config.pipeline.container, "avi");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = write_config(
            r#"
[naming]
video_suffix = ".converted.avi"

[pipeline]
first_frame = 0

[pipeline.codec]
mode = "quantizer"
value = 4
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.naming.video_suffix, ".converted.avi");
        assert_eq!(config.naming.source_pattern, r"\.avi$");
        assert_eq!(config.pipeline.first_frame, 0);
        assert_eq!(config.pipeline.codec.mode, BitrateMode::Quantizer);
        assert_eq!(config.pipeline.codec.id, "mjpeg");
        assert_eq!(config.pipeline.rotation.width, 480);
    }

    #[test]
    fn image_rename_can_be_disabled() {
        let file = write_config("[naming.image_rename]\nenabled = false\n");
        let config = load_config(file.path()).unwrap();
        assert!(!config.naming.image_rename.enabled);
        assert_eq!(config.naming.image_rename.pattern, "^c");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let file = write_config("[naming]\nsource_pattern = \"(unclosed\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        for contents in [
            "[pipeline]\ntarget_fps = 0.0\n",
            "[pipeline]\ncontainer = \"flv\"\n",
            "[pipeline.codec]\nvalue = 0\n",
            "[pipeline.rotation]\nwidth = 0\n",
            "[naming]\nvideo_suffix = \"\"\n",
        ] {
            let file = write_config(contents);
            assert!(load_config(file.path()).is_err(), "accepted: {contents}");
        }
    }

    #[test]
    fn missing_custom_path_is_an_error() {
        assert!(load_config_or_default(Some(Path::new("/does/not/exist.toml"))).is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.naming.video_suffix, " AD.avi");
        assert_eq!(parsed.pipeline.container, "avi");
    }
}
