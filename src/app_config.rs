//! Application configuration loading for CLI defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use literature_core::ClientConfig;
use literature_core::settings::default_config_dir;

const CONFIG_FILE_NAME: &str = "config.toml";

/// File configuration for CLI defaults. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Base URL of the literature service.
    pub base_url: Option<String>,
    /// Page size for `list` when `--size` is not given (1..=100).
    pub page_size: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
    /// Whole-request timeout for API calls.
    pub request_timeout_secs: Option<u64>,
    /// Give up on a batch import with no terminal event after this long.
    pub import_timeout_secs: Option<u64>,
    /// Default directory for downloads.
    pub output_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(page_size) = self.page_size
            && !(1..=100).contains(&page_size)
        {
            bail!("Invalid config value for `page_size`: {page_size}. Expected range: 1..=100");
        }
        if let Some(base_url) = &self.base_url
            && !(base_url.starts_with("http://") || base_url.starts_with("https://"))
        {
            bail!("Invalid config value for `base_url`: '{base_url}'. Expected an http(s) URL");
        }
        validate_range("connect_timeout_secs", self.connect_timeout_secs, 3600)?;
        validate_range("request_timeout_secs", self.request_timeout_secs, 3600)?;
        validate_range("import_timeout_secs", self.import_timeout_secs, 86_400)?;
        Ok(())
    }

    /// Client settings with this file's values applied over the defaults.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::default();
        if let Some(base_url) = &self.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(secs) = self.connect_timeout_secs {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        config
    }
}

fn validate_range(field: &str, value: Option<u64>, max: u64) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=max).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..={max}");
    }
    Ok(())
}

/// Loaded config metadata.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config, or defaults when no file exists.
    pub config: FileConfig,
    /// Indicates whether configuration was loaded from disk.
    pub loaded_from_file: bool,
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/literature-assistant/config.toml`
/// 2. `$HOME/.config/literature-assistant/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    match path.as_deref() {
        Some(path_ref) if path_ref.exists() => {
            let config = load_file_config(path_ref)?;
            Ok(LoadedConfig {
                path,
                config,
                loaded_from_file: true,
            })
        }
        _ => Ok(LoadedConfig {
            path,
            ..LoadedConfig::default()
        }),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "base_url" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.base_url = Some(parsed.trim_end_matches('/').to_string());
            }
            "page_size" => {
                let parsed = parse_integer_u64(value).with_context(invalid)?;
                let n = u32::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("page_size out of range for u32"))?;
                cfg.page_size = Some(n);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "request_timeout_secs" => {
                cfg.request_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "import_timeout_secs" => {
                cfg.import_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "output_dir" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.output_dir = Some(PathBuf::from(parsed));
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    struct RestoreEnv {
        xdg: Option<OsString>,
    }

    impl Drop for RestoreEnv {
        fn drop(&mut self) {
            // SAFETY: tests touching XDG_CONFIG_HOME run single-threaded within this module.
            unsafe {
                match self.xdg.take() {
                    Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
                    None => std::env::remove_var("XDG_CONFIG_HOME"),
                }
            }
        }
    }

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
base_url = "http://docs.internal:8081/"
page_size = 25
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.base_url.as_deref(), Some("http://docs.internal:8081"));
        assert_eq!(cfg.page_size, Some(25));
        assert!(cfg.output_dir.is_none());
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
output_dir = "/tmp/papers#1" # where downloads go
import_timeout_secs = 600 # ten minutes
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/tmp/papers#1")));
        assert_eq!(cfg.import_timeout_secs, Some(600));
    }

    #[test]
    fn test_parse_config_rejects_invalid_page_size() {
        let err = parse_config_str("page_size = 0").expect_err("invalid page_size expected");
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_parse_config_rejects_non_http_base_url() {
        let err = parse_config_str(r#"base_url = "ftp://x""#).expect_err("invalid base_url expected");
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_parse_config_rejects_out_of_range_timeout() {
        let err = parse_config_str("request_timeout_secs = 3601").expect_err("timeout range");
        assert!(err.to_string().contains("request_timeout_secs"));
        let err = parse_config_str("import_timeout_secs = 0").expect_err("timeout range");
        assert!(err.to_string().contains("import_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_trailing_tokens_and_unknown_keys() {
        let err = parse_config_str("page_size = 4 trailing").expect_err("trailing token");
        assert!(format!("{err:#}").contains("line 1"));
        let err = parse_config_str("\nconcurrency = 4").expect_err("unknown key");
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("base_url").expect_err("syntax error expected");
        assert!(err.to_string().contains("expected key = value"));
    }

    #[test]
    fn test_client_config_applies_overrides() {
        let cfg = FileConfig {
            base_url: Some("http://example.test".to_string()),
            request_timeout_secs: Some(5),
            ..FileConfig::default()
        };
        let client = cfg.client_config();
        assert_eq!(client.base_url, "http://example.test");
        assert_eq!(client.request_timeout, Duration::from_secs(5));
        assert_eq!(client.connect_timeout, ClientConfig::default().connect_timeout);
    }

    #[test]
    fn test_load_default_file_config_reads_xdg_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app_dir = dir.path().join("literature-assistant");
        fs::create_dir_all(&app_dir).expect("create config dir");
        fs::write(app_dir.join("config.toml"), "page_size = 50\n").expect("write config");

        let _restore = RestoreEnv {
            xdg: std::env::var_os("XDG_CONFIG_HOME"),
        };
        // SAFETY: restored by RestoreEnv; no other test in this binary reads XDG_CONFIG_HOME concurrently.
        unsafe { std::env::set_var("XDG_CONFIG_HOME", dir.path()) };

        let loaded = load_default_file_config().expect("config should load");
        assert!(loaded.loaded_from_file);
        assert_eq!(loaded.config.page_size, Some(50));
        assert_eq!(loaded.path, Some(app_dir.join("config.toml")));
    }
}
