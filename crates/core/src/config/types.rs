use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub upload: UploadConfig,
    #[serde(default)]
    pub gallery: Option<GalleryConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted request body in MiB (default: 50)
    #[serde(default = "default_max_body_mb")]
    pub max_body_mb: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_mb: default_max_body_mb(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_mb() -> u32 {
    50
}

/// Remote upload endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Upload server base URL (e.g., "http://192.168.1.168:3001").
    /// Files are POSTed to `{url}/upload`.
    pub url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Folder every new upload session starts with (default: "folder_1")
    #[serde(default = "default_folder")]
    pub default_folder: String,
}

/// Gallery listing upstream configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GalleryConfig {
    /// Upstream base URL; listings are fetched from `{base_url}/{username}`
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

fn default_folder() -> String {
    "folder_1".to_string()
}

/// Sanitized config for API responses (upstream locations redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub upload: SanitizedUploadConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery: Option<SanitizedGalleryConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedUploadConfig {
    pub url: String,
    pub timeout_secs: u32,
    pub default_folder: String,
}

/// Sanitized gallery config (base URL hidden, just shows if configured)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGalleryConfig {
    pub base_url_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            upload: SanitizedUploadConfig {
                url: config.upload.url.clone(),
                timeout_secs: config.upload.timeout_secs,
                default_folder: config.upload.default_folder.clone(),
            },
            gallery: config.gallery.as_ref().map(|g| SanitizedGalleryConfig {
                base_url_configured: !g.base_url.is_empty(),
                timeout_secs: g.timeout_secs,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[upload]
url = "http://uploads.local:3001"
timeout_secs = 10
default_folder = "inbox"

[gallery]
base_url = "http://gallery.local/api"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.upload.url, "http://uploads.local:3001");
        assert_eq!(config.upload.timeout_secs, 10);
        assert_eq!(config.upload.default_folder, "inbox");

        let gallery = config.gallery.as_ref().unwrap();
        assert_eq!(gallery.base_url, "http://gallery.local/api");
        assert_eq!(gallery.timeout_secs, 30);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let toml = r#"
[upload]
url = "http://uploads.local:3001"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.upload.timeout_secs, 30);
        assert_eq!(config.upload.default_folder, "folder_1");
        assert!(config.gallery.is_none());
    }

    #[test]
    fn test_deserialize_missing_upload_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_gallery_url() {
        let config = Config {
            server: ServerConfig::default(),
            upload: UploadConfig {
                url: "http://uploads.local:3001".to_string(),
                timeout_secs: 30,
                default_folder: "folder_1".to_string(),
            },
            gallery: Some(GalleryConfig {
                base_url: "http://internal-gallery:9000".to_string(),
                timeout_secs: 5,
            }),
        };

        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.upload.url, "http://uploads.local:3001");
        let gallery = sanitized.gallery.as_ref().unwrap();
        assert!(gallery.base_url_configured);
        assert_eq!(gallery.timeout_secs, 5);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("internal-gallery"));
    }

    #[test]
    fn test_sanitized_config_without_gallery() {
        let config: Config = toml::from_str(
            r#"
[upload]
url = "http://uploads.local:3001"
"#,
        )
        .unwrap();
        let json = serde_json::to_value(SanitizedConfig::from(&config)).unwrap();
        assert!(json.get("gallery").is_none());
        assert_eq!(json["upload"]["default_folder"], "folder_1");
    }
}
