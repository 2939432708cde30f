use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Body limit is not 0
/// - Upload URL is an http(s) URL
/// - Upload and gallery timeouts are not 0
/// - Default folder is not empty
/// - Gallery base URL (if configured) is an http(s) URL
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.server.max_body_mb == 0 {
        return Err(ConfigError::ValidationError(
            "server.max_body_mb cannot be 0".to_string(),
        ));
    }

    if !is_http_url(&config.upload.url) {
        return Err(ConfigError::ValidationError(format!(
            "upload.url must be an http(s) URL, got {:?}",
            config.upload.url
        )));
    }

    if config.upload.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "upload.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.upload.default_folder.is_empty() {
        return Err(ConfigError::ValidationError(
            "upload.default_folder cannot be empty".to_string(),
        ));
    }

    if let Some(gallery) = &config.gallery {
        if !is_http_url(&gallery.base_url) {
            return Err(ConfigError::ValidationError(format!(
                "gallery.base_url must be an http(s) URL, got {:?}",
                gallery.base_url
            )));
        }
        if gallery.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "gallery.timeout_secs cannot be 0".to_string(),
            ));
        }
    }

    Ok(())
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    matches!(rest, Some(host) if !host.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GalleryConfig, ServerConfig, UploadConfig};
    use std::net::IpAddr;

    fn valid_config() -> Config {
        Config {
            server: ServerConfig::default(),
            upload: UploadConfig {
                url: "http://localhost:3001".to_string(),
                timeout_secs: 30,
                default_folder: "folder_1".to_string(),
            },
            gallery: None,
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server = ServerConfig {
            host: "0.0.0.0".parse::<IpAddr>().unwrap(),
            port: 0,
            ..ServerConfig::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_body_limit_zero_fails() {
        let mut config = valid_config();
        config.server.max_body_mb = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_timeouts_fail() {
        let mut config = valid_config();
        config.upload.timeout_secs = 0;
        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("upload.timeout_secs")),
            other => panic!("expected validation error, got {:?}", other),
        }

        let mut config = valid_config();
        config.gallery = Some(GalleryConfig {
            base_url: "https://gallery.example.com".to_string(),
            timeout_secs: 0,
        });
        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("gallery.timeout_secs"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_non_http_upload_url() {
        for url in ["", "ftp://host", "http://", "localhost:3001"] {
            let mut config = valid_config();
            config.upload.url = url.to_string();
            assert!(validate_config(&config).is_err(), "accepted {:?}", url);
        }
    }

    #[test]
    fn test_validate_rejects_empty_default_folder() {
        let mut config = valid_config();
        config.upload.default_folder = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_gallery_url() {
        let mut config = valid_config();
        config.gallery = Some(GalleryConfig {
            base_url: "https://gallery.example.com".to_string(),
            timeout_secs: 30,
        });
        assert!(validate_config(&config).is_ok());

        config.gallery = Some(GalleryConfig {
            base_url: "gallery.example.com".to_string(),
            timeout_secs: 30,
        });
        assert!(validate_config(&config).is_err());
    }
}
