//! Typed YAML decoding for config layers

use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Decode `content`, reporting errors against `filename`
pub fn parse_yaml<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content)
        .map_err(|e| YamlError::Syntax(YamlSyntaxError::from_serde_error(&e, content, filename)))
}

/// Read one config layer; a missing or blank file is no layer at all
pub fn read_layer<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, YamlError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if content.trim().is_empty() {
        tracing::debug!(path = %path.display(), "config file is empty");
        return Ok(None);
    }
    parse_yaml(&content, &path.display().to_string()).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Window {
        window_days: u32,
        staleness_days: u32,
    }

    #[test]
    fn test_parse_valid_yaml() {
        let yaml = "window_days: 21\nstaleness_days: 2";
        let result: Window = parse_yaml(yaml, "stockpile.yaml").unwrap();
        assert_eq!(result.window_days, 21);
        assert_eq!(result.staleness_days, 2);
    }

    #[test]
    fn test_parse_invalid_yaml_returns_error() {
        let yaml = "window_days: 21\n  staleness_days: [";
        let result: Result<Window, _> = parse_yaml(yaml, "stockpile.yaml");
        assert!(matches!(result, Err(YamlError::Syntax(_))));
    }

    #[test]
    fn test_missing_or_blank_file_is_no_layer() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("stockpile.yaml");
        assert_eq!(read_layer::<Window>(&path).unwrap(), None);

        fs::write(&path, "\n  \n").unwrap();
        assert_eq!(read_layer::<Window>(&path).unwrap(), None);

        fs::write(&path, "window_days: 7\nstaleness_days: 1\n").unwrap();
        assert_eq!(
            read_layer::<Window>(&path).unwrap(),
            Some(Window {
                window_days: 7,
                staleness_days: 1
            })
        );
    }
}
