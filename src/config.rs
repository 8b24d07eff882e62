use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

use crate::error::{EmitterError, EmitterResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Label attached to this registry's log records.
    #[serde(default = "default_name")]
    pub name: String,

    /// Log a warning once an event holds more registrations than this.
    /// Never rejects a registration.
    #[serde(default)]
    pub max_listeners_warning: Option<usize>,

    /// Read `"a b"` as the two events `a` and `b`.
    #[serde(default = "default_true")]
    pub split_whitespace: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            max_listeners_warning: None,
            split_whitespace: default_true(),
        }
    }
}

impl EmitterConfig {
    // JSONファイルから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> EmitterResult<Self> {
        from_file(path)
    }

    pub fn from_str(s: &str) -> EmitterResult<Self> {
        from_str(s)
    }
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> EmitterResult<T> {
    let file = File::open(path)
        .map_err(|e| EmitterError::Config(format!("Failed to open config file: {}", e)))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| EmitterError::Config(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> EmitterResult<T> {
    let config = serde_json::from_str(s)
        .map_err(|e| EmitterError::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

// デフォルト値の定義
fn default_name() -> String {
    "emitter".to_string()
}

fn default_true() -> bool {
    true
}
