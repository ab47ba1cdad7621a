//! Settings - `--config-path` の設定オブジェクト（suspend フラグ）
//!
//! 次の 2 形式を受け付けます:
//! - ConfigMap 形式の YAML / JSON ファイル（`data.suspend`）
//! - ConfigMap をマウントしたディレクトリ（`suspend` ファイル、旧形式の `disabled` ファイル）
//!
//! 値は大文字小文字を無視して `"true"` のときだけ真とみなします。

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const SUSPEND_KEY: &str = "suspend";
const LEGACY_DISABLED_KEY: &str = "disabled";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub suspend: bool,
}

/// ConfigMap のうち必要な部分だけ
#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    data: BTreeMap<String, serde_yaml::Value>,
}

fn is_truthy(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// `suspend: "true"` と `suspend: true` の両方を受け付ける
fn is_truthy_value(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Bool(b) => *b,
        serde_yaml::Value::String(s) => is_truthy(s),
        _ => false,
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let read_err = |source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        };

        if fs::metadata(path).map_err(read_err)?.is_dir() {
            return Self::load_dir(path);
        }

        let contents = fs::read_to_string(path).map_err(read_err)?;
        // 空ファイルは data なしとして扱う
        let doc: ConfigDocument = if contents.trim().is_empty() {
            ConfigDocument::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };

        Ok(Self {
            suspend: doc.data.get(SUSPEND_KEY).is_some_and(is_truthy_value),
        })
    }

    fn load_dir(dir: &Path) -> Result<Self, SettingsError> {
        for key in [SUSPEND_KEY, LEGACY_DISABLED_KEY] {
            let path = dir.join(key);
            match fs::read_to_string(&path) {
                Ok(value) => {
                    return Ok(Self {
                        suspend: is_truthy(&value),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(SettingsError::Read { path, source }),
            }
        }
        Ok(Self::default())
    }
}
