use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub compare: CompareConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompareConfig {
    /// 時間窓半径W（基準フレームごとに比較側を ±W フレーム探索）
    #[serde(default = "default_window")]
    pub window: i32,
    /// キーポイント採用の可視度閾値（これ以下は関節角を無効扱い）
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f32,
    /// レポートスコアの小数点以下桁数
    #[serde(default = "default_precision")]
    pub precision: u32,
}

fn default_window() -> i32 { 3 }
fn default_visibility_threshold() -> f32 { 0.5 }
fn default_precision() -> u32 { 2 }

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            visibility_threshold: default_visibility_threshold(),
            precision: default_precision(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 設定ファイルが無い・壊れている場合はデフォルト設定を返す
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }
}
