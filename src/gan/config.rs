/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : WGAN-GP 配置（可从 JSON 加载）
 */

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败：{0}")]
    Io(#[from] std::io::Error),
    #[error("解析配置失败：{0}")]
    Json(#[from] serde_json::Error),
    #[error("配置无效：{0}")]
    Invalid(String),
}

/// WGAN-GP 超参数
///
/// JSON 中缺省的字段取默认值，未知字段报错：
/// ```json
/// { "gradient_penalty_coefficient": 10.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WganGpConfig {
    /// 梯度惩罚项系数 λ
    pub gradient_penalty_coefficient: f32,
}

impl Default for WganGpConfig {
    fn default() -> Self {
        Self {
            gradient_penalty_coefficient: 10.0,
        }
    }
}

impl WganGpConfig {
    pub fn new(gradient_penalty_coefficient: f32) -> Result<Self, ConfigError> {
        let config = Self {
            gradient_penalty_coefficient,
        };
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 字符串解析
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 惩罚项系数必须是有限的非负数
    pub fn validate(&self) -> Result<(), ConfigError> {
        let coefficient = self.gradient_penalty_coefficient;
        if !coefficient.is_finite() || coefficient < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "gradient_penalty_coefficient 必须是有限的非负数，但得到{}",
                coefficient
            )));
        }
        Ok(())
    }
}
