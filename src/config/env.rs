use crate::error::{IntakeFlowError, Result};
use anyhow::anyhow;
use std::env;

pub const DEBUG_ENV: &str = "INTAKEFLOW_DEBUG";
pub const CALENDAR_ID_ENV: &str = "INTAKEFLOW_CALENDAR_ID";
const LEGACY_CALENDAR_ID_ENV: &str = "EMAIL_ID";

/// 环境变量配置管理
pub struct EnvConfig;

impl EnvConfig {
    /// 解析配置值
    ///
    /// `${VAR_NAME}` 形式从环境变量读取，其余原样返回。
    pub fn resolve(value: &str) -> Result<String> {
        match value.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
            Some(name) => Self::get_env(name),
            None => Ok(value.to_string()),
        }
    }

    /// 从环境变量获取值
    pub fn get_env(key: &str) -> Result<String> {
        env::var(key).map_err(|_| {
            IntakeFlowError::Other(anyhow!(
                "environment variable `{}` is not set",
                key
            ))
        })
    }

    /// 获取可选的环境变量
    pub fn get_env_optional(key: &str) -> Option<String> {
        env::var(key).ok()
    }

    pub fn is_debug_mode() -> bool {
        env::var(DEBUG_ENV).is_ok()
    }

    /// 预约日历标识，兼容旧的 `EMAIL_ID`
    pub fn calendar_id() -> Option<String> {
        Self::get_env_optional(CALENDAR_ID_ENV)
            .or_else(|| Self::get_env_optional(LEGACY_CALENDAR_ID_ENV))
            .filter(|id| !id.is_empty())
    }
}
