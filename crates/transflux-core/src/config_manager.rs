//! 설정 파일 관리.
//!
//! JSON 설정 파일을 로드하고 검증한다. 파일이 없으면 기본 설정 템플릿을
//! 생성한 뒤 에러를 반환한다 (자격증명 없이 수집을 시작하지 않기 위함).

use crate::config::AppConfig;
use crate::error::CoreError;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 설정 파일 이름
const CONFIG_FILE_NAME: &str = "config.json";

/// 설정 관리자
///
/// 로드 이후 설정은 변경되지 않는다.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: AppConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    /// 지정된 경로에서 설정 로드 및 검증
    pub fn load(config_path: PathBuf) -> Result<Self, CoreError> {
        if !config_path.exists() {
            Self::write_template(&config_path)?;
            return Err(CoreError::Config(format!(
                "설정 파일이 없어 기본 템플릿을 생성했습니다. 수정 후 다시 실행하세요: {}",
                config_path.display()
            )));
        }

        let config = Self::load_from_file(&config_path)?;
        config.validate()?;

        info!(
            "설정 로드 완료: {} (클라이언트 {}개, 주기 {}초)",
            config_path.display(),
            config.transmission_clients.len(),
            config.seconds_between_collections
        );

        Ok(Self {
            config,
            config_path,
        })
    }

    /// 설정 파일 경로 결정
    ///
    /// 명시 경로 → 현재 디렉토리의 `config.json` → 플랫폼 설정 디렉토리 순.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return local;
        }

        ProjectDirs::from("com", "transflux", "collector")
            .map(|p| p.config_dir().join(CONFIG_FILE_NAME))
            .unwrap_or(local)
    }

    /// 현재 설정 참조
    pub fn get(&self) -> &AppConfig {
        &self.config
    }

    /// 설정 파일 경로 반환
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 파일에서 설정 로드
    fn load_from_file(path: &Path) -> Result<AppConfig, CoreError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("설정 파일 읽기 실패: {}: {}", path.display(), e))
        })?;

        let config: AppConfig = serde_json::from_str(&content).map_err(|e| {
            CoreError::Config(format!("설정 파일 파싱 실패: {}: {}", path.display(), e))
        })?;

        debug!("설정 파일 로드 완료: {}", path.display());
        Ok(config)
    }

    /// 기본 설정 템플릿 저장
    fn write_template(path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    CoreError::Config(format!(
                        "설정 디렉토리 생성 실패: {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(&AppConfig::default_config())
            .map_err(|e| CoreError::Config(format!("설정 직렬화 실패: {}", e)))?;

        fs::write(path, content).map_err(|e| {
            CoreError::Config(format!("설정 파일 저장 실패: {}: {}", path.display(), e))
        })?;

        info!("기본 설정 파일 생성: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_writes_template_and_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.json");

        let result = ConfigManager::load(config_path.clone());
        assert!(matches!(result, Err(CoreError::Config(_))));
        assert!(config_path.exists());

        // 생성된 템플릿은 그대로 로드 가능해야 한다
        let manager = ConfigManager::load(config_path).unwrap();
        assert_eq!(manager.get().influxdb.host_port, 8086);
    }

    #[test]
    fn load_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let mut config = AppConfig::default_config();
        config.seconds_between_collections = 15;
        fs::write(&config_path, serde_json::to_string(&config).unwrap()).unwrap();

        let manager = ConfigManager::load(config_path.clone()).unwrap();
        assert_eq!(manager.get().seconds_between_collections, 15);
        assert_eq!(manager.config_path(), config_path.as_path());
    }

    #[test]
    fn load_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let mut config = AppConfig::default_config();
        config.transmission_clients[0].rpc_port = 0;
        fs::write(&config_path, serde_json::to_string(&config).unwrap()).unwrap();

        let result = ConfigManager::load(config_path);
        assert!(matches!(result, Err(CoreError::Validation { .. })));
    }

    #[test]
    fn load_rejects_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, "{ not json").unwrap();

        let err = ConfigManager::load(config_path).unwrap_err();
        assert!(err.to_string().contains("파싱"));
    }

    #[test]
    fn explicit_path_wins() {
        let path = PathBuf::from("/etc/transflux/custom.json");
        assert_eq!(ConfigManager::resolve_path(Some(&path)), path);
    }
}
