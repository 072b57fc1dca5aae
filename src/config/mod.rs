// Application configuration with layered loading.
// Precedence (highest wins): LUOGU_BADGES_* env, TOML file, built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

const ENV_PREFIX: &str = "LUOGU_BADGES_";
const CONFIG_FILE_ENV: &str = "LUOGU_BADGES_CONFIG_FILE";

/// Query parameters for a practice card rendered by the badge service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardParams {
    pub id: u64,
    pub custom: bool,
    pub name: String,
    pub color: String,
    pub ccf_level: u8,
    #[serde(default)]
    pub tag: String,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Luogu user whose practice page is scraped.
    #[serde(default = "default_user_id")]
    pub user_id: u64,

    /// Practice page URL; `{user_id}` is substituted.
    #[serde(default = "default_practice_url")]
    pub practice_url: String,

    /// Problem list URL; the difficulty tier is appended.
    #[serde(default = "default_problem_list_url")]
    pub problem_list_url: String,

    /// Base URL of the practice card rendering service.
    #[serde(default = "default_card_api_base")]
    pub card_api_base: String,

    /// Card parameters for the personal statistics image.
    #[serde(default = "default_personal_card")]
    pub personal: CardParams,

    /// Card parameters for the domination (global totals) image.
    #[serde(default = "default_domination_card")]
    pub domination: CardParams,

    /// Label of the weighted progress badge.
    #[serde(default = "default_progress_label")]
    pub progress_label: String,

    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    #[serde(default = "default_document_path")]
    pub document_path: PathBuf,

    /// Heading used when the document does not exist yet.
    #[serde(default = "default_document_title")]
    pub document_title: String,

    /// Directory the badge images are mirrored into.
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// Mirror badge images locally instead of linking remote URLs.
    #[serde(default = "default_true")]
    pub download_images: bool,

    /// Minimum age of the personal statistics before refetching.
    #[serde(default = "default_personal_refresh_secs")]
    pub personal_refresh_secs: u64,

    /// Minimum age of the global tier totals before refetching.
    #[serde(default = "default_totals_refresh_secs")]
    pub totals_refresh_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_user_id() -> u64 {
    513997
}

fn default_practice_url() -> String {
    "https://www.luogu.com.cn/user/{user_id}/practice".into()
}

fn default_problem_list_url() -> String {
    "https://www.luogu.com.cn/problem/list?type=luogu&difficulty=".into()
}

fn default_card_api_base() -> String {
    "https://api.jerryz.com.cn/practice".into()
}

fn default_personal_card() -> CardParams {
    CardParams {
        id: default_user_id(),
        custom: true,
        name: "AmaoFox".into(),
        color: "Red".into(),
        ccf_level: 8,
        tag: String::new(),
    }
}

fn default_domination_card() -> CardParams {
    CardParams {
        id: 1,
        custom: true,
        name: "制霸".into(),
        color: "Purple".into(),
        ccf_level: 8,
        tag: "制霸".into(),
    }
}

fn default_progress_label() -> String {
    "加权制霸进度".into()
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("data/last_update.json")
}

fn default_document_path() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_document_title() -> String {
    "AmaoFox 的洛谷之旅".into()
}

fn default_image_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_personal_refresh_secs() -> u64 {
    3500
}

fn default_totals_refresh_secs() -> u64 {
    86300
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            practice_url: default_practice_url(),
            problem_list_url: default_problem_list_url(),
            card_api_base: default_card_api_base(),
            personal: default_personal_card(),
            domination: default_domination_card(),
            progress_label: default_progress_label(),
            cache_path: default_cache_path(),
            document_path: default_document_path(),
            document_title: default_document_title(),
            image_dir: default_image_dir(),
            download_images: true,
            personal_refresh_secs: default_personal_refresh_secs(),
            totals_refresh_secs: default_totals_refresh_secs(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// An explicit `config_file` must exist; the fallback file in the
    /// platform config directory is only merged when present.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from))
        {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::LoadFailed(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = default_config_file().filter(|p| p.is_file()) {
                    tracing::debug!(path = %path.display(), "using config file from config dir");
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Practice page URL for the configured user.
    pub fn practice_page_url(&self) -> String {
        self.practice_url
            .replace("{user_id}", &self.user_id.to_string())
    }

    /// Problem list URL for one difficulty tier.
    pub fn problem_list_page_url(&self, tier: usize) -> String {
        format!("{}{}", self.problem_list_url, tier)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn personal_refresh(&self) -> Duration {
        Duration::from_secs(self.personal_refresh_secs)
    }

    pub fn totals_refresh(&self) -> Duration {
        Duration::from_secs(self.totals_refresh_secs)
    }
}

/// `config.toml` inside the platform config directory.
fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "luogu-badges").map(|dirs| dirs.config_dir().join("config.toml"))
}
