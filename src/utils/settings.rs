use crate::utils::{BridgeError, PromptEntry, PromptMap, SettingsRecord, DEFAULT_PROMPT_ID};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "simpleai";
const CONFIG_DIR_ENV: &str = "SIMPLEAI_CONFIG_DIR";
const SETTINGS_FILE: &str = "settings.toml";
const PROMPTS_FILE: &str = "prompts.json";

/// Get the platform-specific config directory
pub fn config_dir() -> Result<PathBuf, BridgeError> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    let config_dir = if cfg!(target_os = "windows") || cfg!(target_os = "macos") {
        // Windows: %APPDATA%\simpleai, macOS: ~/Library/Application Support/simpleai
        dirs::config_dir()
            .ok_or_else(|| BridgeError::Storage("Could not find config directory".to_string()))?
            .join(APP_DIR)
    } else {
        // Linux/Unix: $HOME/.simpleai
        dirs::home_dir()
            .ok_or_else(|| BridgeError::Storage("Could not find home directory".to_string()))?
            .join(format!(".{}", APP_DIR))
    };

    Ok(config_dir)
}

/// The prompt library a fresh install starts with.
pub fn builtin_prompts() -> PromptMap {
    let mut prompts = PromptMap::new();
    prompts.insert(
        DEFAULT_PROMPT_ID.to_string(),
        PromptEntry::new("Default", "You are a helpful assistant."),
    );
    prompts.insert(
        "paper-expert".to_string(),
        PromptEntry::new(
            "Paper translator",
            "You are a capable assistant for translating academic papers.",
        ),
    );
    prompts.insert(
        "code-expert".to_string(),
        PromptEntry::new(
            "Code expert",
            "You are a professional programmer. Answer with high-quality code and explain it.",
        ),
    );
    prompts.insert(
        "translate".to_string(),
        PromptEntry::new(
            "Translator",
            "You are a professional translator. Translate what the user writes into English.",
        ),
    );
    prompts
}

/// Settings and prompt files under one directory.
#[derive(Debug, Clone)]
pub struct ConfigFiles {
    dir: PathBuf,
}

impl ConfigFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_env() -> Result<Self, BridgeError> {
        Ok(Self::new(config_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    pub fn prompts_path(&self) -> PathBuf {
        self.dir.join(PROMPTS_FILE)
    }

    /// `None` when nothing has been saved yet.
    pub fn load_settings(&self) -> Result<Option<SettingsRecord>, BridgeError> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| BridgeError::Storage(format!("Failed to read settings file: {}", e)))?;
        let settings = toml::from_str(&contents)
            .map_err(|e| BridgeError::Storage(format!("Failed to parse settings file: {}", e)))?;

        Ok(Some(settings))
    }

    pub fn save_settings(&self, settings: &SettingsRecord) -> Result<(), BridgeError> {
        let contents = toml::to_string_pretty(settings)
            .map_err(|e| BridgeError::Storage(format!("Failed to serialize settings: {}", e)))?;
        self.write_private(&self.settings_path(), &contents)
    }

    /// Stored prompt library, or the built-in one on first run.
    pub fn load_prompts(&self) -> Result<PromptMap, BridgeError> {
        let path = self.prompts_path();
        if !path.exists() {
            return Ok(builtin_prompts());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| BridgeError::Storage(format!("Failed to read prompts file: {}", e)))?;
        let mut prompts: PromptMap = serde_json::from_str(&contents)
            .map_err(|e| BridgeError::Storage(format!("Failed to parse prompts file: {}", e)))?;

        if !prompts.contains_key(DEFAULT_PROMPT_ID) {
            if let Some(default) = builtin_prompts().remove(DEFAULT_PROMPT_ID) {
                prompts.insert(DEFAULT_PROMPT_ID.to_string(), default);
            }
        }

        Ok(prompts)
    }

    pub fn save_prompts(&self, prompts: &PromptMap) -> Result<(), BridgeError> {
        let contents = serde_json::to_string_pretty(prompts)
            .map_err(|e| BridgeError::Storage(format!("Failed to serialize prompts: {}", e)))?;
        self.write_private(&self.prompts_path(), &contents)
    }

    fn write_private(&self, path: &Path, contents: &str) -> Result<(), BridgeError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                BridgeError::Storage(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, contents).map_err(|e| {
            BridgeError::Storage(format!("Failed to write {}: {}", path.display(), e))
        })?;

        // Settings carry the API key; read/write for owner only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)
                .map_err(|e| BridgeError::Storage(format!("Failed to get file metadata: {}", e)))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).map_err(|e| {
                BridgeError::Storage(format!("Failed to set file permissions: {}", e))
            })?;
        }

        Ok(())
    }
}
