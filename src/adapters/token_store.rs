use crate::domain::ports::{TokenPair, TokenStore};
use crate::utils::error::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const TOKEN_FILE: &str = "tokens.json";

/// Tokens kept as JSON on disk, the CLI's counterpart of browser local storage.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    base_path: PathBuf,
}

impl FileTokenStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.base_path.join(TOKEN_FILE)
    }

    fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;
        file.write_all(data)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<TokenPair>> {
        let path = self.file_path();
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<TokenPair>(&data) {
            Ok(tokens) => Ok(Some(tokens)),
            Err(e) => {
                // 損壞的檔案視同未登入
                tracing::warn!("Ignoring unreadable token file {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    fn save(&self, tokens: &TokenPair) -> Result<()> {
        fs::create_dir_all(&self.base_path)?;
        let json = serde_json::to_vec_pretty(tokens)?;
        Self::write_private(&self.file_path(), &json)?;
        tracing::debug!("Tokens saved to {}", self.file_path().display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(self.file_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access_token(token: impl Into<String>) -> Self {
        Self {
            tokens: Mutex::new(Some(TokenPair {
                access_token: token.into(),
                refresh_token: None,
            })),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<TokenPair>> {
        let guard = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, tokens: &TokenPair) -> Result<()> {
        let mut guard = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        Ok(())
    }
}
