use crate::utils::error::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const ENV_FILE_NAME: &str = ".env";

/// Key/value pairs read from a `.env` file at the project root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    values: HashMap<String, String>,
}

impl EnvFile {
    /// 讀取 `<root>/.env`；檔案不存在時回傳空集合
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(ENV_FILE_NAME);
        if !path.is_file() {
            tracing::debug!("No {} file at {}", ENV_FILE_NAME, path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path)?;
        let env_file = Self::parse(&text);
        tracing::debug!(
            "Loaded {} value(s) from {}",
            env_file.values.len(),
            path.display()
        );
        Ok(env_file)
    }

    /// Lines without `=`, blank lines and `#` comments are skipped without error.
    /// The first occurrence of a key wins; later duplicates are ignored.
    pub fn parse(text: &str) -> Self {
        let mut values = HashMap::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };

            let key = key.trim();
            if key.is_empty() {
                continue;
            }

            values
                .entry(key.to_string())
                .or_insert_with(|| clean_value(value));
        }

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// 只去掉外層空白與引號，引號內的空白保留
fn clean_value(raw: &str) -> String {
    raw.trim().trim_matches('"').trim_matches('\'').to_string()
}
