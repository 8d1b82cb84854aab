use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::{env, fmt};

use thiserror::Error;
use tracing::level_filters::LevelFilter;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SMASH_CONFIG";
/// Config file looked up in `$HOME` when `SMASH_CONFIG` is unset.
pub const RC_FILE: &str = ".smashrc";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub prompt: String,
    pub limits: Limits,
    pub log_level: LevelFilter,
}

/// Per-line bounds. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub max_statements: Option<usize>,
    pub max_stages: Option<usize>,
    pub max_args: Option<usize>,
}

impl Limits {
    pub fn unbounded() -> Self {
        Limits::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        ConfigLoader::default_config()
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_config() -> Config {
        Config {
            prompt: "smash> ".to_string(),
            limits: Limits::unbounded(),
            log_level: LevelFilter::OFF,
        }
    }

    /// Picks the config file: `$SMASH_CONFIG`, else `$HOME/.smashrc` if present.
    pub fn locate() -> Option<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        let home = env::var_os("HOME").filter(|h| !h.is_empty())?;
        let rc = Path::new(&home).join(RC_FILE);
        rc.is_file().then_some(rc)
    }

    /// Loads the located config, or the defaults when there is none.
    pub fn load() -> Result<Config, ConfigError> {
        match Self::locate() {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default_config()),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path).map_err(ConfigError::Io)?;
        let mut src = String::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(ConfigError::Io)?;
            src.push_str(&line);
            src.push('\n');
        }
        Self::load_from_str(&src)
    }

    pub fn load_from_str(src: &str) -> Result<Config, ConfigError> {
        let mut config = Self::default_config();

        for (lineno, line) in src.lines().enumerate() {
            let lineno = lineno + 1;
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Parse(lineno, format!("no '=' found: {}", line)));
            };

            match key.trim() {
                // the prompt keeps its trailing whitespace
                "prompt" => config.prompt = value.to_string(),
                "max_statements" => config.limits.max_statements = parse_limit(lineno, value)?,
                "max_stages" => config.limits.max_stages = parse_limit(lineno, value)?,
                "max_args" => config.limits.max_args = parse_limit(lineno, value)?,
                "log_level" => config.log_level = parse_level(lineno, value)?,
                other => {
                    return Err(ConfigError::Parse(lineno, format!("unknown key: {}", other)));
                }
            }
        }

        Ok(config)
    }
}

fn parse_limit(lineno: usize, value: &str) -> Result<Option<usize>, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(0) => Ok(None),
        Ok(n) => Ok(Some(n)),
        Err(_) => Err(ConfigError::Parse(lineno, format!("invalid limit: {}", value.trim()))),
    }
}

fn parse_level(lineno: usize, value: &str) -> Result<LevelFilter, ConfigError> {
    value
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| ConfigError::Parse(lineno, format!("invalid log level: {}", value.trim())))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[source] io::Error),

    #[error("line {0}: {1}")]
    Parse(usize, String),
}

impl fmt::Display for Limits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<usize>| v.map_or("unbounded".to_string(), |n| n.to_string());
        write!(
            f,
            "statements={} stages={} args={}",
            show(self.max_statements),
            show(self.max_stages),
            show(self.max_args)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigLoader::load_from_str("").unwrap();
        assert_eq!(config, ConfigLoader::default_config());
        assert_eq!(config.prompt, "smash> ");
        assert_eq!(config.limits, Limits::unbounded());
        assert_eq!(config.log_level, LevelFilter::OFF);
    }

    #[test]
    fn test_all_keys() {
        let src = "# comment\n\nprompt=$ \nmax_statements=20\nmax_stages = 4\nmax_args=0\nlog_level=debug\n";
        let config = ConfigLoader::load_from_str(src).unwrap();
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.limits.max_statements, Some(20));
        assert_eq!(config.limits.max_stages, Some(4));
        assert_eq!(config.limits.max_args, None);
        assert_eq!(config.log_level, LevelFilter::DEBUG);
    }

    #[test]
    fn test_unknown_key() {
        let err = ConfigLoader::load_from_str("colour=red\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(1, _)));
    }

    #[test]
    fn test_missing_equals() {
        let err = ConfigLoader::load_from_str("# ok\nprompt\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(2, _)));
    }

    #[test]
    fn test_bad_limit() {
        let err = ConfigLoader::load_from_str("max_args=-3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(1, _)));
    }

    #[test]
    fn test_bad_level() {
        assert!(ConfigLoader::load_from_str("log_level=loud\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("smash-config-{}.rc", std::process::id()));
        std::fs::write(&path, "max_stages=2\n").unwrap();
        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.limits.max_stages, Some(2));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load_from_file("/nonexistent/smashrc").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
