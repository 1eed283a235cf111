//! `.env` layering underneath Rocket's own figment. Later files override
//! earlier ones; absent files are reported, not fatal.

use std::path::Path;

const COMMON_ENV: &str = "config/common.env";
const SECRETS_ENV: &str = ".secrets.env";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Development,
    Production,
}

impl Profile {
    pub fn current() -> Self {
        Self::from_name(dotenvy::var("ROCKET_PROFILE").ok().as_deref())
    }

    /// `production` or `release` selects production; anything else,
    /// including no profile at all, is development.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("production") | Some("release") => Profile::Production,
            _ => Profile::Development,
        }
    }

    pub fn env_files(self) -> [&'static str; 3] {
        let profile_env = match self {
            Profile::Development => "config/dev.env",
            Profile::Production => "config/prod.env",
        };
        [COMMON_ENV, profile_env, SECRETS_ENV]
    }
}

/// What [`load_environment`] did, for logging once tracing is up.
#[derive(Debug, Default)]
pub struct LoadedEnvironment {
    pub loaded: Vec<&'static str>,
    pub missing: Vec<&'static str>,
}

pub fn load_environment() -> Result<LoadedEnvironment, dotenvy::Error> {
    load_files(&Profile::current().env_files())
}

fn load_files(files: &[&'static str]) -> Result<LoadedEnvironment, dotenvy::Error> {
    let mut result = LoadedEnvironment::default();

    for &file in files {
        if Path::new(file).exists() {
            dotenvy::from_filename_override(file)?;
            result.loaded.push(file);
        } else {
            result.missing.push(file);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_selection() {
        assert_eq!(Profile::from_name(Some("release")), Profile::Production);
        assert_eq!(Profile::from_name(Some("production")), Profile::Production);
        assert_eq!(Profile::from_name(Some("debug")), Profile::Development);
        assert_eq!(Profile::from_name(None), Profile::Development);

        assert_eq!(
            Profile::Production.env_files(),
            ["config/common.env", "config/prod.env", ".secrets.env"]
        );
    }

    #[test]
    fn test_missing_files_are_reported() {
        let result = load_files(&["config/does-not-exist.env"]).unwrap();
        assert!(result.loaded.is_empty());
        assert_eq!(result.missing, vec!["config/does-not-exist.env"]);
    }
}
