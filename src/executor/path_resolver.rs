use std::env;
use std::ffi::OsString;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Finds the file to execute for a command name.
///
/// Names containing `/` are taken as paths; anything else is looked up in
/// each directory of the search path, first match wins.
pub struct PathResolver {
    search_path: Option<OsString>,
}

impl PathResolver {
    pub fn from_env() -> Self {
        PathResolver { search_path: env::var_os("PATH") }
    }

    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        PathResolver { search_path: Some(search_path.into()) }
    }

    pub fn resolve(&self, command: &str) -> Option<PathBuf> {
        if command.contains('/') {
            let path = Path::new(command);
            return path.is_file().then(|| path.to_path_buf());
        }

        let paths = self.search_path.as_ref()?;
        env::split_paths(paths)
            .map(|dir| dir.join(command))
            .find(|candidate| is_executable(candidate))
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::from_env()
    }
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_names_are_paths() {
        let resolver = PathResolver::with_search_path("");
        assert_eq!(resolver.resolve("/bin/sh"), Some(PathBuf::from("/bin/sh")));
        assert_eq!(resolver.resolve("/no/such/binary"), None);
    }

    #[test]
    fn test_search_path_lookup() {
        let resolver = PathResolver::with_search_path("/nonexistent:/bin:/usr/bin");
        let found = resolver.resolve("sh").unwrap();
        assert!(found.ends_with("sh"));
        assert!(found.is_absolute());
    }

    #[test]
    fn test_unknown_command() {
        let resolver = PathResolver::with_search_path("/bin:/usr/bin");
        assert_eq!(resolver.resolve("definitely-not-a-command-xyz"), None);
    }

    #[test]
    fn test_directories_are_skipped() {
        let resolver = PathResolver::with_search_path("/");
        assert_eq!(resolver.resolve("tmp"), None);
    }
}
