use anyhow::{Context, Result};
use mappergen_build::MapperGenConfig;
use mappergen_build::config::CONFIG_FILE_NAME;
use std::path::{Path, PathBuf};

/// Files that mark the root of a Java project.
const PROJECT_MARKERS: &[&str] = &[CONFIG_FILE_NAME, "pom.xml", "build.gradle", "build.gradle.kts"];

/// Project context for mappergen operations
pub struct ProjectContext {
    /// Root directory of the project
    pub project_root: PathBuf,
    /// Path to the config file (may not exist yet)
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: Option<MapperGenConfig>,
}

impl ProjectContext {
    /// Find and load project context from current directory or ancestors
    pub fn find(config_override: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_override {
            return Self::from_config_path(path);
        }
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir)
    }

    /// Find project context starting from the given directory
    pub fn find_from(start: &Path) -> Result<Self> {
        let project_root = Self::find_project_root(start)?;
        let config_path = project_root.join(CONFIG_FILE_NAME);
        Self::load(project_root, config_path)
    }

    /// Use an explicit config file; its directory is the project root.
    pub fn from_config_path(path: &Path) -> Result<Self> {
        let config_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .context("Failed to get current directory")?
                .join(path)
        };
        if !config_path.exists() {
            anyhow::bail!("Config file {} does not exist", config_path.display());
        }
        let project_root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::load(project_root, config_path)
    }

    fn load(project_root: PathBuf, config_path: PathBuf) -> Result<Self> {
        let config = if config_path.exists() {
            log::debug!("loading config from {}", config_path.display());
            let config = MapperGenConfig::load(&config_path)
                .with_context(|| format!("Failed to load {}", config_path.display()))?;
            Some(config)
        } else {
            None
        };

        Ok(Self {
            project_root,
            config_path,
            config,
        })
    }

    /// Find project root by looking for a config file or Java build file
    fn find_project_root(start: &Path) -> Result<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if let Some(marker) = PROJECT_MARKERS.iter().find(|marker| current.join(marker).exists()) {
                log::debug!("project root {} (found {marker})", current.display());
                return Ok(current);
            }

            if !current.pop() {
                anyhow::bail!(
                    "Could not find {CONFIG_FILE_NAME}, pom.xml or build.gradle in {start:?} or any parent directory. \
                     Are you in a Java project?"
                );
            }
        }
    }

    /// Check if mappergen is configured in this project
    pub fn is_initialized(&self) -> bool {
        self.config.is_some()
    }

    /// Generator wired to this project and the config loaded with it.
    pub fn generator(&self) -> mappergen_build::MapperGenerator {
        let generator = mappergen_build::generate_mappers().project_root(&self.project_root);
        match &self.config {
            Some(config) => generator.config(config.clone()),
            None => generator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_from_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
        let nested = dir.path().join("src/main/java/com/example");
        fs::create_dir_all(&nested).unwrap();

        let ctx = ProjectContext::find_from(&nested).unwrap();
        assert_eq!(ctx.project_root, dir.path());
        assert!(!ctx.is_initialized());
    }

    #[test]
    fn test_loads_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[project]\nsource_root = \"java\"\n",
        )
        .unwrap();

        let ctx = ProjectContext::find_from(dir.path()).unwrap();
        assert!(ctx.is_initialized());
        assert_eq!(ctx.config.unwrap().project.source_root, "java");
    }

    #[test]
    fn test_generator_uses_loaded_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("java/com/example/model")).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[project]\nsource_root = \"java\"\nscan_annotations = false\n\n\
             [[mapper]]\nmodel_packages = [\"com.example.model\"]\n\
             mapper_package = \"com.example.mapper\"\nbase_interface = \"com.base.GenericMapper\"\n",
        )
        .unwrap();

        let ctx = ProjectContext::find_from(dir.path()).unwrap();
        // the file is parsed once, when the context loads
        fs::remove_file(&ctx.config_path).unwrap();

        let planned = ctx.generator().plan().unwrap();
        assert_eq!(planned.len(), 1);
        assert!(planned[0].plan.is_ok());
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ProjectContext::from_config_path(&dir.path().join("nope.toml")).is_err());
    }
}
