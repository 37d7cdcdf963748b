use crate::{
    cli::Opts,
    errors::{Error, Result},
    executor::Isolation,
};
use serde::Deserialize;
use std::{fs, path::Path};

/// Configuration for a single run. Every field can be set in a TOML file;
/// command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Style the report with ANSI colors.
    pub color: bool,
    /// Show CPU and wall-clock time next to each result.
    pub timing: bool,
    /// Show start and pass lines for passing tests.
    pub passing: bool,
    pub isolation: Isolation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color: true,
            timing: true,
            passing: true,
            isolation: Isolation::default(),
        }
    }
}

impl Config {
    /// Read a configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).map_err(|err| Error::Config {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        toml::from_str(&contents).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// Build the configuration for `opts`: the file it names, if any, with
    /// the flags applied on top.
    pub fn from_opts(opts: &Opts) -> Result<Self> {
        let mut conf = match &opts.config {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        if opts.no_color {
            conf.color = false;
        }
        if opts.no_timing {
            conf.timing = false;
        }
        if opts.quiet {
            conf.passing = false;
        }
        if let Some(isolation) = opts.isolation {
            conf.isolation = isolation;
        }
        Ok(conf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use structopt::StructOpt;
    use tempfile::{tempdir, TempDir};

    fn write_config(contents: &str) -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("isotest.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn defaults_show_everything_and_isolate() {
        let conf = Config::from_opts(&Opts::from_iter(&["demo"])).unwrap();
        assert_eq!(conf, Config::default());
        assert_eq!(conf.isolation, Isolation::Process);
    }

    #[test]
    fn flags_override_the_file() {
        let (_dir, path) = write_config(
            "color = true\ntiming = true\nisolation = \"in-process\"\n",
        );
        let opts = Opts::from_iter(&[
            "demo",
            "--config",
            path.to_str().unwrap(),
            "--no-color",
            "--isolation",
            "process",
        ]);
        let conf = Config::from_opts(&opts).unwrap();
        assert!(!conf.color);
        assert!(conf.timing);
        assert_eq!(conf.isolation, Isolation::Process);
    }

    #[test]
    fn file_values_apply_without_flags() {
        let (_dir, path) =
            write_config("passing = false\nisolation = \"in-process\"\n");
        let conf = Config::from_path(&path).unwrap();
        assert!(!conf.passing);
        assert!(conf.color);
        assert_eq!(conf.isolation, Isolation::InProcess);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let (_dir, path) = write_config("colour = false\n");
        let err = Config::from_path(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::from_path(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
