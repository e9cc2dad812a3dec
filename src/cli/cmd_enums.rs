use clap::{Args, Parser, Subcommand};
use lilyponddist::{DownloadPolicy, RootPolicy, Settings, Version};
use std::path::PathBuf;

/// Defines the command-line interface (CLI) for 'lilyponddist'.
#[derive(Parser)]
#[command(name = "lilyponddist")]
#[command(about = "Download, cache and version-select LilyPond binary distributions", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Options accepted by every subcommand. They override `config.yaml`.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Enables detailed debug output (also `LILYPONDDIST_DEBUG=1`).
    #[arg(short, long, global = true)]
    pub(crate) debug: bool,

    /// Path to a config file instead of `<config dir>/lilyponddist/config.yaml`.
    #[arg(long, global = true, env = "LILYPONDDIST_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// Installation root holding one `lilypond-<version>` directory per version.
    #[arg(long, global = true, env = "LILYPONDDIST_ROOT")]
    pub(crate) root: Option<String>,

    /// Directory downloaded archives are kept in.
    #[arg(long, global = true, env = "LILYPONDDIST_DOWNLOAD_DIR")]
    pub(crate) download_dir: Option<String>,

    /// Download again even if the archive is already in the download directory.
    #[arg(long, global = true)]
    pub(crate) overwrite: bool,

    /// Remove every installed version before installing (default: keep them).
    #[arg(long, global = true)]
    pub(crate) wipe: bool,

    /// Do not draw download progress bars.
    #[arg(long, global = true)]
    pub(crate) no_progress: bool,
}

impl GlobalArgs {
    /// Layers the flags on top of the settings read from the config file.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(root) = &self.root {
            settings.root = Some(root.clone());
        }
        if let Some(dir) = &self.download_dir {
            settings.download_dir = Some(dir.clone());
        }
        if self.overwrite {
            settings.download_policy = DownloadPolicy::Overwrite;
        }
        if self.wipe {
            settings.root_policy = RootPolicy::Wipe;
        }
        if self.no_progress {
            settings.show_progress = false;
        }
    }
}

/// Enumerates all supported subcommands with their specific arguments and options.
#[derive(Subcommand)]
pub enum Commands {
    /// Install a LilyPond version (the latest when omitted).
    Install {
        /// Version to install, e.g. 2.24.3.
        #[arg(env = "LILYPONDDIST_VERSION")]
        version: Option<Version>,
        /// Install the build for another OS (linux, windows, darwin).
        #[arg(long, env = "LILYPONDDIST_OS")]
        os: Option<String>,
        /// Install the build for another architecture (x86_64, arm64, ...).
        #[arg(long, env = "LILYPONDDIST_ARCH")]
        arch: Option<String>,
    },
    /// Install the latest version if it is newer than everything installed.
    Update,
    /// Print the path of the lilypond executable, installing it if needed.
    Path {
        /// Version to resolve; the greatest installed version when omitted.
        version: Option<Version>,
        /// Fail instead of installing when the version is not installed.
        #[arg(long)]
        no_auto_install: bool,
    },
    /// Show the platform, installation root, installed versions and update status.
    Status,
    /// List the versions this tool can install.
    List,
    /// Print the platform key detected for this host.
    Platform {
        /// Print the architecture as reported, without collapsing aliases.
        #[arg(long)]
        raw: bool,
    },
    /// Remove one installed version.
    Uninstall {
        version: Version,
    },
    /// Show the current version of the tool.
    Version,
}
