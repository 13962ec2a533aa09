//! tilesmith - fetch and publish compiled releases
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Resolves the releases pinned in `tilesmith.lock` against the release
//! sources configured in `tilesmith.toml`, and uploads freshly built release
//! tarballs to an S3 release source.

pub mod cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tilesmith")]
#[command(author, version, about = "tilesmith - fetch and publish compiled releases")]
pub struct Cli {
    /// Path to the release source configuration
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "TILESMITH_CONFIG",
        default_value = "tilesmith.toml"
    )]
    pub config: PathBuf,

    /// Path to the lock file (defaults to the config path with a `.lock` extension)
    #[arg(long, global = true)]
    pub lock: Option<PathBuf>,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The lock file to read and update.
    pub fn lock_path(&self) -> PathBuf {
        self.lock
            .clone()
            .unwrap_or_else(|| tilesmith_core::manifest::default_lock_path(&self.config))
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download every locked release from the configured release sources
    Fetch {
        /// Directory the release tarballs are written to
        #[arg(long, short = 'r', default_value = "releases")]
        releases_directory: PathBuf,
        /// Parallel downloads per release source (0 uses the default)
        #[arg(long, short = 't', default_value_t = 0)]
        download_threads: usize,
    },
    /// Upload a release tarball to an S3 release source
    Publish {
        /// Name of the release
        #[arg(long, short = 'n')]
        name: String,
        /// Version of the release
        #[arg(long)]
        version: String,
        /// Bucket of the destination release source
        #[arg(long, short = 'r')]
        remote: String,
        /// Path to the release tarball, named like `my-rel-1.2.3.tgz`
        #[arg(long, short = 'p')]
        path: PathBuf,
        /// Record the uploaded release in the lock file
        #[arg(long, short = 'u')]
        update_lock: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
