use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ldap_settings::config::{Configuration, DEFAULT_CONFIG_PATH};
use ldap_settings::ldap::{Cached, DirectoryServerConfig, Named};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Validate directory settings and print a summary of each directory.
    Check {
        /// Settings file containing an `ldaps` section.
        #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
        file: PathBuf,
    },
}

fn summary(directory: &DirectoryServerConfig) -> String {
    let servers = directory.urls().join(", ");
    let bind = match directory.searching_user() {
        Some(user) => user.dn().to_owned(),
        None => "anonymous".to_owned(),
    };

    format!(
        "{name}: {servers} (ha: {ha}, bind: {bind}, base: {base}, pool: {pool}, cache: {ttl}s)",
        name = directory.name(),
        ha = directory.ha(),
        base = directory.search_user_base_dn(),
        pool = directory.connection_pool_size(),
        ttl = directory.cache_ttl().as_secs(),
    )
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.cmd {
        Commands::Check { file } => match Configuration::default().path(&file).read() {
            Ok(config) => {
                if config.is_empty() {
                    tracing::warn!(file = %file.display(), "no `ldaps` entry found");
                }
                for directory in config.iter() {
                    println!("{}", summary(directory));
                }
                ExitCode::SUCCESS
            },
            Err(err) => {
                tracing::error!(file = %file.display(), error = %err, "invalid directory settings");
                ExitCode::FAILURE
            },
        },
    }
}
