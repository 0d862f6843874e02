use anyhow::{Context, Result};
use clap::Parser;
use std::env;

const DEFAULT_PORT: u16 = 8787;

/// Where the asset router listens and which collaborators it opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
}

/// Command-line flags; each one shadows its `ASSET_ROUTER_*` variable.
#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-tenant static asset server")]
pub struct Args {
    /// Host to bind to (overrides ASSET_ROUTER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides ASSET_ROUTER_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Object store root directory (overrides ASSET_ROUTER_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Tenant mapping database URL (overrides ASSET_ROUTER_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Create the tenant mapping table and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Resolve the listen address and store locations, plus whether to run
    /// the tenant table migration instead of serving.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        Ok((Self::merge(args)?, migrate))
    }

    /// CLI values win; environment fills the gaps; defaults fill the rest.
    fn merge(args: Args) -> Result<Self> {
        let env_host = env::var("ASSET_ROUTER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("ASSET_ROUTER_PORT") {
            Ok(value) => parse_port(&value)?,
            Err(env::VarError::NotPresent) => DEFAULT_PORT,
            Err(err) => return Err(err).context("reading ASSET_ROUTER_PORT"),
        };
        let env_storage =
            env::var("ASSET_ROUTER_STORAGE_DIR").unwrap_or_else(|_| "./data/objects".into());
        let env_db = env::var("ASSET_ROUTER_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/tenants.db".into());

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            database_url: args.database_url.unwrap_or(env_db),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .parse::<u16>()
        .with_context(|| format!("parsing ASSET_ROUTER_PORT value `{}`", value))
}
