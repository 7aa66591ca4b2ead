use crate::models::BaseUrl;
use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::{env, fmt, path::PathBuf, time::Duration};

/// Storage backend selector. Only `local` is implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Local,
    S3,
    Oss,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Local => "local",
            Backend::S3 => "s3",
            Backend::Oss => "oss",
        })
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: Backend,
    pub public_dir: PathBuf,
    pub private_dir: PathBuf,
    pub public_base_url: BaseUrl,
    pub signed_base_url: BaseUrl,
    pub secret: String,
    pub expiry_leeway: Duration,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Local object storage with signed private links")]
pub struct Args {
    /// Host to bind to (overrides SIGNED_STORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides SIGNED_STORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Storage backend (overrides SIGNED_STORE_BACKEND)
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Root for publicly readable objects (overrides SIGNED_STORE_PUBLIC_DIR)
    #[arg(long)]
    pub public_dir: Option<PathBuf>,

    /// Root for private objects (overrides SIGNED_STORE_PRIVATE_DIR)
    #[arg(long)]
    pub private_dir: Option<PathBuf>,

    /// Prefix of permanent public URLs (overrides SIGNED_STORE_PUBLIC_BASE_URL)
    #[arg(long)]
    pub public_base_url: Option<String>,

    /// Endpoint signed links point at (overrides SIGNED_STORE_SIGNED_BASE_URL)
    #[arg(long)]
    pub signed_base_url: Option<String>,

    /// HMAC secret for signed links (overrides SIGNED_STORE_SECRET)
    #[arg(long)]
    pub secret: Option<String>,

    /// Seconds a link stays valid past its expireAt (overrides SIGNED_STORE_EXPIRY_LEEWAY)
    #[arg(long)]
    pub expiry_leeway: Option<u64>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::resolve(Args::parse(), |name| env::var(name))
    }

    /// Merge `args` over the variables returned by `lookup` over defaults.
    pub fn resolve<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let var = |name: &str| -> Result<Option<String>> {
            match lookup(name) {
                Ok(value) => Ok(Some(value)),
                Err(env::VarError::NotPresent) => Ok(None),
                Err(err) => Err(err).with_context(|| format!("reading {}", name)),
            }
        };

        // --- Environment fallback ---
        let env_port = match var("SIGNED_STORE_PORT")? {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing SIGNED_STORE_PORT value `{}`", value))?,
            None => 3000,
        };
        let env_backend = match var("SIGNED_STORE_BACKEND")? {
            Some(value) => Backend::from_str(&value, true)
                .map_err(|err| anyhow::anyhow!(err))
                .with_context(|| format!("parsing SIGNED_STORE_BACKEND value `{}`", value))?,
            None => Backend::Local,
        };
        let env_leeway = match var("SIGNED_STORE_EXPIRY_LEEWAY")? {
            Some(value) => value
                .parse::<u64>()
                .with_context(|| format!("parsing SIGNED_STORE_EXPIRY_LEEWAY value `{}`", value))?,
            None => 0,
        };

        // --- Merge ---
        let host = match args.host {
            Some(host) => host,
            None => var("SIGNED_STORE_HOST")?.unwrap_or_else(|| "0.0.0.0".into()),
        };
        let port = args.port.unwrap_or(env_port);
        let public_dir = match args.public_dir {
            Some(dir) => dir,
            None => var("SIGNED_STORE_PUBLIC_DIR")?
                .unwrap_or_else(|| "./data/public".into())
                .into(),
        };
        let private_dir = match args.private_dir {
            Some(dir) => dir,
            None => var("SIGNED_STORE_PRIVATE_DIR")?
                .unwrap_or_else(|| "./data/private".into())
                .into(),
        };
        let public_base_url = match args.public_base_url {
            Some(url) => url,
            None => var("SIGNED_STORE_PUBLIC_BASE_URL")?
                .unwrap_or_else(|| format!("http://localhost:{}/public", port)),
        };
        let public_base_url = BaseUrl::parse(&public_base_url)
            .with_context(|| format!("parsing public base url `{}`", public_base_url))?;
        let signed_base_url = match args.signed_base_url {
            Some(url) => url,
            None => var("SIGNED_STORE_SIGNED_BASE_URL")?
                .unwrap_or_else(|| format!("http://localhost:{}/private", port)),
        };
        let signed_base_url = BaseUrl::parse(&signed_base_url)
            .with_context(|| format!("parsing signed base url `{}`", signed_base_url))?;
        let secret = match args.secret {
            Some(secret) => secret,
            None => var("SIGNED_STORE_SECRET")?.unwrap_or_default(),
        };
        if secret.is_empty() {
            bail!("a signing secret is required (--secret or SIGNED_STORE_SECRET)");
        }

        Ok(Self {
            host,
            port,
            backend: args.backend.unwrap_or(env_backend),
            public_dir,
            private_dir,
            public_base_url,
            signed_base_url,
            secret,
            expiry_leeway: Duration::from_secs(args.expiry_leeway.unwrap_or(env_leeway)),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("backend", &self.backend)
            .field("public_dir", &self.public_dir)
            .field("private_dir", &self.private_dir)
            .field("public_base_url", &self.public_base_url)
            .field("signed_base_url", &self.signed_base_url)
            .field("secret", &"<redacted>")
            .field("expiry_leeway", &self.expiry_leeway)
            .finish()
    }
}
