use clap::Parser;
use std::{net::SocketAddr, path::PathBuf};

const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

#[derive(Clone, Debug, Parser)]
#[command(name = "eventhub-api")]
pub struct EventhubApiConfig {
    #[clap(
        short,
        long,
        env = "EVENTHUB_API_BIND_ADDR",
        default_value = "0.0.0.0:3001"
    )]
    pub bind_addr: SocketAddr,

    /// Origin of the web client, allowed by CORS.
    #[clap(
        long,
        env = "EVENTHUB_API_PUBLIC_URL",
        default_value = "http://localhost:3000"
    )]
    pub public_url: String,

    /// Print the OpenAPI document as JSON and exit.
    #[clap(long, default_value_t = false)]
    pub dump_openapi: bool,

    #[clap(
        long,
        env = "EVENTHUB_API_MONGODB_URI",
        default_value = "mongodb://localhost:27017/eventhub"
    )]
    pub mongodb_uri: String,

    /// Secret used to sign and verify bearer tokens (HS256).
    ///
    /// Mutually exclusive with `jwt_secret_file`.
    #[clap(long, env = "EVENTHUB_API_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Path to a file whose contents are the token signing secret.
    /// Surrounding whitespace is ignored.
    ///
    /// Mutually exclusive with `jwt_secret`.
    #[clap(long, env = "EVENTHUB_API_JWT_SECRET_FILE", conflicts_with = "jwt_secret")]
    pub jwt_secret_file: Option<PathBuf>,

    /// Lifetime of issued bearer tokens, in hours. At most one year.
    #[clap(
        long,
        env = "EVENTHUB_API_TOKEN_TTL_HOURS",
        default_value_t = 5,
        value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_TTL_HOURS)
    )]
    pub token_ttl_hours: i64,

    /// bcrypt cost factor for new password hashes, 4 to 31.
    #[clap(
        long,
        env = "EVENTHUB_API_BCRYPT_COST",
        default_value_t = eventhub_db::password::DEFAULT_COST,
        value_parser = clap::value_parser!(u32).range(4..=31)
    )]
    pub bcrypt_cost: u32,

    /// Directory uploaded images are written to and served from.
    #[clap(long, env = "EVENTHUB_API_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Largest accepted request body, in bytes. Bounds image uploads.
    #[clap(
        long,
        env = "EVENTHUB_API_MAX_UPLOAD_BYTES",
        default_value_t = 5 * 1024 * 1024
    )]
    pub max_upload_bytes: usize,
}

impl EventhubApiConfig {
    /// Get the token signing secret from either inline config or file.
    ///
    /// Checks `jwt_secret` first, then falls back to reading
    /// `jwt_secret_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Neither `jwt_secret` nor `jwt_secret_file` is configured
    /// - `jwt_secret_file` can't be read
    /// - The resulting secret is empty
    pub fn get_jwt_secret(&self) -> anyhow::Result<String> {
        let secret = if let Some(ref secret) = self.jwt_secret {
            secret.clone()
        } else if let Some(ref path) = self.jwt_secret_file {
            std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("failed to read jwt secret file: {}", e))?
                .trim()
                .to_string()
        } else {
            return Err(anyhow::anyhow!(
                "no jwt secret configured (set EVENTHUB_API_JWT_SECRET or EVENTHUB_API_JWT_SECRET_FILE)"
            ));
        };

        if secret.is_empty() {
            return Err(anyhow::anyhow!("jwt secret must not be empty"));
        }

        Ok(secret)
    }
}
