//! Startup configuration
//!
//! Parsed once in `main` from CLI flags or environment variables (after
//! `.env` files are loaded) and handed explicitly to the components that
//! need it.

use crate::auth::account_store::DEFAULT_BCRYPT_COST;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Log directives used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "assignment_portal=debug,tower_http=debug";

/// Upper bound for `TOKEN_TTL_HOURS` (ten years)
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

#[derive(Parser, Debug, Clone)]
#[command(name = "assignment-portal")]
#[command(about = "Assignment upload and review API")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: String,

    /// SQLite database file (relative paths resolve against the crate directory)
    #[arg(long, env = "DB_PATH", default_value = "assignment_portal.db")]
    pub db_path: String,

    /// Secret used to sign and verify bearer tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Lifetime of issued tokens, in hours
    #[arg(
        long,
        env = "TOKEN_TTL_HOURS",
        default_value_t = 24,
        value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_TTL_HOURS)
    )]
    pub token_ttl_hours: i64,

    /// bcrypt work factor for new password hashes
    #[arg(
        long,
        env = "BCRYPT_COST",
        default_value_t = DEFAULT_BCRYPT_COST,
        value_parser = clap::value_parser!(u32).range(4..=31)
    )]
    pub bcrypt_cost: u32,
}

impl Config {
    /// Database path with relative values anchored at the crate directory
    pub fn resolved_db_path(&self) -> PathBuf {
        resolve_data_path(&self.db_path)
    }
}

fn resolve_data_path(raw: &str) -> PathBuf {
    let p = PathBuf::from(raw.trim());
    if p.is_absolute() {
        return p;
    }

    // Treat relative paths as relative to the crate, not the caller's cwd.
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(p)
}

/// Load `.env` from the cwd (and parents) and from the crate directory.
pub fn load_env() {
    let _ = dotenv::dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
