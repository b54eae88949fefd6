use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Runtime settings. Every flag falls back to an environment variable, so a
/// `.env` file loaded before parsing is enough to run the server.
#[derive(Parser, Debug, Clone)]
#[command(name = "taskhub", about = "Kanban board backend", version)]
pub struct Config {
    #[arg(long, env = "APP_URL", default_value = "127.0.0.1:3000")]
    pub app_url: String,

    #[arg(
        long,
        env = "DATABASE_URL",
        value_name = "URL",
        required_unless_present = "in_memory",
        help = "Postgres connection string"
    )]
    pub database_url: Option<String>,

    #[arg(
        long,
        env = "IN_MEMORY",
        help = "Keep all data in process memory instead of Postgres"
    )]
    pub in_memory: bool,

    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    #[arg(
        long,
        env = "SESSION_MINUTES",
        default_value_t = 30,
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    pub session_minutes: i64,

    #[arg(long, env = "STORAGE_DIR", value_name = "DIR", default_value = "./storage")]
    pub storage_dir: PathBuf,

    #[arg(
        long,
        env = "PUBLIC_URL",
        default_value = "http://127.0.0.1:3000",
        help = "Base URL stored photo links are built from"
    )]
    pub public_url: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[arg(
        long,
        env = "POOL_SIZE",
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub pool_size: u32,
}
