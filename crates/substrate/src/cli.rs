//! The CLI surface every service shares (spec §6), composed via `#[command(flatten)]`.

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long)]
    pub port: u16,

    /// 0 = unlimited (thread-per-connection with no pool cap).
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// 0 = let the OS choose the default listen backlog.
    #[arg(long, default_value_t = 0)]
    pub accept_backlog: u32,

    #[arg(long, default_value = "/etc/opt/BuzzBlog/backend.yml")]
    pub backend_filepath: String,

    /// 0/1: whether the logging wrappers (spec §4.4) write anything at all.
    #[arg(long, default_value_t = 0)]
    pub logging: u8,
}

impl CommonArgs {
    pub fn logging_enabled(&self) -> bool {
        self.logging != 0
    }
}

#[derive(Args, Debug, Clone)]
pub struct MicroservicePoolArgs {
    #[arg(long = "microservice_connection_pool_min_size", default_value_t = 0)]
    pub min_size: usize,

    #[arg(long = "microservice_connection_pool_max_size", default_value_t = 4)]
    pub max_size: usize,

    #[arg(long = "microservice_connection_pool_allow_ephemeral", default_value_t = false)]
    pub allow_ephemeral: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PostgresPoolArgs {
    #[arg(long = "postgres_connection_pool_min_size", default_value_t = 0)]
    pub min_size: usize,

    #[arg(long = "postgres_connection_pool_max_size", default_value_t = 4)]
    pub max_size: usize,

    #[arg(long = "postgres_connection_pool_allow_ephemeral", default_value_t = false)]
    pub allow_ephemeral: bool,

    #[arg(long = "postgres_user")]
    pub user: String,

    #[arg(long = "postgres_password")]
    pub password: String,
}

#[derive(Args, Debug, Clone)]
pub struct RedisPoolArgs {
    #[arg(long = "redis_connection_pool_size", default_value_t = 1)]
    pub size: usize,
}
