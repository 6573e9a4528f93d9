//! Uniquepair service entry point (spec §6): CLI wiring, backend config,
//! Postgres pool construction, and the blocking RPC server loop.

use std::process::ExitCode;

use buzzblog_rpc::server::ServerConfig;
use buzzblog_substrate::{db_pool, BackendConfig, CommonArgs, PostgresPoolArgs};
use buzzblog_uniquepair::UniquepairHandler;
use buzzblog_pool::PoolConfig;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "buzzblog-uniquepair", about = "BuzzBlog Uniquepair service")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    postgres: PostgresPoolArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guards = buzzblog_substrate::logging::init("uniquepair", cli.common.logging_enabled());
    buzzblog_substrate::shutdown::install("uniquepair");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "uniquepair service failed to start");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = BackendConfig::load(&cli.common.backend_filepath)?;
    let db_endpoint = config.database_endpoint("uniquepair")?;

    let pool = db_pool(
        "uniquepair-db",
        db_endpoint,
        PoolConfig {
            min_size: cli.postgres.min_size,
            max_size: cli.postgres.max_size,
            allow_ephemeral: cli.postgres.allow_ephemeral,
        },
        "buzzblog_uniquepair",
        cli.postgres.user,
        cli.postgres.password,
    );

    let handler = UniquepairHandler::new(pool);
    let server_config = ServerConfig {
        host: cli.common.host,
        port: cli.common.port,
        threads: cli.common.threads,
        accept_backlog: cli.common.accept_backlog,
        concurrent_client_limit: cli.common.threads,
    };

    tracing::info!(
        host = %server_config.host,
        port = server_config.port,
        threads = server_config.threads,
        "starting uniquepair service"
    );
    buzzblog_rpc::server::serve(server_config, handler)?;
    Ok(())
}
