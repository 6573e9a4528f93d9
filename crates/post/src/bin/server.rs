//! Post service entry point (spec §6): CLI wiring, backend config, Postgres
//! pool for its own table, client pools for its three peers (Trending,
//! Account, Like), and the blocking RPC server loop.

use std::process::ExitCode;
use std::sync::Arc;

use buzzblog_post::peer_account::PeerAccountClient;
use buzzblog_post::peer_like::PeerLikeClient;
use buzzblog_post::PostHandler;
use buzzblog_rpc::exec::Executor;
use buzzblog_rpc::server::ServerConfig;
use buzzblog_rpc::ClientConfig;
use buzzblog_substrate::{db_pool, rpc_pool, BackendConfig, CommonArgs, Fanout, MicroservicePoolArgs, PostgresPoolArgs};
use buzzblog_trending::TrendingClient;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "buzzblog-post", about = "BuzzBlog Post service")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    postgres: PostgresPoolArgs,

    #[command(flatten)]
    microservice_pool: MicroservicePoolArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guards = buzzblog_substrate::logging::init("post", cli.common.logging_enabled());
    buzzblog_substrate::shutdown::install("post");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "post service failed to start");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = BackendConfig::load(&cli.common.backend_filepath)?;

    let db_endpoint = config.database_endpoint("post")?;
    let db = db_pool(
        "post-db",
        db_endpoint,
        buzzblog_pool::PoolConfig {
            min_size: cli.postgres.min_size,
            max_size: cli.postgres.max_size,
            allow_ephemeral: cli.postgres.allow_ephemeral,
        },
        "buzzblog_post",
        cli.postgres.user,
        cli.postgres.password,
    );

    let pool_config = buzzblog_pool::PoolConfig {
        min_size: cli.microservice_pool.min_size,
        max_size: cli.microservice_pool.max_size,
        allow_ephemeral: cli.microservice_pool.allow_ephemeral,
    };

    let trending_endpoints = config.service_endpoints("trending")?;
    let trending_pool = rpc_pool("post-trending", trending_endpoints, pool_config, ClientConfig::default());
    let trending = TrendingClient::new(trending_pool);

    let account_endpoints = config.service_endpoints("account")?;
    let account_pool = rpc_pool("post-account", account_endpoints, pool_config, ClientConfig::default());
    let account = PeerAccountClient::new(account_pool);

    let like_endpoints = config.service_endpoints("like")?;
    let like_pool = rpc_pool("post-like", like_endpoints, pool_config, ClientConfig::default());
    let like = PeerLikeClient::new(like_pool);

    let fanout = Arc::new(Fanout::new(Arc::new(Executor::new(cli.common.threads))));

    let handler = PostHandler::new(db, trending, account, like, fanout);
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
        "starting post service"
    );
    buzzblog_rpc::server::serve(server_config, handler)?;
    Ok(())
}
