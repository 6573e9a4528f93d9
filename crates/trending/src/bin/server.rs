//! Trending service entry point (spec §6): CLI wiring, backend config,
//! Redis pool and Wordfilter client-pool construction.

use std::process::ExitCode;

use buzzblog_rpc::server::ServerConfig;
use buzzblog_rpc::ClientConfig;
use buzzblog_substrate::{redis_pool, rpc_pool, BackendConfig, CommonArgs, MicroservicePoolArgs, RedisPoolArgs};
use buzzblog_trending::TrendingHandler;
use buzzblog_wordfilter::WordfilterClient;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "buzzblog-trending", about = "BuzzBlog Trending service")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    wordfilter_pool: MicroservicePoolArgs,

    #[command(flatten)]
    redis: RedisPoolArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guards = buzzblog_substrate::logging::init("trending", cli.common.logging_enabled());
    buzzblog_substrate::shutdown::install("trending");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "trending service failed to start");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = BackendConfig::load(&cli.common.backend_filepath)?;

    let redis_endpoint = config.redis_endpoint("trending")?;
    let redis = redis_pool("trending-redis", redis_endpoint, cli.redis.size);

    let wordfilter_endpoints = config.service_endpoints("wordfilter")?;
    let wordfilter_pool = rpc_pool(
        "trending-wordfilter",
        wordfilter_endpoints,
        buzzblog_pool::PoolConfig {
            min_size: cli.wordfilter_pool.min_size,
            max_size: cli.wordfilter_pool.max_size,
            allow_ephemeral: cli.wordfilter_pool.allow_ephemeral,
        },
        ClientConfig::default(),
    );
    let wordfilter = WordfilterClient::new(wordfilter_pool);

    let handler = TrendingHandler::new(redis, wordfilter);
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
        "starting trending service"
    );
    buzzblog_rpc::server::serve(server_config, handler)?;
    Ok(())
}
