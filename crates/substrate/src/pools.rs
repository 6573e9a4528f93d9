//! Concrete instantiations of `buzzblog_pool::Pool` for the two kinds of
//! connection every service manages (spec §4.2): RPC client stubs to peer
//! services, and Postgres sessions. Trending additionally pools Redis
//! connections, sized by a single `--redis_connection_pool_size` (spec §6).

use std::sync::Arc;

use buzzblog_pool::{Pool, PoolConfig};
use buzzblog_rpc::{ClientConfig, ClientError, ClientStub};

pub type Endpoint = (String, u16);
pub type RpcPool = Pool<ClientStub, Endpoint, ClientError>;
pub type DbPool = Pool<postgres::Client, Endpoint, postgres::Error>;
pub type RedisPool = Pool<redis::Connection, Endpoint, redis::RedisError>;

/// Builds a pool of client stubs to one logical peer service (a set of
/// `(host, port)` endpoints, spec §4.2).
pub fn rpc_pool(
    name: &'static str,
    endpoints: Vec<Endpoint>,
    config: PoolConfig,
    client_config: ClientConfig,
) -> Arc<RpcPool> {
    Pool::new(name, endpoints, config, move |ep: &Endpoint| {
        ClientStub::connect(&ep.0, ep.1, &client_config)
    })
}

/// Builds a pool of Postgres sessions against one database endpoint.
pub fn db_pool(
    name: &'static str,
    endpoint: Endpoint,
    config: PoolConfig,
    dbname: &'static str,
    user: String,
    password: String,
) -> Arc<DbPool> {
    Pool::new(name, vec![endpoint], config, move |ep: &Endpoint| {
        postgres::Client::connect(
            &format!(
                "host={} port={} dbname={} user={} password={}",
                ep.0, ep.1, dbname, user, password
            ),
            postgres::NoTls,
        )
    })
}

/// Builds a fixed-size pool of blocking Redis connections
/// (`--redis_connection_pool_size`, spec §6). Redis gets no `allow_ephemeral`
/// knob in the spec's CLI surface, so `min_size == max_size == size`.
pub fn redis_pool(name: &'static str, endpoint: Endpoint, size: usize) -> Arc<RedisPool> {
    let config = PoolConfig {
        min_size: size,
        max_size: size,
        allow_ephemeral: false,
    };
    Pool::new(name, vec![endpoint], config, |ep: &Endpoint| {
        let client = redis::Client::open(format!("redis://{}:{}/", ep.0, ep.1))?;
        client.get_connection()
    })
}
