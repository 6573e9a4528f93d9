//! Exercises `expand_posts` (the row-expansion half of `list_posts`, spec
//! §4.8) against in-process fake Account and Like peers — no Postgres
//! involved, since row expansion is independent of how the rows were
//! fetched. Guards the per-row fan-out: each row's author and like-count
//! lookups must run concurrently, not sequentially, so the fake peers
//! sleep before replying and the test catches a regression to sequential
//! calls by wall-clock alone.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use buzzblog_pool::PoolConfig;
use buzzblog_post::domain::{AccountView, Post};
use buzzblog_post::PostHandler;
use buzzblog_rpc::codec::{CodecError, Message, MessageType, Reader, Writer};
use buzzblog_rpc::server::{bind, serve_listener, RpcService, ServerConfig};
use buzzblog_rpc::{ApplicationException, ClientConfig, RequestMeta};
use buzzblog_substrate::{db_pool, rpc_pool, Fanout};
use buzzblog_trending::TrendingClient;

const PEER_DELAY: Duration = Duration::from_millis(50);

struct FakeAccount;

impl RpcService for FakeAccount {
    fn name(&self) -> &'static str {
        "fake-account"
    }

    fn dispatch(&self, method: &str, payload: &[u8]) -> (MessageType, Vec<u8>) {
        match method {
            "retrieve_standard_account" => {
                let id = decode_id(payload).expect("decode id");
                thread::sleep(PEER_DELAY);
                let account = AccountView {
                    id,
                    created_at: 0,
                    active: true,
                    username: format!("user{id}"),
                    first_name: "First".to_string(),
                    last_name: "Last".to_string(),
                    followed_by_you: false,
                };
                let mut w = Writer::new();
                w.write_struct_field(1, |w| account.encode(w));
                w.write_stop();
                (MessageType::Reply, w.into_bytes())
            }
            other => (MessageType::Exception, ApplicationException::unknown_method(other).to_bytes()),
        }
    }
}

struct FakeLike;

impl RpcService for FakeLike {
    fn name(&self) -> &'static str {
        "fake-like"
    }

    fn dispatch(&self, method: &str, payload: &[u8]) -> (MessageType, Vec<u8>) {
        match method {
            "count_likes_of_post" => {
                let id = decode_id(payload).expect("decode id");
                thread::sleep(PEER_DELAY);
                let mut w = Writer::new();
                w.write_i32_field(1, id * 10);
                w.write_stop();
                (MessageType::Reply, w.into_bytes())
            }
            other => (MessageType::Exception, ApplicationException::unknown_method(other).to_bytes()),
        }
    }
}

/// The wire shape every `peer_*.rs`-style stub sends: a `meta` struct at
/// field 1 and the target `id` at field 2.
fn decode_id(payload: &[u8]) -> Result<i32, CodecError> {
    let mut r = Reader::new(payload);
    let mut id = None;
    while let Some((field_id, ty)) = r.read_field_begin()? {
        match field_id {
            2 => id = Some(r.read_i32()?),
            _ => r.skip_value(ty)?,
        }
    }
    id.ok_or(CodecError::MissingField(2, "id"))
}

fn spawn_fake(service: impl RpcService) -> u16 {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        threads: 8,
        accept_backlog: 16,
        concurrent_client_limit: 8,
    };
    let listener = bind(&config).expect("bind fake service");
    let port = listener.local_addr().expect("local_addr").port();
    thread::spawn(move || {
        let _ = serve_listener(listener, config.threads, config.concurrent_client_limit, Arc::new(service));
    });
    port
}

fn wait_for(port: u16) {
    for _ in 0..100 {
        if std::net::TcpStream::connect(("127.0.0.1", port)).is_ok() {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn expand_posts_fans_out_author_and_like_count_in_parallel() {
    let account_port = spawn_fake(FakeAccount);
    let like_port = spawn_fake(FakeLike);
    wait_for(account_port);
    wait_for(like_port);

    let pool_config = PoolConfig { min_size: 0, max_size: 8, allow_ephemeral: true };
    let account = buzzblog_post::PeerAccountClient::new(rpc_pool(
        "test-account",
        vec![("127.0.0.1".to_string(), account_port)],
        pool_config,
        ClientConfig::default(),
    ));
    let like = buzzblog_post::PeerLikeClient::new(rpc_pool(
        "test-like",
        vec![("127.0.0.1".to_string(), like_port)],
        pool_config,
        ClientConfig::default(),
    ));
    // Never dialed: `expand_posts` doesn't touch the database or Trending.
    let db = db_pool(
        "unused-db",
        ("127.0.0.1".to_string(), 1),
        PoolConfig { min_size: 0, max_size: 0, allow_ephemeral: false },
        "unused",
        "unused".to_string(),
        "unused".to_string(),
    );
    let trending = TrendingClient::new(rpc_pool(
        "unused-trending",
        vec![("127.0.0.1".to_string(), 1)],
        PoolConfig { min_size: 0, max_size: 0, allow_ephemeral: false },
        ClientConfig::default(),
    ));
    let fanout = Arc::new(Fanout::new(Arc::new(buzzblog_rpc::Executor::new(16))));
    let handler = PostHandler::new(db, trending, account, like, fanout);

    let posts = vec![
        Post { id: 1, created_at: 0, active: true, text: "a".to_string(), author_id: 10 },
        Post { id: 2, created_at: 0, active: true, text: "b".to_string(), author_id: 11 },
        Post { id: 3, created_at: 0, active: true, text: "c".to_string(), author_id: 12 },
    ];
    let meta = RequestMeta::new("t1", 1);

    let started = Instant::now();
    let expanded = handler.expand_posts(posts, &meta).expect("expand_posts");
    let elapsed = started.elapsed();

    assert_eq!(expanded.len(), 3);
    for (e, (author_id, post_id)) in expanded.iter().zip([(10, 1), (11, 2), (12, 3)]) {
        assert_eq!(e.author.id, author_id);
        assert_eq!(e.n_likes, post_id * 10);
    }

    assert!(
        elapsed < PEER_DELAY * 3,
        "expand_posts took {elapsed:?}, expected well under {:?} \
         (indicates the per-row author/like-count lookups regressed to sequential)",
        PEER_DELAY * 3
    );
}
