//! Exercises `list_follows` against in-process fake Uniquepair and Account
//! peers (no network beyond localhost, no Postgres). Also guards the
//! per-row fan-out: each row's follower/followee account lookups must run
//! concurrently, not one after the other, so a fake Account peer that
//! sleeps before replying lets the test catch a regression to sequential
//! calls by wall-clock alone.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use buzzblog_follow::domain::{AccountView, FollowQuery};
use buzzblog_follow::proto::ListFollowsRequest;
use buzzblog_follow::FollowHandler;
use buzzblog_pool::PoolConfig;
use buzzblog_rpc::codec::{CodecError, Message, MessageType, Reader, Writer};
use buzzblog_rpc::server::{bind, serve_listener, RpcService, ServerConfig};
use buzzblog_rpc::{ApplicationException, ClientConfig, RequestMeta};
use buzzblog_substrate::{rpc_pool, Fanout};
use buzzblog_uniquepair::proto::{FetchReply, FetchRequest};
use buzzblog_uniquepair::{UniquepairClient, UniquepairException};

const ACCOUNT_DELAY: Duration = Duration::from_millis(50);

/// A fake Uniquepair peer serving one canned page of rows for any `fetch`.
struct FakeUniquepair {
    rows: Vec<buzzblog_uniquepair::Uniquepair>,
}

impl RpcService for FakeUniquepair {
    fn name(&self) -> &'static str {
        "fake-uniquepair"
    }

    fn dispatch(&self, method: &str, payload: &[u8]) -> (MessageType, Vec<u8>) {
        match method {
            "fetch" => buzzblog_substrate::dispatch_call(
                payload,
                |_req: FetchRequest| -> buzzblog_substrate::ServiceResult<FetchReply, UniquepairException> {
                    Ok(FetchReply { items: self.rows.clone() })
                },
            ),
            other => (MessageType::Exception, ApplicationException::unknown_method(other).to_bytes()),
        }
    }
}

/// A fake Account peer answering `retrieve_standard_account` after
/// sleeping `ACCOUNT_DELAY`, so two sequential calls take roughly twice as
/// long as two calls issued in parallel.
struct FakeAccount;

impl RpcService for FakeAccount {
    fn name(&self) -> &'static str {
        "fake-account"
    }

    fn dispatch(&self, method: &str, payload: &[u8]) -> (MessageType, Vec<u8>) {
        match method {
            "retrieve_standard_account" => {
                let id = match decode_id(payload) {
                    Ok(id) => id,
                    Err(e) => {
                        return (
                            MessageType::Exception,
                            ApplicationException::new(
                                buzzblog_rpc::ApplicationExceptionKind::ProtocolError,
                                e.to_string(),
                            )
                            .to_bytes(),
                        )
                    }
                };
                thread::sleep(ACCOUNT_DELAY);
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

/// The wire shape every `peer_account.rs`-style stub sends: a `meta` struct
/// at field 1 and the target `id` at field 2. Only `id` matters here.
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

/// Binds a fake service to an ephemeral localhost port and serves it on a
/// background thread for the life of the test process.
fn spawn_fake(service: impl RpcService) -> u16 {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        threads: 8,
        accept_backlog: 16,
        concurrent_client_limit: 8,
    };
    let listener = bind(&config).expect("bind fake service");
    let port = listener
        .local_addr()
        .expect("local_addr")
        .port();
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
fn list_follows_expands_rows_and_fans_out_in_parallel() {
    let uniquepair_port = spawn_fake(FakeUniquepair {
        rows: vec![
            buzzblog_uniquepair::Uniquepair { id: 1, created_at: 0, domain: "follow".to_string(), first_elem: 10, second_elem: 20 },
            buzzblog_uniquepair::Uniquepair { id: 2, created_at: 0, domain: "follow".to_string(), first_elem: 11, second_elem: 21 },
            buzzblog_uniquepair::Uniquepair { id: 3, created_at: 0, domain: "follow".to_string(), first_elem: 12, second_elem: 22 },
        ],
    });
    let account_port = spawn_fake(FakeAccount);
    wait_for(uniquepair_port);
    wait_for(account_port);

    let pool_config = PoolConfig { min_size: 0, max_size: 8, allow_ephemeral: true };
    let uniquepair = UniquepairClient::new(rpc_pool(
        "test-uniquepair",
        vec![("127.0.0.1".to_string(), uniquepair_port)],
        pool_config,
        ClientConfig::default(),
    ));
    let account = buzzblog_follow::PeerAccountClient::new(rpc_pool(
        "test-account",
        vec![("127.0.0.1".to_string(), account_port)],
        pool_config,
        ClientConfig::default(),
    ));
    let fanout = Arc::new(Fanout::new(Arc::new(buzzblog_rpc::Executor::new(16))));
    let handler = FollowHandler::new(uniquepair, account, fanout);

    let meta = RequestMeta::new("t1", 1);
    let req = ListFollowsRequest {
        meta,
        query: FollowQuery::default(),
        limit: 10,
        offset: 0,
    };

    let started = Instant::now();
    let reply = handler.list_follows(req).expect("list_follows");
    let elapsed = started.elapsed();

    assert_eq!(reply.follows.len(), 3);
    for (expanded, (follower_id, followee_id)) in reply.follows.iter().zip([(10, 20), (11, 21), (12, 22)]) {
        assert_eq!(expanded.follower.id, follower_id);
        assert_eq!(expanded.followee.id, followee_id);
    }

    // Each row fans its two account lookups out concurrently (mirroring
    // `expand_one`), and rows themselves fan out across each other, so the
    // whole call should take roughly one `ACCOUNT_DELAY`, not three rows
    // times two sequential calls (6x).
    assert!(
        elapsed < ACCOUNT_DELAY * 3,
        "list_follows took {elapsed:?}, expected well under {:?} \
         (indicates the per-row account lookups regressed to sequential)",
        ACCOUNT_DELAY * 3
    );
}
