//! Exercises `list_likes` against in-process fake Uniquepair, Account, and
//! Post peers. Guards the per-row fan-out: each row's account and post
//! lookups must run concurrently, not sequentially, so the fake Post peer
//! sleeps before replying and the test catches a regression to sequential
//! calls by wall-clock alone.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use buzzblog_like::domain::{AccountView, ExpandedPostView, LikeQuery, PostView};
use buzzblog_like::proto::ListLikesRequest;
use buzzblog_like::LikeHandler;
use buzzblog_pool::PoolConfig;
use buzzblog_rpc::codec::{CodecError, Message, MessageType, Reader, Writer};
use buzzblog_rpc::server::{bind, serve_listener, RpcService, ServerConfig};
use buzzblog_rpc::{ApplicationException, ClientConfig, RequestMeta};
use buzzblog_substrate::{rpc_pool, Fanout};
use buzzblog_uniquepair::proto::{FetchReply, FetchRequest};
use buzzblog_uniquepair::{UniquepairClient, UniquepairException};

const PEER_DELAY: Duration = Duration::from_millis(50);

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

struct FakePost;

impl RpcService for FakePost {
    fn name(&self) -> &'static str {
        "fake-post"
    }

    fn dispatch(&self, method: &str, payload: &[u8]) -> (MessageType, Vec<u8>) {
        match method {
            "retrieve_expanded_post" => {
                let id = decode_id(payload).expect("decode id");
                thread::sleep(PEER_DELAY);
                let expanded = ExpandedPostView {
                    post: PostView { id, created_at: 0, active: true, text: "hi".to_string(), author_id: 99 },
                    author: AccountView {
                        id: 99,
                        created_at: 0,
                        active: true,
                        username: "author".to_string(),
                        first_name: "Author".to_string(),
                        last_name: "Name".to_string(),
                        followed_by_you: false,
                    },
                    n_likes: 4,
                };
                let mut w = Writer::new();
                w.write_struct_field(1, |w| expanded.encode(w));
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
fn list_likes_expands_rows_and_fans_out_in_parallel() {
    let uniquepair_port = spawn_fake(FakeUniquepair {
        rows: vec![
            buzzblog_uniquepair::Uniquepair { id: 1, created_at: 0, domain: "like".to_string(), first_elem: 10, second_elem: 100 },
            buzzblog_uniquepair::Uniquepair { id: 2, created_at: 0, domain: "like".to_string(), first_elem: 11, second_elem: 101 },
            buzzblog_uniquepair::Uniquepair { id: 3, created_at: 0, domain: "like".to_string(), first_elem: 12, second_elem: 102 },
        ],
    });
    let account_port = spawn_fake(FakeAccount);
    let post_port = spawn_fake(FakePost);
    wait_for(uniquepair_port);
    wait_for(account_port);
    wait_for(post_port);

    let pool_config = PoolConfig { min_size: 0, max_size: 8, allow_ephemeral: true };
    let uniquepair = UniquepairClient::new(rpc_pool(
        "test-uniquepair",
        vec![("127.0.0.1".to_string(), uniquepair_port)],
        pool_config,
        ClientConfig::default(),
    ));
    let account = buzzblog_like::PeerAccountClient::new(rpc_pool(
        "test-account",
        vec![("127.0.0.1".to_string(), account_port)],
        pool_config,
        ClientConfig::default(),
    ));
    let post = buzzblog_like::PeerPostClient::new(rpc_pool(
        "test-post",
        vec![("127.0.0.1".to_string(), post_port)],
        pool_config,
        ClientConfig::default(),
    ));
    let fanout = Arc::new(Fanout::new(Arc::new(buzzblog_rpc::Executor::new(16))));
    let handler = LikeHandler::new(uniquepair, account, post, fanout);

    let meta = RequestMeta::new("t1", 1);
    let req = ListLikesRequest { meta, query: LikeQuery::default(), limit: 10, offset: 0 };

    let started = Instant::now();
    let reply = handler.list_likes(req).expect("list_likes");
    let elapsed = started.elapsed();

    assert_eq!(reply.likes.len(), 3);
    for (expanded, (account_id, post_id)) in reply.likes.iter().zip([(10, 100), (11, 101), (12, 102)]) {
        assert_eq!(expanded.account.id, account_id);
        assert_eq!(expanded.post.post.id, post_id);
        assert_eq!(expanded.post.n_likes, 4);
    }

    assert!(
        elapsed < PEER_DELAY * 3,
        "list_likes took {elapsed:?}, expected well under {:?} \
         (indicates the per-row account/post lookups regressed to sequential)",
        PEER_DELAY * 3
    );
}
