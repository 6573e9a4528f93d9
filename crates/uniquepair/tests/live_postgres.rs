//! Exercises the handler against a real Postgres instance (spec §8: uniqueness,
//! NotFound/AlreadyExists boundaries). Needs `UNIQUEPAIR_TEST_DATABASE_URL`
//! pointing at a database with the `uniquepairs` table from spec §6 — not run
//! by default since no database is available in this workspace's CI.

use std::sync::Arc;

use buzzblog_pool::PoolConfig;
use buzzblog_rpc::RequestMeta;
use buzzblog_substrate::{db_pool, ServiceError};
use buzzblog_uniquepair::handler::UniquepairHandler;
use buzzblog_uniquepair::proto::{AddRequest, GetRequest, RemoveRequest};
use buzzblog_uniquepair::UniquepairException;

fn handler() -> Arc<UniquepairHandler> {
    let url = std::env::var("UNIQUEPAIR_TEST_DATABASE_URL")
        .expect("UNIQUEPAIR_TEST_DATABASE_URL must be set for this test");
    let (host, port) = url.rsplit_once(':').expect("host:port");
    let pool = db_pool(
        "uniquepair-test",
        (host.to_string(), port.parse().unwrap()),
        PoolConfig { min_size: 0, max_size: 1, allow_ephemeral: true },
        "buzzblog_uniquepair_test",
        "postgres".to_string(),
        "postgres".to_string(),
    );
    UniquepairHandler::new(pool)
}

#[test]
#[ignore = "requires a live Postgres instance"]
fn add_then_add_same_pair_is_already_exists() {
    let h = handler();
    let meta = RequestMeta::new("t1", 0);
    let first = h
        .add(AddRequest { meta: meta.clone(), domain: "follow".into(), first_elem: 1, second_elem: 2 })
        .unwrap();
    assert_eq!(first.item.domain, "follow");

    let second = h.add(AddRequest { meta, domain: "follow".into(), first_elem: 1, second_elem: 2 });
    assert!(matches!(second, Err(ServiceError::Domain(UniquepairException::AlreadyExists(_)))));
}

#[test]
#[ignore = "requires a live Postgres instance"]
fn remove_of_missing_id_is_not_found() {
    let h = handler();
    let meta = RequestMeta::new("t2", 0);
    let result = h.remove(RemoveRequest { meta, id: i32::MAX });
    assert!(matches!(result, Err(ServiceError::Domain(UniquepairException::NotFound(_)))));
}

#[test]
#[ignore = "requires a live Postgres instance"]
fn get_round_trips_an_added_pair() {
    let h = handler();
    let meta = RequestMeta::new("t3", 0);
    let added = h
        .add(AddRequest { meta: meta.clone(), domain: "like".into(), first_elem: 5, second_elem: 9 })
        .unwrap();
    let fetched = h.get(GetRequest { meta, id: added.item.id }).unwrap();
    assert_eq!(fetched.item, added.item);
}
