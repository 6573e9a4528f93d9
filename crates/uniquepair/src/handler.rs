//! Business logic for the Uniquepair service (spec §4.9): pure CRUD over one
//! Postgres table, no peer-service dependencies.

use std::sync::Arc;

use anyhow::Context;
use buzzblog_rpc::codec::MessageType;
use buzzblog_rpc::server::RpcService;
use buzzblog_substrate::{dispatch_call, logging, now_epoch, DbPool, LogTag, ServiceError, ServiceResult};
use postgres::error::SqlState;
use postgres::Row;

use crate::domain::{Uniquepair, UniquepairQuery};
use crate::exception::UniquepairException;
use crate::proto::{
    AddRequest, CountReply, CountRequest, FetchReply, FetchRequest, FindReply, FindRequest,
    GetRequest, RemoveRequest, UniquepairReply, UnitReply,
};

pub struct UniquepairHandler {
    db: Arc<DbPool>,
}

impl UniquepairHandler {
    pub fn new(db: Arc<DbPool>) -> Arc<Self> {
        Arc::new(UniquepairHandler { db })
    }

    fn tag(&self, request_id: &str, function: &'static str) -> LogTag {
        LogTag {
            local_service: "uniquepair",
            local_function: function,
            remote: "postgres",
            remote_function: "query".to_string(),
            request_id: request_id.to_string(),
        }
    }

    pub fn get(&self, req: GetRequest) -> ServiceResult<UniquepairReply, UniquepairException> {
        let tag = self.tag(&req.meta.id, "get");
        logging::logged(logging::QUERY_CALL, tag, || {
            let mut conn = self.db.acquire().context("acquiring uniquepair db connection")?;
            let row = conn
                .query_opt(
                    "SELECT id, created_at, domain, first_elem, second_elem \
                     FROM uniquepairs WHERE id = $1",
                    &[&req.id],
                )
                .context("querying uniquepair by id")?;
            match row {
                Some(row) => Ok(UniquepairReply { item: row_to_uniquepair(&row) }),
                None => Err(ServiceError::Domain(UniquepairException::NotFound(format!(
                    "uniquepair {} not found",
                    req.id
                )))),
            }
        })
    }

    pub fn add(&self, req: AddRequest) -> ServiceResult<UniquepairReply, UniquepairException> {
        let tag = self.tag(&req.meta.id, "add");
        logging::logged(logging::QUERY_CALL, tag, || {
            let mut conn = self.db.acquire().context("acquiring uniquepair db connection")?;
            let created_at = now_epoch();
            let row = conn.query_one(
                "INSERT INTO uniquepairs (domain, first_elem, second_elem, created_at) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING id, created_at, domain, first_elem, second_elem",
                &[&req.domain, &req.first_elem, &req.second_elem, &created_at],
            );
            match row {
                Ok(row) => Ok(UniquepairReply { item: row_to_uniquepair(&row) }),
                Err(e) if is_unique_violation(&e) => Err(ServiceError::Domain(
                    UniquepairException::AlreadyExists(format!(
                        "({}, {}, {}) already exists",
                        req.domain, req.first_elem, req.second_elem
                    )),
                )),
                Err(e) => Err(anyhow::Error::from(e).context("inserting uniquepair").into()),
            }
        })
    }

    pub fn remove(&self, req: RemoveRequest) -> ServiceResult<UnitReply, UniquepairException> {
        let tag = self.tag(&req.meta.id, "remove");
        logging::logged(logging::QUERY_CALL, tag, || {
            let mut conn = self.db.acquire().context("acquiring uniquepair db connection")?;
            let rows = conn
                .query("DELETE FROM uniquepairs WHERE id = $1 RETURNING id", &[&req.id])
                .context("deleting uniquepair")?;
            if rows.is_empty() {
                Err(ServiceError::Domain(UniquepairException::NotFound(format!(
                    "uniquepair {} not found",
                    req.id
                ))))
            } else {
                Ok(UnitReply)
            }
        })
    }

    /// Never raises: a miss is a `false`, not `NotFound` (spec §4.9).
    pub fn find(&self, req: FindRequest) -> ServiceResult<FindReply, UniquepairException> {
        let tag = self.tag(&req.meta.id, "find");
        logging::logged(logging::QUERY_CALL, tag, || {
            let mut conn = self.db.acquire().context("acquiring uniquepair db connection")?;
            let row = conn
                .query_opt(
                    "SELECT 1 FROM uniquepairs WHERE domain = $1 AND first_elem = $2 AND second_elem = $3",
                    &[&req.domain, &req.first_elem, &req.second_elem],
                )
                .context("finding uniquepair")?;
            Ok(FindReply { present: row.is_some() })
        })
    }

    pub fn fetch(&self, req: FetchRequest) -> ServiceResult<FetchReply, UniquepairException> {
        let tag = self.tag(&req.meta.id, "fetch");
        logging::logged(logging::QUERY_CALL, tag, || {
            let mut conn = self.db.acquire().context("acquiring uniquepair db connection")?;
            let rows = fetch_rows(&mut conn, &req.query, req.limit, req.offset)
                .context("fetching uniquepairs")?;
            Ok(FetchReply {
                items: rows.iter().map(row_to_uniquepair).collect(),
            })
        })
    }

    pub fn count(&self, req: CountRequest) -> ServiceResult<CountReply, UniquepairException> {
        let tag = self.tag(&req.meta.id, "count");
        logging::logged(logging::QUERY_CALL, tag, || {
            let mut conn = self.db.acquire().context("acquiring uniquepair db connection")?;
            let count = count_rows(&mut conn, &req.query).context("counting uniquepairs")?;
            Ok(CountReply { count: count as i32 })
        })
    }
}

impl RpcService for UniquepairHandler {
    fn name(&self) -> &'static str {
        "uniquepair"
    }

    fn dispatch(&self, method: &str, payload: &[u8]) -> (MessageType, Vec<u8>) {
        match method {
            "get" => dispatch_call(payload, |req| self.get(req)),
            "add" => dispatch_call(payload, |req| self.add(req)),
            "remove" => dispatch_call(payload, |req| self.remove(req)),
            "find" => dispatch_call(payload, |req| self.find(req)),
            "fetch" => dispatch_call(payload, |req| self.fetch(req)),
            "count" => dispatch_call(payload, |req| self.count(req)),
            other => (
                MessageType::Exception,
                buzzblog_rpc::ApplicationException::unknown_method(other).to_bytes(),
            ),
        }
    }
}

fn row_to_uniquepair(row: &Row) -> Uniquepair {
    Uniquepair {
        id: row.get("id"),
        created_at: row.get("created_at"),
        domain: row.get("domain"),
        first_elem: row.get("first_elem"),
        second_elem: row.get("second_elem"),
    }
}

fn fetch_rows(
    conn: &mut postgres::Client,
    query: &UniquepairQuery,
    limit: i32,
    offset: i32,
) -> Result<Vec<Row>, postgres::Error> {
    const COLUMNS: &str = "id, created_at, domain, first_elem, second_elem";
    match (query.first_elem, query.second_elem) {
        (None, None) => conn.query(
            &format!(
                "SELECT {COLUMNS} FROM uniquepairs WHERE domain = $1 \
                 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
            ),
            &[&query.domain, &limit, &offset],
        ),
        (Some(a), None) => conn.query(
            &format!(
                "SELECT {COLUMNS} FROM uniquepairs WHERE domain = $1 AND first_elem = $2 \
                 ORDER BY created_at DESC LIMIT $3 OFFSET $4"
            ),
            &[&query.domain, &a, &limit, &offset],
        ),
        (None, Some(b)) => conn.query(
            &format!(
                "SELECT {COLUMNS} FROM uniquepairs WHERE domain = $1 AND second_elem = $2 \
                 ORDER BY created_at DESC LIMIT $3 OFFSET $4"
            ),
            &[&query.domain, &b, &limit, &offset],
        ),
        (Some(a), Some(b)) => conn.query(
            &format!(
                "SELECT {COLUMNS} FROM uniquepairs WHERE domain = $1 AND first_elem = $2 \
                 AND second_elem = $3 ORDER BY created_at DESC LIMIT $4 OFFSET $5"
            ),
            &[&query.domain, &a, &b, &limit, &offset],
        ),
    }
}

fn count_rows(conn: &mut postgres::Client, query: &UniquepairQuery) -> Result<i64, postgres::Error> {
    let row = match (query.first_elem, query.second_elem) {
        (None, None) => conn.query_one(
            "SELECT COUNT(*) FROM uniquepairs WHERE domain = $1",
            &[&query.domain],
        ),
        (Some(a), None) => conn.query_one(
            "SELECT COUNT(*) FROM uniquepairs WHERE domain = $1 AND first_elem = $2",
            &[&query.domain, &a],
        ),
        (None, Some(b)) => conn.query_one(
            "SELECT COUNT(*) FROM uniquepairs WHERE domain = $1 AND second_elem = $2",
            &[&query.domain, &b],
        ),
        (Some(a), Some(b)) => conn.query_one(
            "SELECT COUNT(*) FROM uniquepairs WHERE domain = $1 AND first_elem = $2 AND second_elem = $3",
            &[&query.domain, &a, &b],
        ),
    }?;
    Ok(row.get(0))
}

fn is_unique_violation(e: &postgres::Error) -> bool {
    e.code() == Some(&SqlState::UNIQUE_VIOLATION)
}
