//! Business logic for Trending (spec §4.10): hashtag extraction gated by
//! Wordfilter, scored in a Redis sorted set.

use std::sync::Arc;

use anyhow::Context;
use buzzblog_rpc::codec::MessageType;
use buzzblog_rpc::server::RpcService;
use buzzblog_rpc::{NoException, RequestMeta};
use buzzblog_substrate::{dispatch_call, logging, LogTag, RedisPool, ServiceResult};
use buzzblog_wordfilter::WordfilterClient;
use redis::Commands;

use crate::proto::{
    FetchTrendingHashtagsReply, FetchTrendingHashtagsRequest, ProcessPostReply, ProcessPostRequest,
};

const HASHTAGS_KEY: &str = "trending:hashtags";

pub struct TrendingHandler {
    redis: Arc<RedisPool>,
    wordfilter: WordfilterClient,
}

impl TrendingHandler {
    pub fn new(redis: Arc<RedisPool>, wordfilter: WordfilterClient) -> Arc<Self> {
        Arc::new(TrendingHandler { redis, wordfilter })
    }

    fn tag(&self, meta: &RequestMeta, function: &'static str, remote: &'static str) -> LogTag {
        LogTag {
            local_service: "trending",
            local_function: function,
            remote,
            remote_function: "score".to_string(),
            request_id: meta.id.clone(),
        }
    }

    /// Tokenizes on whitespace, keeping `#tag` tokens longer than one
    /// character (spec §4.10). Pure so it can be unit tested without Redis.
    pub fn extract_hashtags(text: &str) -> Vec<&str> {
        text.split_whitespace()
            .filter(|t| t.len() > 1 && t.starts_with('#'))
            .map(|t| &t[1..])
            .collect()
    }

    pub fn process_post(&self, req: ProcessPostRequest) -> ServiceResult<ProcessPostReply, NoException> {
        let meta = req.meta.clone();
        let log_tag = self.tag(&meta, "process_post", "redis");
        logging::logged(logging::RPC_CALL, log_tag, || {
            // Sequential by design (spec §4.10: "the source does not
            // parallelize" this loop).
            for tag in Self::extract_hashtags(&req.text) {
                let valid = self
                    .wordfilter
                    .is_valid_word(&meta, tag)
                    .context("checking hashtag against wordfilter")?;
                if valid {
                    let mut conn = self.redis.acquire().context("acquiring redis connection")?;
                    let _: i64 = conn
                        .zincr(HASHTAGS_KEY, tag, 1i64)
                        .context("incrementing hashtag score")?;
                }
            }
            Ok(ProcessPostReply)
        })
    }

    pub fn fetch_trending_hashtags(
        &self,
        req: FetchTrendingHashtagsRequest,
    ) -> ServiceResult<FetchTrendingHashtagsReply, NoException> {
        let log_tag = self.tag(&req.meta, "fetch_trending_hashtags", "redis");
        logging::logged(logging::RPC_CALL, log_tag, || {
            let mut conn = self.redis.acquire().context("acquiring redis connection")?;
            // Ascending ZRANGE, exactly as the source does (spec §9 Open
            // Question 4 — preserved, not "fixed" to descending.
            let hashtags: Vec<String> = conn
                .zrange(HASHTAGS_KEY, 0, req.limit as isize)
                .context("fetching trending hashtags")?;
            Ok(FetchTrendingHashtagsReply { hashtags })
        })
    }
}

impl RpcService for TrendingHandler {
    fn name(&self) -> &'static str {
        "trending"
    }

    fn dispatch(&self, method: &str, payload: &[u8]) -> (MessageType, Vec<u8>) {
        match method {
            "process_post" => dispatch_call(payload, |req| self.process_post(req)),
            "fetch_trending_hashtags" => dispatch_call(payload, |req| self.fetch_trending_hashtags(req)),
            other => (
                MessageType::Exception,
                buzzblog_rpc::ApplicationException::unknown_method(other).to_bytes(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_hashtags_longer_than_one_char() {
        let tags = TrendingHandler::extract_hashtags("hello #rust and #corinthians #a #");
        assert_eq!(tags, vec!["rust", "corinthians"]);
    }

    #[test]
    fn ignores_words_without_hash_prefix() {
        let tags = TrendingHandler::extract_hashtags("no hashtags here");
        assert!(tags.is_empty());
    }
}
