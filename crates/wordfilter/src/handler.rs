//! Business logic for Wordfilter (spec §4.11): an in-memory invalid-word set
//! seeded once at startup, no persisted state and no peer dependencies.

use std::collections::HashSet;
use std::sync::Arc;

use buzzblog_rpc::codec::MessageType;
use buzzblog_rpc::server::RpcService;
use buzzblog_rpc::NoException;
use buzzblog_substrate::{dispatch_call, logging, LogTag, ServiceResult};
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::proto::{IsValidWordReply, IsValidWordRequest};

const SEED_WORD: &str = "corinthians";
const RANDOM_WORD_LEN: usize = 11;

pub struct WordfilterHandler {
    invalid_words: HashSet<String>,
}

impl WordfilterHandler {
    /// `n_invalid_words == 0` means an empty filter (everything is valid);
    /// otherwise the set always includes `"corinthians"` plus `n - 1`
    /// random 11-character alphanumeric strings (spec §3, §4.11).
    pub fn new(n_invalid_words: usize) -> Arc<Self> {
        let mut invalid_words = HashSet::new();
        if n_invalid_words > 0 {
            invalid_words.insert(SEED_WORD.to_string());
            let mut rng = rand::thread_rng();
            while invalid_words.len() < n_invalid_words {
                let word: String = (&mut rng)
                    .sample_iter(Alphanumeric)
                    .take(RANDOM_WORD_LEN)
                    .map(char::from)
                    .collect();
                invalid_words.insert(word);
            }
        }
        Arc::new(WordfilterHandler { invalid_words })
    }

    pub fn is_valid_word(&self, req: IsValidWordRequest) -> ServiceResult<IsValidWordReply, NoException> {
        let tag = LogTag {
            local_service: "wordfilter",
            local_function: "is_valid_word",
            remote: "none",
            remote_function: "none".to_string(),
            request_id: req.meta.id.clone(),
        };
        logging::logged(logging::RPC_CALL, tag, || {
            Ok(IsValidWordReply {
                valid: !self.invalid_words.contains(&req.word),
            })
        })
    }
}

impl RpcService for WordfilterHandler {
    fn name(&self) -> &'static str {
        "wordfilter"
    }

    fn dispatch(&self, method: &str, payload: &[u8]) -> (MessageType, Vec<u8>) {
        match method {
            "is_valid_word" => dispatch_call(payload, |req| self.is_valid_word(req)),
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
    use buzzblog_rpc::RequestMeta;

    #[test]
    fn empty_filter_accepts_everything() {
        let h = WordfilterHandler::new(0);
        let reply = h
            .is_valid_word(IsValidWordRequest { meta: RequestMeta::new("r", 0), word: "corinthians".into() })
            .unwrap();
        assert!(reply.valid);
    }

    #[test]
    fn seeded_filter_always_rejects_corinthians() {
        let h = WordfilterHandler::new(5);
        assert_eq!(h.invalid_words.len(), 5);
        let reply = h
            .is_valid_word(IsValidWordRequest { meta: RequestMeta::new("r", 0), word: "corinthians".into() })
            .unwrap();
        assert!(!reply.valid);
    }

    #[test]
    fn seeded_filter_accepts_unrelated_word() {
        let h = WordfilterHandler::new(3);
        let reply = h
            .is_valid_word(IsValidWordRequest { meta: RequestMeta::new("r", 0), word: "rust".into() })
            .unwrap();
        assert!(reply.valid);
    }
}
