//! Best-ever records
//!
//! Two persisted values: the high score and the best per-kind token tallies.
//! Both only ever move up, and only when a finished run beats them.

use serde::{Deserialize, Serialize};

use crate::persistence::Storage;
use crate::sim::TokenCounts;

/// Storage key for the best score (a JSON number)
pub const HIGH_SCORE_KEY: &str = "gate_glider_high_score";
/// Storage key for the best token tallies (a JSON record)
pub const BEST_TOKENS_KEY: &str = "gate_glider_best_tokens";

/// What a finished run improved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub new_high_score: bool,
    pub new_token_best: bool,
}

/// Best score and best token tallies across runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    pub best_score: u32,
    pub best_tokens: TokenCounts,
}

impl HighScores {
    /// Create empty records
    pub fn new() -> Self {
        Self::default()
    }

    /// Load both records; anything missing or malformed falls back to zero
    pub fn load(storage: &impl Storage) -> Self {
        let best_score = read_json(storage, HIGH_SCORE_KEY).unwrap_or(0);
        let best_tokens = read_json(storage, BEST_TOKENS_KEY).unwrap_or_default();
        log::info!("Loaded records: best score {}", best_score);
        Self {
            best_score,
            best_tokens,
        }
    }

    /// Fold a finished run into the records without touching storage
    pub fn record_run(&mut self, score: u32, tokens: &TokenCounts) -> RunOutcome {
        let new_high_score = score > self.best_score;
        if new_high_score {
            self.best_score = score;
        }
        let new_token_best = self.best_tokens.merge_max(tokens);
        RunOutcome {
            new_high_score,
            new_token_best,
        }
    }

    /// Record a finished run and persist whichever records changed.
    ///
    /// Write failures are logged and otherwise ignored.
    pub fn commit_run(
        &mut self,
        storage: &mut impl Storage,
        score: u32,
        tokens: &TokenCounts,
    ) -> RunOutcome {
        let outcome = self.record_run(score, tokens);
        if outcome.new_high_score {
            write_json(storage, HIGH_SCORE_KEY, &self.best_score);
            log::info!("New high score: {}", self.best_score);
        }
        if outcome.new_token_best {
            write_json(storage, BEST_TOKENS_KEY, &self.best_tokens);
        }
        outcome
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(storage: &impl Storage, key: &str) -> Option<T> {
    let raw = storage.read(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("Ignoring malformed {}: {}", key, err);
            None
        }
    }
}

fn write_json<T: Serialize>(storage: &mut impl Storage, key: &str, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(err) => {
            log::warn!("Could not encode {}: {}", key, err);
            return;
        }
    };
    if let Err(err) = storage.write(key, &json) {
        log::warn!("Could not save {}: {}", key, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use proptest::prelude::*;

    #[test]
    fn test_load_defaults_when_absent() {
        let storage = MemoryStorage::new();
        assert_eq!(HighScores::load(&storage), HighScores::new());
    }

    #[test]
    fn test_load_ignores_malformed_values() {
        let storage = MemoryStorage::new()
            .with_value(HIGH_SCORE_KEY, "not a number")
            .with_value(BEST_TOKENS_KEY, "{\"wide\": 4}");
        let records = HighScores::load(&storage);
        assert_eq!(records.best_score, 0);
        assert_eq!(records.best_tokens.wide, 4);

        let storage = MemoryStorage::new()
            .with_value(HIGH_SCORE_KEY, "17")
            .with_value(BEST_TOKENS_KEY, "[1, 2");
        let records = HighScores::load(&storage);
        assert_eq!(records.best_score, 17);
        assert_eq!(records.best_tokens, TokenCounts::default());
    }

    #[test]
    fn test_commit_run_persists_only_improvements() {
        let mut storage = MemoryStorage::new();
        let mut records = HighScores::new();

        let tokens = TokenCounts {
            slow: 2,
            ..Default::default()
        };
        let outcome = records.commit_run(&mut storage, 9, &tokens);
        assert!(outcome.new_high_score && outcome.new_token_best);
        assert_eq!(storage.read(HIGH_SCORE_KEY).as_deref(), Some("9"));

        let worse = TokenCounts {
            slow: 1,
            ..Default::default()
        };
        let outcome = records.commit_run(&mut storage, 3, &worse);
        assert_eq!(outcome, RunOutcome::default());
        assert_eq!(HighScores::load(&storage), records);
    }

    #[test]
    fn test_write_failure_keeps_in_memory_records() {
        let mut storage = MemoryStorage::read_only();
        let mut records = HighScores::new();
        let outcome = records.commit_run(&mut storage, 5, &TokenCounts::default());
        assert!(outcome.new_high_score);
        assert_eq!(records.best_score, 5);
        assert!(storage.read(HIGH_SCORE_KEY).is_none());
    }

    fn counts_strategy() -> impl Strategy<Value = TokenCounts> {
        proptest::collection::vec(0u32..20, 8).prop_map(|v| TokenCounts {
            wide: v[0],
            slow: v[1],
            boost: v[2],
            flash: v[3],
            palette: v[4],
            ghost: v[5],
            frictionless: v[6],
            chaos: v[7],
        })
    }

    proptest! {
        #[test]
        fn prop_best_counts_never_decrease(
            runs in proptest::collection::vec((0u32..100, counts_strategy()), 1..20)
        ) {
            let mut storage = MemoryStorage::new();
            let mut records = HighScores::new();
            for (score, tokens) in runs {
                let before = records.clone();
                records.commit_run(&mut storage, score, &tokens);
                prop_assert!(records.best_score >= before.best_score);
                prop_assert!(records.best_score >= score);
                for kind in crate::sim::TokenKind::ALL {
                    prop_assert!(records.best_tokens.get(kind) >= before.best_tokens.get(kind));
                    prop_assert!(records.best_tokens.get(kind) >= tokens.get(kind));
                }
            }
            prop_assert_eq!(HighScores::load(&storage), records);
        }
    }
}
