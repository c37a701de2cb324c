//! # Append Coordination
//!
//! A [`Ledger`] is a plain single-owner value. [`AppendCoordinator`] shares
//! one across threads and tasks and makes "read tip, seal, commit" atomic
//! with respect to other appends.
//!
//! ## Locking
//!
//! ```text
//! append_lock: Mutex<()>        one append (or import) in flight at a time
//! ledger:      RwLock<Ledger>   readers shared, commit exclusive
//!
//! append:
//!   lock append_lock
//!     read  ledger → prepare candidate on the tip
//!     seal  (no ledger lock held: readers keep going while we mine)
//!     write ledger → commit
//! ```
//!
//! Because every writer holds `append_lock`, the tip cannot move between
//! prepare and commit, so two appends can never both claim the same parent.
//! The commit still re-checks linkage, and a mismatch is rejected rather
//! than retried.
//!
//! ## Events
//!
//! Successful appends and imports are published on a broadcast channel.
//! Nobody has to listen; a send with no receivers is simply dropped.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::LedgerError;
use crate::query::{ChainStatistics, EthicalHistoryEntry, ForensicReport, SearchCriteria};
use crate::record::{DecisionRecord, EthicalJustification, ReasoningRecord};
use crate::storage::block::Block;
use crate::storage::chain::Ledger;
use crate::storage::validation::ValidationReport;

/// Capacity of the event channel. Slow subscribers lag rather than block
/// the writer.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Something that changed the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// A block was sealed and committed.
    BlockAppended { index: u64, hash: String },
    /// The chain was replaced by a validated import.
    ChainImported { length: usize },
}

/// Thread-safe handle to a shared [`Ledger`]. Cheap to clone.
#[derive(Clone)]
pub struct AppendCoordinator {
    ledger: Arc<RwLock<Ledger>>,
    append_lock: Arc<Mutex<()>>,
    events: broadcast::Sender<LedgerEvent>,
}

impl std::fmt::Debug for AppendCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppendCoordinator")
            .field("ledger", &*self.ledger.read())
            .field("subscribers", &self.events.receiver_count())
            .finish()
    }
}

impl AppendCoordinator {
    pub fn new(ledger: Ledger) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            append_lock: Arc::new(Mutex::new(())),
            events,
        }
    }

    /// Receive every subsequent [`LedgerEvent`].
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    // -----------------------------------------------------------------------
    // Writers
    // -----------------------------------------------------------------------

    /// Serialized append. Blocks the calling thread for the duration of the
    /// seal; see [`append_async`](Self::append_async) for async callers.
    pub fn append(
        &self,
        decision: DecisionRecord,
        reasoning: ReasoningRecord,
        justification: Option<EthicalJustification>,
    ) -> Result<Block, LedgerError> {
        let _writer = self.append_lock.lock();

        let (candidate, sealer) = {
            let ledger = self.ledger.read();
            (
                ledger.prepare(decision, reasoning, justification)?,
                ledger.sealer(),
            )
        };
        debug!(index = candidate.index, "sealing outside the chain lock");

        let sealed = sealer.seal(candidate)?;
        let block = self.ledger.write().commit(sealed)?;

        let _ = self.events.send(LedgerEvent::BlockAppended {
            index: block.index,
            hash: block.hash.clone(),
        });
        Ok(block)
    }

    /// [`append`](Self::append) on tokio's blocking pool, so the seal does
    /// not stall the async runtime.
    pub async fn append_async(
        &self,
        decision: DecisionRecord,
        reasoning: ReasoningRecord,
        justification: Option<EthicalJustification>,
    ) -> Result<Block, LedgerError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.append(decision, reasoning, justification))
            .await
            .map_err(|e| LedgerError::WorkerFailed(e.to_string()))?
    }

    /// Serialized import. Waits for any in-flight append.
    pub fn import_chain(&self, serialized: &str) -> ValidationReport {
        let _writer = self.append_lock.lock();
        let mut ledger = self.ledger.write();
        let report = ledger.import_chain(serialized);
        if report.valid {
            let _ = self.events.send(LedgerEvent::ChainImported {
                length: ledger.len(),
            });
        }
        report
    }

    // -----------------------------------------------------------------------
    // Readers
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.ledger.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.read().is_empty()
    }

    /// Copy of the tip.
    pub fn latest(&self) -> Block {
        self.ledger.read().latest().clone()
    }

    /// Consistent copy of the whole chain.
    pub fn snapshot(&self) -> Vec<Block> {
        self.ledger.read().blocks().to_vec()
    }

    pub fn validate_chain(&self) -> ValidationReport {
        self.ledger.read().validate_chain()
    }

    pub fn search(&self, criteria: &SearchCriteria) -> Vec<Block> {
        self.ledger.read().search(criteria)
    }

    pub fn statistics(&self) -> ChainStatistics {
        self.ledger.read().statistics()
    }

    pub fn export_chain(&self) -> Result<String, LedgerError> {
        self.ledger.read().export_chain()
    }

    pub fn forensic_report(&self, index: u64) -> Option<ForensicReport> {
        self.ledger.read().forensic_report(index)
    }

    pub fn ethical_history(&self) -> Vec<EthicalHistoryEntry> {
        self.ledger.read().ethical_history()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::record::DecisionKind;
    use std::thread;

    fn coordinator() -> AppendCoordinator {
        AppendCoordinator::new(Ledger::new(LedgerConfig::with_difficulty(2)).unwrap())
    }

    fn decision(id: String) -> DecisionRecord {
        DecisionRecord::new(id, DecisionKind::Operational, "act", "t")
            .with_confidence(0.8)
            .with_alternatives(["a", "b"])
    }

    #[test]
    fn concurrent_appends_form_a_single_line() {
        let coord = coordinator();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let coord = coord.clone();
                thread::spawn(move || {
                    for i in 0..4 {
                        coord
                            .append(
                                decision(format!("t{}-{}", t, i)),
                                ReasoningRecord::default(),
                                None,
                            )
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let chain = coord.snapshot();
        assert_eq!(chain.len(), 33);
        for pair in chain.windows(2) {
            assert_eq!(pair[1].index, pair[0].index + 1);
            assert_eq!(pair[1].previous_hash, pair[0].hash);
        }
        assert!(coord.validate_chain().valid);
    }

    #[test]
    fn readers_see_consistent_snapshots_during_appends() {
        let coord = coordinator();
        let writer = {
            let coord = coord.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    coord
                        .append(decision(format!("w-{}", i)), ReasoningRecord::default(), None)
                        .unwrap();
                }
            })
        };
        for _ in 0..50 {
            let report = coord.validate_chain();
            assert!(report.valid, "{:?}", report.errors);
        }
        writer.join().unwrap();
        assert_eq!(coord.len(), 11);
    }

    #[test]
    fn append_publishes_event() {
        let coord = coordinator();
        let mut rx = coord.subscribe();
        let block = coord
            .append(decision("e-1".to_string()), ReasoningRecord::default(), None)
            .unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            LedgerEvent::BlockAppended {
                index: 1,
                hash: block.hash
            }
        );
    }

    #[test]
    fn rejected_append_publishes_nothing() {
        let coord = coordinator();
        let mut rx = coord.subscribe();
        coord
            .append(decision("dup".to_string()), ReasoningRecord::default(), None)
            .unwrap();
        let _ = rx.try_recv();
        assert!(coord
            .append(decision("dup".to_string()), ReasoningRecord::default(), None)
            .is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn import_publishes_event_only_when_valid() {
        let source = coordinator();
        source
            .append(decision("s-1".to_string()), ReasoningRecord::default(), None)
            .unwrap();
        let exported = source.export_chain().unwrap();

        let target = coordinator();
        let mut rx = target.subscribe();
        assert!(!target.import_chain("[]").valid);
        assert!(rx.try_recv().is_err());

        assert!(target.import_chain(&exported).valid);
        assert_eq!(
            rx.try_recv().unwrap(),
            LedgerEvent::ChainImported { length: 2 }
        );
        assert_eq!(target.snapshot(), source.snapshot());
    }

    #[tokio::test]
    async fn async_append_runs_on_blocking_pool() {
        let coord = coordinator();
        let block = coord
            .append_async(decision("a-1".to_string()), ReasoningRecord::default(), None)
            .await
            .unwrap();
        assert_eq!(block.index, 1);
        assert_eq!(coord.latest(), block);
    }

    #[tokio::test]
    async fn async_timeout_surfaces() {
        let ledger = Ledger::new(LedgerConfig {
            difficulty: 64,
            max_seal_attempts: 3,
            ..LedgerConfig::default()
        })
        .unwrap();
        let coord = AppendCoordinator::new(ledger);
        let err = coord
            .append_async(decision("slow".to_string()), ReasoningRecord::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::SealingTimeout { .. }));
        assert_eq!(coord.len(), 1);
    }
}
