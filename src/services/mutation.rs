//! Optimistic bet status updates with rollback
//!
//! A patch is applied to the cached record before the remote update is sent.
//! Mutations of the same record are serialized: only the head of a record's
//! queue is on the wire. When the head fails, its prior values are handed to
//! the next queued mutation that writes the same fields, and whatever is left
//! is written back to the record. The cache therefore always converges on what
//! the store will report.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::{BetId, BetPatch, BetRecord, BetStats};
use crate::error::{HedgeError, Result};
use crate::gateway::BetStore;

#[derive(Debug, Clone)]
struct PendingMutation {
    seq: u64,
    patch: BetPatch,
    /// Values to restore if this mutation fails
    previous: BetPatch,
}

#[derive(Debug)]
struct MutationCompletion {
    bet_id: BetId,
    seq: u64,
    result: Result<()>,
}

pub struct OptimisticMutationCoordinator {
    store: Arc<dyn BetStore>,
    records: Vec<BetRecord>,
    queues: HashMap<BetId, VecDeque<PendingMutation>>,
    next_seq: u64,
    completions_tx: mpsc::UnboundedSender<MutationCompletion>,
    completions_rx: mpsc::UnboundedReceiver<MutationCompletion>,
    in_flight: usize,
}

impl OptimisticMutationCoordinator {
    pub fn new(store: Arc<dyn BetStore>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            store,
            records: Vec::new(),
            queues: HashMap::new(),
            next_seq: 0,
            completions_tx,
            completions_rx,
            in_flight: 0,
        }
    }

    /// Replace the cache with the store's records.
    ///
    /// Mutations still queued are re-applied on top, so a refresh never
    /// shows a value the user has already changed.
    pub async fn load(&mut self) -> Result<usize> {
        let mut records = self.store.list_bets().await?;

        for record in &mut records {
            if let Some(queue) = self.queues.get(&record.id) {
                for pending in queue {
                    pending.patch.apply_to(record);
                }
            }
        }

        info!(count = records.len(), "bets loaded");
        self.records = records;
        Ok(self.records.len())
    }

    pub fn records(&self) -> &[BetRecord] {
        &self.records
    }

    pub fn record(&self, id: &BetId) -> Option<&BetRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn stats(&self) -> BetStats {
        BetStats::from_records(&self.records)
    }

    /// The record has unconfirmed changes
    pub fn is_saving(&self, id: &BetId) -> bool {
        self.queues.get(id).is_some_and(|q| !q.is_empty())
    }

    /// Apply `patch` locally and queue the remote update.
    ///
    /// Returns the mutation's sequence number. The cached record reflects the
    /// patch as soon as this returns.
    pub fn update(&mut self, id: &BetId, patch: BetPatch) -> Result<u64> {
        let record = self
            .records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| HedgeError::NotFound(format!("bet {}", id)))?;

        let previous = patch.capture(record);
        patch.apply_to(record);

        self.next_seq += 1;
        let seq = self.next_seq;

        let queue = self.queues.entry(id.clone()).or_default();
        queue.push_back(PendingMutation {
            seq,
            patch,
            previous,
        });
        let is_head = queue.len() == 1;

        debug!(bet_id = %id, seq, queued = !is_head, "optimistic update applied");
        if is_head {
            self.dispatch_head(id);
        }
        Ok(seq)
    }

    /// Apply `patch` and wait for the store to confirm or reject it
    pub async fn update_and_wait(&mut self, id: &BetId, patch: BetPatch) -> Result<()> {
        let seq = self.update(id, patch)?;
        while let Some((settled_seq, result)) = self.next_settled().await {
            if settled_seq == seq {
                return result.map(|_| ());
            }
        }
        Err(HedgeError::Internal(format!(
            "mutation {} for bet {} never settled",
            seq, id
        )))
    }

    /// Wait for one remote update to finish and reconcile the cache.
    ///
    /// `Some(Err(Consistency))` means the change was rolled back. Returns
    /// `None` immediately when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Result<BetId>> {
        self.next_settled().await.map(|(_, result)| result)
    }

    /// Drain every in-flight update, including queued followers
    pub async fn settle(&mut self) -> Vec<Result<BetId>> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next_completion().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn next_settled(&mut self) -> Option<(u64, Result<BetId>)> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.completions_rx.recv().await?;
        self.in_flight -= 1;
        let seq = completion.seq;
        Some((seq, self.reconcile(completion)))
    }

    fn dispatch_head(&mut self, id: &BetId) {
        let Some(head) = self.queues.get(id).and_then(|q| q.front()) else {
            return;
        };
        let (seq, patch) = (head.seq, head.patch);

        let store = Arc::clone(&self.store);
        let tx = self.completions_tx.clone();
        let bet_id = id.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let result = store.update_bet(&bet_id, &patch).await;
            let _ = tx.send(MutationCompletion {
                bet_id,
                seq,
                result,
            });
        });
    }

    fn reconcile(&mut self, completion: MutationCompletion) -> Result<BetId> {
        let MutationCompletion {
            bet_id,
            seq,
            result,
        } = completion;

        let Some(queue) = self.queues.get_mut(&bet_id) else {
            return Err(HedgeError::Internal(format!("no queue for bet {}", bet_id)));
        };
        let Some(settled) = queue.pop_front().filter(|head| head.seq == seq) else {
            return Err(HedgeError::Internal(format!(
                "completion {} for bet {} is not the queue head",
                seq, bet_id
            )));
        };

        let outcome = match result {
            Ok(()) => {
                info!(
                    bet_id = %bet_id,
                    seq,
                    status = ?settled.patch.status,
                    "bet update confirmed"
                );
                Ok(bet_id.clone())
            }
            Err(e) => {
                let mut previous = settled.previous;
                for newer in queue.iter_mut() {
                    previous.hand_over(&newer.patch, &mut newer.previous);
                }

                if !previous.is_empty() {
                    if let Some(record) = self.records.iter_mut().find(|r| r.id == bet_id) {
                        previous.apply_to(record);
                    }
                }

                warn!(bet_id = %bet_id, seq, error = %e, "bet update failed, change reverted");
                Err(HedgeError::Consistency {
                    bet_id: bet_id.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        if queue.is_empty() {
            self.queues.remove(&bet_id);
        } else {
            self.dispatch_head(&bet_id);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BetStatus, BetType};
    use crate::gateway::MockBetStore;
    use mockall::Sequence;
    use rust_decimal_macros::dec;

    fn record(id: &str, status: BetStatus) -> BetRecord {
        BetRecord {
            id: BetId::new(id),
            player: "Patrick Mahomes".into(),
            team: "KC".into(),
            metric: "Passing Yards".into(),
            bet_type: BetType::Over,
            line: 275.5,
            wager: dec!(100),
            ai_prediction: Some("Good Bet".into()),
            status,
            created_at: "2025-10-20T18:00:00Z".into(),
        }
    }

    fn store_with(records: Vec<BetRecord>) -> MockBetStore {
        let mut store = MockBetStore::new();
        store
            .expect_list_bets()
            .returning(move || Ok(records.clone()));
        store
    }

    async fn loaded(store: MockBetStore) -> OptimisticMutationCoordinator {
        let mut coordinator = OptimisticMutationCoordinator::new(Arc::new(store));
        coordinator.load().await.unwrap();
        coordinator
    }

    fn status_of(coordinator: &OptimisticMutationCoordinator, id: &str) -> BetStatus {
        coordinator.record(&BetId::new(id)).unwrap().status
    }

    #[tokio::test]
    async fn test_failed_update_restores_prior_status() {
        let mut store = store_with(vec![record("7", BetStatus::Pending)]);
        store
            .expect_update_bet()
            .withf(|id, patch| id.as_str() == "7" && patch.status == Some(BetStatus::Won))
            .times(1)
            .returning(|_, _| Err(HedgeError::Network("503 Service Unavailable".into())));
        let mut coordinator = loaded(store).await;
        let id = BetId::new("7");

        coordinator
            .update(&id, BetPatch::status(BetStatus::Won))
            .unwrap();
        assert_eq!(status_of(&coordinator, "7"), BetStatus::Won);
        assert!(coordinator.is_saving(&id));

        let outcome = coordinator.next_completion().await.unwrap();
        assert!(matches!(outcome, Err(HedgeError::Consistency { .. })));
        assert_eq!(status_of(&coordinator, "7"), BetStatus::Pending);
        assert!(!coordinator.is_saving(&id));
    }

    #[tokio::test]
    async fn test_confirmed_update_keeps_new_status() {
        let mut store = store_with(vec![record("7", BetStatus::Pending)]);
        store.expect_update_bet().times(1).returning(|_, _| Ok(()));
        let mut coordinator = loaded(store).await;
        let id = BetId::new("7");

        coordinator
            .update_and_wait(&id, BetPatch::status(BetStatus::Lost))
            .await
            .unwrap();

        assert_eq!(status_of(&coordinator, "7"), BetStatus::Lost);
        assert_eq!(coordinator.stats().lost, 1);
    }

    #[tokio::test]
    async fn test_failed_head_hands_prior_value_to_queued_update() {
        let mut store = store_with(vec![record("7", BetStatus::Pending)]);
        let mut seq = Sequence::new();
        store
            .expect_update_bet()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(HedgeError::Network("timeout".into())));
        store
            .expect_update_bet()
            .withf(|_, patch| patch.status == Some(BetStatus::Lost))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(HedgeError::Network("timeout".into())));
        let mut coordinator = loaded(store).await;
        let id = BetId::new("7");

        coordinator
            .update(&id, BetPatch::status(BetStatus::Won))
            .unwrap();
        coordinator
            .update(&id, BetPatch::status(BetStatus::Lost))
            .unwrap();

        // First failure leaves the newer value on screen
        assert!(coordinator.next_completion().await.unwrap().is_err());
        assert_eq!(status_of(&coordinator, "7"), BetStatus::Lost);

        // Second failure restores the value from before either update
        assert!(coordinator.next_completion().await.unwrap().is_err());
        assert_eq!(status_of(&coordinator, "7"), BetStatus::Pending);
        assert!(coordinator.next_completion().await.is_none());
    }

    #[tokio::test]
    async fn test_queued_update_survives_head_failure() {
        let mut store = store_with(vec![record("7", BetStatus::Pending)]);
        let mut seq = Sequence::new();
        store
            .expect_update_bet()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(HedgeError::Network("reset".into())));
        store
            .expect_update_bet()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        let mut coordinator = loaded(store).await;
        let id = BetId::new("7");

        coordinator
            .update(&id, BetPatch::status(BetStatus::Won))
            .unwrap();
        coordinator
            .update(&id, BetPatch::status(BetStatus::Lost))
            .unwrap();

        let outcomes = coordinator.settle().await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_err());
        assert_eq!(outcomes[1].as_ref().unwrap(), &id);
        assert_eq!(status_of(&coordinator, "7"), BetStatus::Lost);
    }

    #[tokio::test]
    async fn test_unknown_bet_is_not_sent() {
        let mut store = store_with(vec![record("7", BetStatus::Pending)]);
        store.expect_update_bet().times(0);
        let mut coordinator = loaded(store).await;

        let err = coordinator
            .update(&BetId::new("missing"), BetPatch::status(BetStatus::Won))
            .unwrap_err();
        assert!(matches!(err, HedgeError::NotFound(_)));
        assert!(coordinator.next_completion().await.is_none());
    }

    #[tokio::test]
    async fn test_reload_keeps_unconfirmed_change() {
        let mut store = store_with(vec![
            record("7", BetStatus::Pending),
            record("8", BetStatus::Won),
        ]);
        store.expect_update_bet().times(1).returning(|_, _| Ok(()));
        let mut coordinator = loaded(store).await;
        let id = BetId::new("7");

        coordinator
            .update(&id, BetPatch::status(BetStatus::Lost))
            .unwrap();
        coordinator.load().await.unwrap();

        assert_eq!(status_of(&coordinator, "7"), BetStatus::Lost);
        assert_eq!(coordinator.next_completion().await.unwrap().unwrap(), id);

        let stats = coordinator.stats();
        assert_eq!((stats.total, stats.won, stats.lost), (2, 1, 1));
        assert_eq!(stats.win_rate_display(), "50.0");
    }
}
