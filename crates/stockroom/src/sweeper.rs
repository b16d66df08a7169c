//! Background task that purges expired sessions.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::Stockroom;

/// Spawns a task that calls `purge_expired` every `every`.
///
/// The first sweep happens one full interval after spawning. The task runs
/// until it is aborted or the runtime shuts down.
pub fn spawn_session_sweeper(service: Stockroom, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // `interval` fires immediately; skip that tick.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let purged = service.gate().sessions().purge_expired();
            tracing::debug!(
                purged,
                remaining = service.gate().sessions().len(),
                "session sweep finished"
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use stockroom_auth::{HasherConfig, SessionConfig};

    use super::*;
    use crate::StockroomConfig;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_expired_sessions() {
        let svc = Stockroom::new(&StockroomConfig {
            hasher: HasherConfig::minimal(),
            session: SessionConfig {
                ttl_secs: 0,
                sweep_interval_secs: 60,
            },
            ..StockroomConfig::default()
        })
        .unwrap();
        let user = svc.gate().identities().register("a@x.com", "pw1").unwrap();
        svc.gate().sessions().create(user.id);
        svc.gate().sessions().create(user.id);
        assert_eq!(svc.gate().sessions().len(), 2);

        let handle = spawn_session_sweeper(svc.clone(), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(svc.gate().sessions().is_empty());
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_keeps_active_sessions() {
        let svc = Stockroom::new(&StockroomConfig {
            hasher: HasherConfig::minimal(),
            ..StockroomConfig::default()
        })
        .unwrap();
        let user = svc.gate().identities().register("a@x.com", "pw1").unwrap();
        let session = svc.gate().sessions().create(user.id);

        let handle = spawn_session_sweeper(svc.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(svc.gate().require_caller(&session.token).unwrap(), user.id);
        handle.abort();
    }
}
