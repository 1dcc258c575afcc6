#[cfg(test)]
use super::*;
use crate::mock::*;
use std::{sync::atomic::Ordering, time::Duration};
use web3::types::Address;

fn supervisor(setup: &TestSetup) -> SupervisorLoop<MockSourceChain, MockTargetChain> {
    SupervisorLoop::new(Arc::clone(&setup.source), setup.ticker(), setup.shutdown.clone())
        .with_resubscribe_delay(Duration::from_millis(10))
}

mod self_check {
    use super::*;

    #[tokio::test]
    async fn passes_when_signer_is_authorized() {
        let setup = TestSetup::new();
        setup.source.set_active_era(5, 20);

        assert_eq!(supervisor(&setup).self_check().await, Ok(()));
    }

    #[tokio::test]
    async fn passes_before_the_first_era() {
        let setup = TestSetup::new();
        assert_eq!(supervisor(&setup).self_check().await, Ok(()));
    }

    #[tokio::test]
    async fn rejects_an_unauthorized_signer() {
        let setup = TestSetup::new();
        setup.target.set_authorized(Address::repeat_byte(0x01));

        assert_eq!(
            supervisor(&setup).self_check().await,
            Err(StartupError::UnauthorizedSigner {
                configured: signer_address(),
                authorized: Address::repeat_byte(0x01),
            })
        );
    }

    #[tokio::test]
    async fn rejects_an_unauthorized_signer_in_dry_run() {
        let setup = TestSetup::new();
        setup.target.set_authorized(Address::repeat_byte(0x01));
        let ticker = setup.ticker_with(TestSetup::gateway_config(true, Duration::from_secs(5)));
        let supervisor =
            SupervisorLoop::new(Arc::clone(&setup.source), ticker, setup.shutdown.clone());

        assert!(matches!(
            supervisor.self_check().await,
            Err(StartupError::UnauthorizedSigner { .. })
        ));
    }

    #[tokio::test]
    async fn reports_an_unreachable_source_chain() {
        let setup = TestSetup::new();
        setup.source.set_unreachable(true);

        assert!(matches!(
            supervisor(&setup).self_check().await,
            Err(StartupError::SourceChainUnreachable(_))
        ));
    }

    #[tokio::test]
    async fn reports_an_unreachable_target_chain() {
        let setup = TestSetup::new();
        setup.target.set_unreachable(true);

        assert!(matches!(
            supervisor(&setup).self_check().await,
            Err(StartupError::TargetChainUnreachable(_))
        ));
    }
}

mod run {
    use super::*;

    async fn wait_for_submitted_era(
        ticker: &Arc<Mutex<SubmissionTicker<MockSourceChain, MockTargetChain>>>,
        era: u64,
    ) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while ticker.lock().await.submitted_era() != Some(era) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("era was submitted");
    }

    #[tokio::test]
    async fn submits_on_the_final_session_and_stops_on_shutdown() {
        let setup = TestSetup::new();
        setup.source.set_active_era(5, 20);
        setup.source.set_external_index(Some(5));
        let supervisor = supervisor(&setup);
        let ticker = supervisor.ticker();
        let handle = tokio::spawn(async move { supervisor.run().await });

        for session in [21, 22, 23] {
            setup.sessions.unbounded_send(Ok(finalized(session))).unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        wait_for_submitted_era(&ticker, 6).await;

        setup.trigger.trigger();
        assert!(handle.await.unwrap().is_ok());
        assert_eq!(setup.target.sent().len(), 1);
    }

    #[tokio::test]
    async fn sessions_arriving_during_a_tick_are_dropped() {
        let setup = TestSetup::new();
        setup.source.set_active_era(5, 20);
        setup.target.gate_sends();
        for session in [23, 24, 25, 26] {
            setup.sessions.unbounded_send(Ok(finalized(session))).unwrap();
        }

        let supervisor = supervisor(&setup);
        let ticker = supervisor.ticker();
        let handle = tokio::spawn(async move { supervisor.run().await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(setup.target.sent().len(), 1);

        setup.target.release_one();
        wait_for_submitted_era(&ticker, 6).await;

        setup.trigger.trigger();
        assert!(handle.await.unwrap().is_ok());
        assert_eq!(setup.target.sent().len(), 1);
    }

    #[tokio::test]
    async fn stream_errors_are_skipped() {
        let setup = TestSetup::new();
        setup.source.set_active_era(5, 20);
        let supervisor = supervisor(&setup);
        let ticker = supervisor.ticker();
        let handle = tokio::spawn(async move { supervisor.run().await });

        setup.sessions.unbounded_send(Err(anyhow::anyhow!("bad header"))).unwrap();
        setup.sessions.unbounded_send(Ok(finalized(23))).unwrap();
        wait_for_submitted_era(&ticker, 6).await;

        setup.trigger.trigger();
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn failing_first_subscription_is_an_error() {
        let setup = TestSetup::new();
        setup.source.clear_subscriptions();

        let result =
            tokio::time::timeout(Duration::from_secs(5), supervisor(&setup).run()).await.unwrap();

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn ending_stream_is_subscribed_to_again() {
        let setup = TestSetup::new();
        setup.source.set_active_era(5, 20);
        let supervisor = supervisor(&setup);
        let ticker = supervisor.ticker();
        let handle = tokio::spawn(async move { supervisor.run().await });

        let reconnected = setup.source.add_subscription();
        setup.sessions.close_channel();
        reconnected.unbounded_send(Ok(finalized(23))).unwrap();
        wait_for_submitted_era(&ticker, 6).await;

        assert_eq!(setup.source.subscriptions_opened.load(Ordering::SeqCst), 2);
        assert!(!handle.is_finished());

        setup.trigger.trigger();
        assert!(handle.await.unwrap().is_ok());
        assert_eq!(setup.target.sent().len(), 1);
    }

    #[tokio::test]
    async fn failed_resubscription_is_retried() {
        let setup = TestSetup::new();
        setup.source.set_active_era(5, 20);
        let supervisor = supervisor(&setup);
        let ticker = supervisor.ticker();
        let handle = tokio::spawn(async move { supervisor.run().await });

        setup.sessions.close_channel();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());
        assert_eq!(setup.source.subscriptions_opened.load(Ordering::SeqCst), 1);

        let reconnected = setup.source.add_subscription();
        reconnected.unbounded_send(Ok(finalized(23))).unwrap();
        wait_for_submitted_era(&ticker, 6).await;

        setup.trigger.trigger();
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn shutdown_while_resubscribing_stops_cleanly() {
        let setup = TestSetup::new();
        let supervisor = SupervisorLoop::new(
            Arc::clone(&setup.source),
            setup.ticker(),
            setup.shutdown.clone(),
        )
        .with_resubscribe_delay(Duration::from_secs(60));
        let handle = tokio::spawn(async move { supervisor.run().await });

        setup.sessions.close_channel();
        tokio::time::sleep(Duration::from_millis(20)).await;
        setup.trigger.trigger();

        let result = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap();
        assert!(result.unwrap().is_ok());
    }

    #[tokio::test]
    async fn shutdown_waits_for_the_tick_in_flight() {
        let setup = TestSetup::new();
        setup.source.set_active_era(5, 20);
        setup.target.set_receipts(ReceiptBehaviour::Pending);
        setup.target.gate_sends();
        setup.sessions.unbounded_send(Ok(finalized(23))).unwrap();

        let supervisor = supervisor(&setup);
        let ticker = supervisor.ticker();
        let handle = tokio::spawn(async move { supervisor.run().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        setup.trigger.trigger();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        setup.target.release_one();
        assert!(tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap().is_ok());
        assert_eq!(ticker.lock().await.submitted_era(), None);
        assert_eq!(setup.target.sent().len(), 1);
    }
}
