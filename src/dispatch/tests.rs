use super::*;
use crate::batcher::Batcher;
use crate::config::ConfigError;
use crate::mailer::{Mailer, MessageTemplate, RelayAcceptance, TransportError};
use crate::recipient::{Recipient, RecipientSource, StaticRecipients, SyntheticRecipients};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every call; fails any message addressed to `fail_on`;
/// sleeps `delay_for(call_index)` before answering.
#[derive(Default)]
struct StubMailer {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    sent_to: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
    fail_on: Option<String>,
    delays_ms: Vec<u64>,
}

impl StubMailer {
    fn new() -> Self {
        Self::default()
    }

    fn failing_on(address: &str) -> Self {
        Self {
            fail_on: Some(address.to_string()),
            ..Self::default()
        }
    }

    fn with_delays(delays_ms: Vec<u64>) -> Self {
        Self {
            delays_ms,
            ..Self::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for StubMailer {
    async fn send(
        &self,
        to: &str,
        _template: &MessageTemplate,
    ) -> Result<RelayAcceptance, TransportError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent_to.lock().unwrap().push(to.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays_ms.get(call).copied().unwrap_or(1);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.lock().unwrap().push(to.to_string());

        if let Some(bad) = &self.fail_on {
            if to.contains(bad.as_str()) {
                return Err(TransportError::Rejected {
                    status: 550,
                    body: format!("mailbox unavailable: {}", bad),
                });
            }
        }

        let count = to.split(',').count();
        Ok(RelayAcceptance::new(count, Some(format!("msg-{}", call))))
    }
}

fn template() -> MessageTemplate {
    MessageTemplate::new(
        "\"Travel Desk\" <info@travel.test>",
        "Special price on Hood River travel package!",
        "Book your trip to scenic Hood River now!",
    )
}

fn recipients(count: usize) -> Vec<Recipient> {
    SyntheticRecipients::new(count).list().unwrap()
}

#[tokio::test]
async fn test_250_recipients_by_100() {
    let dispatcher = BulkDispatcher::new(StubMailer::new());

    let report = dispatcher
        .send_bulk(recipients(250), 100, &template())
        .await
        .unwrap();

    assert_eq!(dispatcher.mailer().call_count(), 3);
    assert!(report.is_complete_success());

    let counts: Vec<usize> = report
        .submitted()
        .iter()
        .map(|a| a.recipient_count)
        .collect();
    assert_eq!(counts, vec![100, 100, 50]);
    assert_eq!(report.submitted_recipient_count(), 250);

    let accepted = report.into_result().unwrap();
    assert_eq!(accepted.len(), 3);
}

#[tokio::test]
async fn test_outcomes_keep_batch_order_despite_completion_order() {
    // First batch answers last, last batch answers first
    let dispatcher = BulkDispatcher::new(StubMailer::with_delays(vec![60, 30, 5]));
    let batcher = Batcher::new(2).unwrap();

    let report = dispatcher
        .dispatch(batcher.split(&recipients(6)), &template())
        .await;

    let completed = dispatcher.mailer().completed.lock().unwrap().clone();
    assert!(completed[0].contains("customer4@"), "stub should finish out of order");

    let indexes: Vec<usize> = report.outcomes().iter().map(|o| o.batch().index()).collect();
    assert_eq!(indexes, vec![0, 1, 2]);

    let first_batch = report.outcomes()[0].batch();
    assert_eq!(first_batch.recipients()[0].as_str(), "customer0@nowhere.com");

    let ids: Vec<Option<String>> = report
        .submitted()
        .iter()
        .map(|a| a.message_id.clone())
        .collect();
    assert_eq!(
        ids,
        vec![
            Some("msg-0".to_string()),
            Some("msg-1".to_string()),
            Some("msg-2".to_string())
        ]
    );
}

#[tokio::test]
async fn test_all_batches_in_flight_together() {
    let dispatcher = BulkDispatcher::new(StubMailer::with_delays(vec![20; 5]));
    let batcher = Batcher::new(10).unwrap();

    dispatcher
        .dispatch(batcher.split(&recipients(50)), &template())
        .await;

    assert_eq!(dispatcher.mailer().max_in_flight.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_middle_batch_failure_keeps_other_outcomes() {
    // customer3 lives in the second of three batches
    let dispatcher = BulkDispatcher::new(StubMailer::failing_on("customer3@"));

    let report = dispatcher
        .send_bulk(recipients(9), 3, &template())
        .await
        .unwrap();

    assert_eq!(dispatcher.mailer().call_count(), 3);
    assert!(!report.is_complete_success());
    assert_eq!(report.submitted_count(), 2);
    assert_eq!(report.submitted_recipient_count(), 6);

    assert!(report.outcomes()[0].is_sent());
    assert!(!report.outcomes()[1].is_sent());
    assert!(report.outcomes()[2].is_sent());

    let failed = report.failed();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].index, 1);
    assert!(failed[0].reason.contains("mailbox unavailable"));

    let retry = report.retry_recipients();
    assert_eq!(retry.len(), 3);
    assert_eq!(retry, failed[0].recipients);
    assert_eq!(failed[0].recipients[0].as_str(), "customer3@nowhere.com");
    assert_eq!(failed[0].recipients[2].as_str(), "customer5@nowhere.com");

    match report.into_result() {
        Err(DispatchError::PartialFailure { submitted, failed }) => {
            assert_eq!(submitted.len(), 2);
            assert_eq!(submitted[0].recipient_count, 3);
            assert_eq!(submitted[1].recipient_count, 3);
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].index, 1);
        }
        other => panic!("expected partial failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_every_batch_failing_is_reported() {
    let dispatcher = BulkDispatcher::new(StubMailer::failing_on("@nowhere.com"));

    let report = dispatcher
        .send_bulk(recipients(5), 2, &template())
        .await
        .unwrap();

    assert_eq!(dispatcher.mailer().call_count(), 3);
    assert_eq!(report.submitted_count(), 0);
    assert_eq!(report.failed().len(), 3);
    assert_eq!(report.retry_recipients().len(), 5);

    let err = report.into_result().unwrap_err();
    assert_eq!(
        err.to_string(),
        "3 batch(es) failed to submit, 0 accepted for relay"
    );
}

#[tokio::test]
async fn test_zero_limit_fails_before_any_send() {
    let dispatcher = BulkDispatcher::new(StubMailer::new());

    let result = dispatcher.send_bulk(recipients(10), 0, &template()).await;

    assert!(matches!(
        result,
        Err(DispatchError::Config(ConfigError::InvalidRecipientLimit(0)))
    ));
    assert_eq!(dispatcher.mailer().call_count(), 0);
}

#[tokio::test]
async fn test_empty_input_sends_nothing() {
    let dispatcher = BulkDispatcher::new(StubMailer::new());

    let report = dispatcher.send_bulk(Vec::new(), 100, &template()).await.unwrap();

    assert_eq!(dispatcher.mailer().call_count(), 0);
    assert_eq!(report.batch_count(), 0);
    assert!(report.is_complete_success());
    assert!(report.into_result().unwrap().is_empty());
}

#[tokio::test]
async fn test_joined_header_reaches_transport() {
    let dispatcher = BulkDispatcher::new(StubMailer::new());
    let list = vec![
        Recipient::parse("joe@gmail.com").unwrap(),
        Recipient::parse("\"Jane Customer\" <jane@yahoo.com>").unwrap(),
        Recipient::parse("fred@hotmail.com").unwrap(),
    ];

    dispatcher.send_bulk(list, 1000, &template()).await.unwrap();

    let sent = dispatcher.mailer().sent_to.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec!["joe@gmail.com, \"Jane Customer\" <jane@yahoo.com>, fred@hotmail.com".to_string()]
    );
}

#[tokio::test]
async fn test_send_to_source() {
    let dispatcher = BulkDispatcher::new(Arc::new(StubMailer::new()));
    let source = StaticRecipients::new(recipients(7));
    let batcher = Batcher::new(3).unwrap();

    let report = dispatcher
        .send_to_source(&source, &batcher, &template())
        .await
        .unwrap();

    assert_eq!(report.batch_count(), 3);
    assert_eq!(dispatcher.mailer().call_count(), 3);
}

#[tokio::test]
async fn test_report_serializes_outcomes() {
    let dispatcher = BulkDispatcher::new(StubMailer::failing_on("customer0@"));

    let report = dispatcher
        .send_bulk(recipients(2), 1, &template())
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    let outcomes = json["outcomes"].as_array().unwrap();
    assert_eq!(outcomes[0]["status"], "failed");
    assert_eq!(outcomes[1]["status"], "sent");
    assert_eq!(outcomes[1]["acceptance"]["recipient_count"], 1);
    assert!(json["run_id"].is_string());
}

#[tokio::test]
async fn test_dispatcher_over_dyn_mailer() {
    let dispatcher: Box<BulkDispatcher<dyn Mailer>> =
        Box::new(BulkDispatcher::new(StubMailer::failing_on("customer2@")));

    let report = dispatcher
        .send_bulk(recipients(4), 2, &template())
        .await
        .unwrap();

    assert_eq!(report.batch_count(), 2);
    assert!(report.outcomes()[0].is_sent());
    assert!(!report.outcomes()[1].is_sent());
}
