// tests/notify_batch.rs
// Batch semantics of the notifier trait itself: one call per review, empty
// batch is a no-op, and a mid-batch failure leaves earlier sends delivered.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use app_review_monitor::{NotifyError, Review, ReviewNotifier};

struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    fail_id: Option<String>,
}

#[async_trait]
impl ReviewNotifier for RecordingNotifier {
    async fn notify_review(&self, review: &Review) -> Result<(), NotifyError> {
        if self.fail_id.as_deref() == Some(review.id.as_str()) {
            return Err(NotifyError::Rejected {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "rollup_error".into(),
            });
        }
        self.sent.lock().unwrap().push(review.id.clone());
        Ok(())
    }

    async fn notify_status(&self, text: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(format!("status:{text}"));
        Ok(())
    }
}

fn review(id: &str) -> Review {
    Review {
        id: id.to_string(),
        rating: 5,
        title: "t".into(),
        body: "b".into(),
        author: "a".into(),
        territory: "US".into(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn empty_batch_makes_no_calls() {
    let notifier = RecordingNotifier {
        sent: Mutex::new(vec![]),
        fail_id: None,
    };
    notifier.notify(&[]).await.unwrap();
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn batch_sends_one_call_per_review_in_order() {
    let notifier = RecordingNotifier {
        sent: Mutex::new(vec![]),
        fail_id: None,
    };
    notifier
        .notify(&[review("r1"), review("r2"), review("r3")])
        .await
        .unwrap();
    assert_eq!(
        *notifier.sent.lock().unwrap(),
        vec!["r1".to_string(), "r2".to_string(), "r3".to_string()]
    );
}

#[tokio::test]
async fn failure_stops_the_batch_but_keeps_earlier_sends() {
    let notifier = RecordingNotifier {
        sent: Mutex::new(vec![]),
        fail_id: Some("r2".into()),
    };
    let err = notifier
        .notify(&[review("r1"), review("r2"), review("r3")])
        .await
        .unwrap_err();
    assert!(matches!(err, NotifyError::Rejected { .. }));
    // r1 went out and stays out; r3 was never attempted by the batch call.
    assert_eq!(*notifier.sent.lock().unwrap(), vec!["r1".to_string()]);
}
