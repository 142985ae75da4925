use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

pub const DEFAULT_FEEDBACK_WINDOW: usize = 3;

/// One advisory shown to the user, in emission order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub message: String,
    pub issued_at: DateTime<Utc>,
}

/// Bounded most-recent-N advisory feed. `push` appends and evicts the oldest
/// entries beyond the window; there is no other removal API.
#[derive(Clone)]
pub struct FeedbackQueue {
    inner: Arc<Mutex<FeedbackState>>,
}

struct FeedbackState {
    items: VecDeque<FeedbackItem>,
    window: usize,
}

impl FeedbackQueue {
    pub fn new(window: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FeedbackState {
                items: VecDeque::with_capacity(window.max(1)),
                window: window.max(1),
            })),
        }
    }

    pub async fn push(&self, message: impl Into<String>) -> FeedbackItem {
        let item = FeedbackItem {
            message: message.into(),
            issued_at: Utc::now(),
        };
        let mut state = self.inner.lock().await;
        state.items.push_back(item.clone());
        while state.items.len() > state.window {
            state.items.pop_front();
        }
        item
    }

    /// Retained window, oldest first.
    pub async fn items(&self) -> Vec<FeedbackItem> {
        self.inner.lock().await.items.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.items.is_empty()
    }

    pub async fn clear(&self) {
        self.inner.lock().await.items.clear();
    }
}

impl Default for FeedbackQueue {
    fn default() -> Self {
        Self::new(DEFAULT_FEEDBACK_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_never_exceeds_window() {
        let queue = FeedbackQueue::new(3);
        for i in 0..7 {
            queue.push(format!("advisory {i}")).await;
            assert!(queue.len().await <= 3);
        }
        let items = queue.items().await;
        assert_eq!(items.len(), 3);
        let messages: Vec<_> = items.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["advisory 4", "advisory 5", "advisory 6"]);
    }

    #[tokio::test]
    async fn items_are_chronological() {
        let queue = FeedbackQueue::new(2);
        queue.push("first").await;
        queue.push("second").await;
        let items = queue.items().await;
        assert!(items[0].issued_at <= items[1].issued_at);
        assert_eq!(items[0].message, "first");
    }

    #[tokio::test]
    async fn zero_window_is_clamped_to_one() {
        let queue = FeedbackQueue::new(0);
        queue.push("only").await;
        queue.push("kept").await;
        assert_eq!(queue.len().await, 1);
        assert_eq!(queue.items().await[0].message, "kept");
    }
}
