use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::models::ConnectionId;

pub const DEFAULT_CHAT_CAPACITY: usize = 50;
pub const DEFAULT_BODY_LIMIT: usize = 200;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub author: String,
    pub body: String,
    pub timestamp: String,
    pub author_id: ConnectionId,
}

/// Bounded chat history shared by everyone at the table
#[derive(Debug, Clone)]
pub struct ChatLog {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
    body_limit: usize,
    last_id: i64,
}

impl Default for ChatLog {
    fn default() -> Self {
        ChatLog::new(DEFAULT_CHAT_CAPACITY, DEFAULT_BODY_LIMIT)
    }
}

impl ChatLog {
    pub fn new(capacity: usize, body_limit: usize) -> Self {
        ChatLog {
            messages: VecDeque::with_capacity(capacity + 1),
            capacity,
            body_limit,
            last_id: 0,
        }
    }

    /// Appends a message, evicting the oldest ones past capacity, and returns it
    pub fn post(&mut self, author: &str, author_id: &str, body: &str) -> ChatMessage {
        // ids follow the wall clock but never repeat within a millisecond
        let id = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;

        let message = ChatMessage {
            id,
            author: author.to_string(),
            body: body.chars().take(self.body_limit).collect(),
            timestamp: Local::now().format("%-I:%M:%S %p").to_string(),
            author_id: author_id.to_string(),
        };

        self.messages.push_back(message.clone());
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
        message
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_truncates_body() {
        let mut log = ChatLog::default();
        let long = "é".repeat(250);
        let message = log.post("Alice", "conn-1", &long);
        assert_eq!(message.body.chars().count(), 200);
        assert_eq!(message.author, "Alice");
        assert_eq!(message.author_id, "conn-1");
        assert_eq!(log.snapshot(), vec![message]);
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut log = ChatLog::default();
        for i in 0..55 {
            log.post("Spectator", "conn", &format!("message {i}"));
        }
        assert_eq!(log.len(), 50);
        let snapshot = log.snapshot();
        assert_eq!(snapshot.first().unwrap().body, "message 5");
        assert_eq!(snapshot.last().unwrap().body, "message 54");
    }

    #[test]
    fn test_ids_are_strictly_increasing() {
        let mut log = ChatLog::new(10, 200);
        let ids: Vec<i64> = (0..10).map(|_| log.post("a", "b", "hi").id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_clear() {
        let mut log = ChatLog::default();
        log.post("a", "b", "hello");
        log.clear();
        assert!(log.is_empty());
        assert!(log.snapshot().is_empty());
    }
}
