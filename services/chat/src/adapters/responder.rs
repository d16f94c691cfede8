//! services/chat/src/adapters/responder.rs
//!
//! Runtime implementations of the ports that stand in for a real language model:
//! random catalog selection, response id generation and simulated latency.

use async_trait::async_trait;
use marvin_core::{
    domain::RESPONSE_ID_PREFIX,
    ports::{Delay, ResponseIdGenerator, ResponsePicker},
};
use rand::Rng;
use std::time::Duration;
use uuid::Uuid;

/// Picks uniformly at random with the thread-local generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomPicker;

impl ResponsePicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Generates `res-<32 hex chars>` ids from random v4 UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidResponseIds;

impl ResponseIdGenerator for UuidResponseIds {
    fn next_id(&self) -> String {
        format!("{}{}", RESPONSE_ID_PREFIX, Uuid::new_v4().simple())
    }
}

/// Sleeps on the tokio timer.
#[derive(Clone, Copy, Debug)]
pub struct TokioDelay {
    duration: Duration,
}

impl TokioDelay {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self) {
        tokio::time::sleep(self.duration).await;
    }
}
