//! Channel-backed pose source using Tokio.

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use crate::error::EnvError;
use crate::source::PoseSource;
use crate::types::Odometry;

/// Sending half of a [`ChannelPoseSource`].
#[derive(Debug, Clone)]
pub struct PoseSender {
    tx: mpsc::Sender<Odometry>,
}

impl PoseSender {
    /// Queues a message, waiting while the channel is full.
    pub async fn send(&self, msg: Odometry) -> Result<(), EnvError> {
        self.tx.send(msg).await.map_err(EnvError::channel)
    }

    /// Queues a message without waiting.
    pub fn try_send(&self, msg: Odometry) -> Result<(), EnvError> {
        self.tx.try_send(msg).map_err(EnvError::channel)
    }
}

/// Pose source backed by a bounded Tokio channel.
///
/// The source closes once every [`PoseSender`] has been dropped and the
/// queued messages have been drained.
pub struct ChannelPoseSource {
    topic: String,
    rx: Mutex<mpsc::Receiver<Odometry>>,
}

impl ChannelPoseSource {
    /// Creates a source and its sender with room for `capacity` messages.
    pub fn new(topic: &str, capacity: usize) -> (PoseSender, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            PoseSender { tx },
            Self {
                topic: topic.to_string(),
                rx: Mutex::new(rx),
            },
        )
    }
}

#[async_trait]
impl PoseSource for ChannelPoseSource {
    async fn recv(&self) -> Option<Odometry> {
        self.rx.lock().await.recv().await
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[tokio::test]
    async fn test_channel_preserves_order() {
        let (tx, source) = ChannelPoseSource::new("/odom", 8);
        for i in 0..5 {
            tx.send(Odometry::new("odom", i, i as f64 * 0.1, Point3::new(i as f64, 0.0, 0.0)))
                .await
                .unwrap();
        }
        drop(tx);

        let mut seqs = Vec::new();
        while let Some(msg) = source.recv().await {
            seqs.push(msg.header.seq);
        }
        assert_eq!(seqs, vec![0, 1, 2, 3, 4]);
        assert_eq!(source.topic(), "/odom");
    }

    #[tokio::test]
    async fn test_try_send_on_full_channel() {
        let (tx, _source) = ChannelPoseSource::new("/odom", 1);
        let msg = Odometry::new("odom", 0, 0.0, Point3::origin());
        assert!(tx.try_send(msg.clone()).is_ok());
        assert!(matches!(tx.try_send(msg), Err(EnvError::ChannelError(_))));
    }
}
