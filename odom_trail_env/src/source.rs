//! Inbound odometry stream abstraction.

use async_trait::async_trait;

use crate::types::Odometry;

/// A stream of odometry messages delivered one at a time.
///
/// # Implementations
///
/// - **Production**: subscription to the robot's odometry topic
/// - **Simulation**: [`ChannelPoseSource`](crate::ChannelPoseSource) fed by a simulated robot
///
/// # Ordering
///
/// Messages are yielded in the order they were sent. Nothing is batched;
/// the consumer handles each message completely before asking for the next.
#[async_trait]
pub trait PoseSource: Send + Sync {
    /// Receives the next message.
    ///
    /// # Returns
    /// * `Some(msg)` - The next message in delivery order
    /// * `None` - The stream was closed (shutdown)
    async fn recv(&self) -> Option<Odometry>;

    /// Human readable name of the stream (e.g. the topic).
    fn topic(&self) -> &str;
}
