use async_trait::async_trait;

/// A push-delivery capability for messages of type `M`.
///
/// Implementations perform one delivery attempt per call and report the
/// provider's acknowledgement as `Receipt`.
#[async_trait]
pub trait Notification<M>: Send + Sync {
    type Receipt: std::fmt::Debug + Send;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn push(&self, message: M) -> Result<Self::Receipt, Self::Error>;
}
