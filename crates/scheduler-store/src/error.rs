use scheduler_types::PoolKey;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("pool {0} is not configured")]
    PoolNotFound(PoolKey),
}
