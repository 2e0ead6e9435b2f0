use thiserror::Error;

/// The request body was not a well-formed report.
#[derive(Debug, Error)]
#[error("error decoding report: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// The store rejected or failed to execute the insert.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("store error: {0:#}")]
    Store(#[from] anyhow::Error),

    #[error("store did not complete the insert within {0} ms")]
    TimedOut(u64),
}

/// Failure of one pass through the ingest pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn store_error_display_keeps_the_underlying_cause() {
        let cause: anyhow::Result<()> = Err(anyhow::anyhow!("Table with name stats does not exist"));
        let err = PersistError::from(
            cause
                .context("insert into stats failed")
                .expect_err("wrapped error"),
        );
        assert_eq!(
            err.to_string(),
            "store error: insert into stats failed: Table with name stats does not exist"
        );
    }
}
