use log::info;

/// Scoped logger owned by each engine stage.
pub struct LogManager {
    scope: &'static str,
}

impl LogManager {
    pub fn new(scope: &'static str) -> Self {
        Self { scope }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.scope, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_manager_records_without_panicking() {
        let logger = LogManager::new("ingest");
        logger.record("1 record dropped");
    }
}
