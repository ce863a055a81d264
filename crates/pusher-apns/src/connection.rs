//! Connection lifecycle: one lazily-opened gateway client per purpose.

use std::sync::Arc;

use tracing::info;

use crate::config::ApnsConfig;
use crate::gateway::{GatewayClient, GatewayConnector, GatewayError, Purpose};

/// Owns at most one open gateway client per purpose.
///
/// Clients open lazily on first use and stay cached until invalidated. There
/// is no background reconnect: after [`invalidate`](Self::invalidate), the
/// next [`get`](Self::get) opens a fresh connection.
pub(crate) struct ConnectionManager {
    connector: Arc<dyn GatewayConnector>,
    config: ApnsConfig,
    push: Option<Box<dyn GatewayClient>>,
    feedback: Option<Box<dyn GatewayClient>>,
}

impl ConnectionManager {
    pub(crate) fn new(connector: Arc<dyn GatewayConnector>, config: ApnsConfig) -> Self {
        Self {
            connector,
            config,
            push: None,
            feedback: None,
        }
    }

    /// Current client for `purpose`, opening one if none is cached.
    pub(crate) async fn get(
        &mut self,
        purpose: Purpose,
    ) -> Result<&mut dyn GatewayClient, GatewayError> {
        let slot = match purpose {
            Purpose::Push => &mut self.push,
            Purpose::Feedback => &mut self.feedback,
        };

        let client = match slot.take() {
            Some(client) => client,
            None => {
                let client = self.connector.open(purpose, &self.config).await?;
                info!(
                    ?purpose,
                    uri = self.config.uri_for(purpose),
                    "gateway connection opened"
                );
                client
            }
        };
        Ok(slot.insert(client).as_mut())
    }

    /// Close and discard the cached client for `purpose`.
    pub(crate) async fn invalidate(&mut self, purpose: Purpose) {
        let slot = match purpose {
            Purpose::Push => &mut self.push,
            Purpose::Feedback => &mut self.feedback,
        };
        if let Some(mut client) = slot.take() {
            client.close().await;
            info!(?purpose, "gateway connection invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::gateway::MockConnector;
    use std::path::PathBuf;

    fn make_manager() -> (Arc<MockConnector>, ConnectionManager) {
        let connector = Arc::new(MockConnector::new());
        let config = ApnsConfig {
            certificate: PathBuf::from("/certs/push.pem"),
            bundle_id: "com.example.App".to_string(),
            pass_phrase: None,
            environment: Environment::Sandbox,
        };
        let manager = ConnectionManager::new(connector.clone(), config);
        (connector, manager)
    }

    #[tokio::test]
    async fn opens_lazily_and_caches() {
        let (connector, mut manager) = make_manager();
        assert_eq!(connector.opened(Purpose::Push), 0);

        let _ = manager.get(Purpose::Push).await.unwrap();
        let _ = manager.get(Purpose::Push).await.unwrap();
        assert_eq!(connector.opened(Purpose::Push), 1);
    }

    #[tokio::test]
    async fn invalidate_closes_and_next_get_reopens() {
        let (connector, mut manager) = make_manager();
        let _ = manager.get(Purpose::Push).await.unwrap();

        manager.invalidate(Purpose::Push).await;
        assert_eq!(connector.closed(), 1);

        let _ = manager.get(Purpose::Push).await.unwrap();
        assert_eq!(connector.opened(Purpose::Push), 2);
    }

    #[tokio::test]
    async fn invalidate_without_open_connection_is_a_no_op() {
        let (connector, mut manager) = make_manager();
        manager.invalidate(Purpose::Push).await;
        assert_eq!(connector.closed(), 0);
    }

    #[tokio::test]
    async fn purposes_use_independent_handles() {
        let (connector, mut manager) = make_manager();
        let _ = manager.get(Purpose::Push).await.unwrap();
        let _ = manager.get(Purpose::Feedback).await.unwrap();
        assert_eq!(connector.opened(Purpose::Push), 1);
        assert_eq!(connector.opened(Purpose::Feedback), 1);

        manager.invalidate(Purpose::Push).await;
        let _ = manager.get(Purpose::Feedback).await.unwrap();
        // Feedback handle untouched by the push invalidation.
        assert_eq!(connector.opened(Purpose::Feedback), 1);
    }
}
