use culture_index::assessment::{
    AssessmentService, DeliveryReceipt, DisabledNotifier, EmailMessage, HttpForwarder,
    NotificationSettings, Notifier, RelayError, ResendNotifier,
};
use culture_index::config::RelayConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Notifier chosen at startup from the relay configuration.
#[derive(Debug)]
pub(crate) enum ConfiguredNotifier {
    Resend(ResendNotifier),
    Disabled(DisabledNotifier),
}

impl ConfiguredNotifier {
    pub(crate) fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        match ResendNotifier::from_config(config) {
            Ok(notifier) => Ok(Self::Resend(notifier)),
            Err(RelayError::NotConfigured(key)) => {
                warn!(%key, "email notifications disabled: credential not configured");
                Ok(Self::Disabled(DisabledNotifier))
            }
            Err(err) => Err(err),
        }
    }
}

impl Notifier for ConfiguredNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, RelayError> {
        match self {
            Self::Resend(notifier) => notifier.send(message).await,
            Self::Disabled(notifier) => notifier.send(message).await,
        }
    }
}

pub(crate) type ConfiguredService = AssessmentService<ConfiguredNotifier, HttpForwarder>;

pub(crate) fn build_assessment_service(
    config: &RelayConfig,
) -> Result<Arc<ConfiguredService>, RelayError> {
    let notifier = ConfiguredNotifier::from_config(config)?;
    let forwarder = HttpForwarder::from_config(config)?;
    if forwarder.is_none() {
        info!("forward route has no target: CULTURE_INDEX_FORWARD_URL is unset");
    }

    Ok(Arc::new(AssessmentService::new(
        Arc::new(notifier),
        forwarder.map(Arc::new),
        NotificationSettings::from_config(config),
    )))
}
