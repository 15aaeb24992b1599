use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};

use crate::assessment::relay::{
    DeliveryReceipt, EmailMessage, Forwarder, Notifier, RelayError,
};
use crate::assessment::router::{assessment_router, CorsPolicy};
use crate::assessment::service::{AssessmentService, NotificationSettings};

#[derive(Default)]
pub(super) struct MemoryNotifier {
    sent: Mutex<Vec<EmailMessage>>,
    failure: Option<RelayError>,
    receipt: Option<DeliveryReceipt>,
}

impl MemoryNotifier {
    pub(super) fn failing(error: RelayError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub(super) fn answering(receipt: DeliveryReceipt) -> Self {
        Self {
            receipt: Some(receipt),
            ..Self::default()
        }
    }

    pub(super) fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("notifier mutex").clone()
    }
}

impl Notifier for MemoryNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, RelayError> {
        self.sent.lock().expect("notifier mutex").push(message.clone());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.receipt.clone().unwrap_or(DeliveryReceipt {
                id: Some("email-123".to_string()),
                raw: None,
            })),
        }
    }
}

#[derive(Default)]
pub(super) struct EchoForwarder {
    received: Mutex<Vec<Bytes>>,
    failure: Option<RelayError>,
}

impl EchoForwarder {
    pub(super) fn failing(error: RelayError) -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    pub(super) fn received(&self) -> Vec<Bytes> {
        self.received.lock().expect("forwarder mutex").clone()
    }
}

impl Forwarder for EchoForwarder {
    async fn forward(&self, payload: Bytes) -> Result<Bytes, RelayError> {
        self.received
            .lock()
            .expect("forwarder mutex")
            .push(payload.clone());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => {
                let mut reply = br#"{"ok":true,"row":42,"echo":"#.to_vec();
                reply.extend_from_slice(&payload);
                reply.push(b'}');
                Ok(Bytes::from(reply))
            }
        }
    }
}

pub(super) fn settings() -> NotificationSettings {
    NotificationSettings {
        sender: "Índice Cultural <consultoria@aculturadonnegocio.com.br>".to_string(),
        subject: "Seu resultado do Índice de Maturidade Cultural".to_string(),
        operator_email: Some("operacao@aculturadonnegocio.com.br".to_string()),
    }
}

pub(super) type TestService = AssessmentService<MemoryNotifier, EchoForwarder>;

pub(super) fn build_service(
    notifier: MemoryNotifier,
    forwarder: Option<EchoForwarder>,
) -> (Arc<TestService>, Arc<MemoryNotifier>, Option<Arc<EchoForwarder>>) {
    let notifier = Arc::new(notifier);
    let forwarder = forwarder.map(Arc::new);
    let service = Arc::new(AssessmentService::new(
        notifier.clone(),
        forwarder.clone(),
        settings(),
    ));
    (service, notifier, forwarder)
}

pub(super) fn router(service: Arc<TestService>) -> Router {
    assessment_router(service, CorsPolicy::new("https://indice.example.com"))
}

pub(super) fn payload_with_answers(answers: Value) -> Value {
    json!({
        "companyName": "Acme Ltda",
        "respondentName": "Ana Souza",
        "email": "ana@acme.com.br",
        "companySize": "51-200",
        "role": "CEO",
        "answers": answers,
    })
}

pub(super) fn complete_payload() -> Value {
    payload_with_answers(json!([5, 5, 5, 5, 5, 5, 5, 5, 5, 5]))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(super) async fn read_body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable")
        .to_vec()
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub(super) async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });
    format!("http://{addr}")
}
