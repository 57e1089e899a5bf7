use uuid::Uuid;

/// Queue events customers are told about. Delivery is simulated: the message
/// is rendered and logged, standing in for a WhatsApp/SMS gateway.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    Joined {
        entry_id: Uuid,
        barber_name: String,
        position: i64,
    },
    Cancelled {
        entry_id: Uuid,
    },
    Completed {
        entry_id: Uuid,
        net_cents: i64,
    },
}

/// Constructed once at startup and handed out through `AppState`.
/// Sends happen on a detached task: a failed or slow notification must never
/// hold up or roll back the queue transaction that triggered it.
#[derive(Debug, Clone)]
pub struct Notifier {
    enabled: bool,
}

impl Notifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn queue_event(&self, recipient: Option<String>, event: QueueEvent) {
        if !self.enabled {
            return;
        }
        tokio::spawn(async move {
            let recipient = recipient.as_deref().unwrap_or("-");
            match event {
                QueueEvent::Joined {
                    entry_id,
                    barber_name,
                    position,
                } => {
                    tracing::info!(
                        %entry_id,
                        recipient,
                        barber = %barber_name,
                        position,
                        "notify: joined queue"
                    );
                }
                QueueEvent::Cancelled { entry_id } => {
                    tracing::info!(%entry_id, recipient, "notify: queue entry cancelled");
                }
                QueueEvent::Completed { entry_id, net_cents } => {
                    tracing::info!(%entry_id, recipient, net_cents, "notify: visit completed");
                }
            }
        });
    }
}
