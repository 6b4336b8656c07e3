use std::sync::Arc;

use despacho_domain::entities::Notification;
use despacho_domain::policy::{self, Action};
use despacho_domain::repositories::NotificationRepository;
use despacho_domain::value_objects::ActorContext;
use despacho_errors::DispatchResult;
use tracing::instrument;

/// Polling side of the notification mailbox.
pub struct MailboxService {
    notifications: Arc<dyn NotificationRepository>,
}

impl MailboxService {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// Returns the pending notification, marking it read. None when the
    /// mailbox is empty.
    #[instrument(skip(self, ctx), fields(professional_id = %ctx.professional_id))]
    pub async fn drain(&self, ctx: &ActorContext) -> DispatchResult<Option<Notification>> {
        policy::ensure(ctx.role, Action::DrainNotifications)?;
        self.notifications.drain(&ctx.professional_id).await
    }

    /// Clears the pending notification without returning it.
    pub async fn ack(&self, ctx: &ActorContext) -> DispatchResult<bool> {
        policy::ensure(ctx.role, Action::DrainNotifications)?;
        self.notifications.ack(&ctx.professional_id).await
    }
}
