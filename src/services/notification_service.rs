use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::{future, FutureExt};
use reqwest::Client;
use tokio::task::JoinHandle;

use crate::{
    config::app_config::NotifyConfig,
    models::notification_model::{ChannelReadiness, NotificationOutcome, OutboundMessage},
    services::{
        email_service::merge_recipients,
        notification_channel_service::{
            GmailChannel, NotificationChannel, ResendChannel, SlackChannel, GMAIL, RESEND, SLACK,
        },
    },
};

/// Lo que hay que notificar después de guardar una submission.
#[derive(Debug, Clone)]
pub struct NotificationDispatch {
    pub admin_subject: String,
    pub admin_text: String,
    /// Confirmación para quien llenó el formulario.
    pub confirmation: Option<Confirmation>,
}

#[derive(Debug, Clone)]
pub struct Confirmation {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Fan-out de notificaciones. Sin estado entre llamadas; cada canal es un
/// intento, y un fallo en un canal nunca afecta a los demás.
#[derive(Clone)]
pub struct NotificationService {
    channels: Vec<Arc<dyn NotificationChannel>>,
    notify_emails: Vec<String>,
    always_bcc: Vec<String>,
}

impl NotificationService {
    /// Canales en orden fijo: gmail, resend, slack. Los que no tienen
    /// configuración completa se omiten.
    pub fn from_config(cfg: &NotifyConfig, http_client: Client) -> Self {
        let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();

        match GmailChannel::from_config(cfg, http_client.clone()) {
            Some(ch) => channels.push(Arc::new(ch)),
            None => log::info!("(notifications) Gmail no configurado, se omite."),
        }
        match ResendChannel::from_config(cfg, http_client.clone()) {
            Some(ch) => channels.push(Arc::new(ch)),
            None => log::info!("(notifications) Resend no configurado, se omite."),
        }
        match SlackChannel::from_config(cfg, http_client) {
            Some(ch) => channels.push(Arc::new(ch)),
            None => log::info!("(notifications) Slack no configurado, se omite."),
        }

        Self::with_channels(channels, cfg.notify_emails.clone(), cfg.always_bcc.clone())
    }

    pub fn with_channels(
        channels: Vec<Arc<dyn NotificationChannel>>,
        notify_emails: Vec<String>,
        always_bcc: Vec<String>,
    ) -> Self {
        Self {
            channels,
            notify_emails,
            always_bcc,
        }
    }

    pub fn readiness(&self) -> ChannelReadiness {
        let ready = |name: &str| {
            self.channels
                .iter()
                .any(|ch| ch.name() == name && (!ch.is_mail() || !self.notify_emails.is_empty()))
        };
        ChannelReadiness {
            gmail_ready: ready(GMAIL),
            resend_ready: ready(RESEND),
            slack_ready: ready(SLACK),
        }
    }

    /// Aviso interno por todos los canales. Los de correo necesitan la lista
    /// de notificación; sin ella se omiten.
    pub async fn notify_admins(&self, subject: &str, text: &str) -> NotificationOutcome {
        let msg = OutboundMessage {
            to: self.notify_emails.clone(),
            bcc: merge_recipients(&[&self.always_bcc], &self.notify_emails),
            subject: subject.to_string(),
            text: text.to_string(),
        };

        let mut outcome = NotificationOutcome::default();
        for channel in &self.channels {
            if channel.is_mail() && self.notify_emails.is_empty() {
                continue;
            }
            let delivered = attempt(channel.as_ref(), &msg).await;
            outcome.record(channel.name(), delivered);
        }
        outcome
    }

    /// Confirmación al remitente; sólo canales de correo.
    pub async fn confirm_submitter(&self, to: &str, subject: &str, text: &str) -> NotificationOutcome {
        let recipient = vec![to.to_string()];
        let msg = OutboundMessage {
            bcc: merge_recipients(&[&self.notify_emails, &self.always_bcc], &recipient),
            to: recipient,
            subject: subject.to_string(),
            text: text.to_string(),
        };

        let mut outcome = NotificationOutcome::default();
        for channel in self.channels.iter().filter(|ch| ch.is_mail()) {
            let delivered = attempt(channel.as_ref(), &msg).await;
            outcome.record(channel.name(), delivered);
        }
        outcome
    }

    /// Corre aviso interno y confirmación. Devuelve (notify, confirm).
    pub async fn dispatch(
        &self,
        dispatch: &NotificationDispatch,
    ) -> (NotificationOutcome, Option<NotificationOutcome>) {
        let admin = self.notify_admins(&dispatch.admin_subject, &dispatch.admin_text);
        let confirm = async {
            match &dispatch.confirmation {
                Some(c) => Some(self.confirm_submitter(&c.to, &c.subject, &c.text).await),
                None => None,
            }
        };
        future::join(admin, confirm).await
    }

    /// Fire and forget: los errores se registran en el log, nunca se propagan.
    pub fn dispatch_detached(&self, dispatch: NotificationDispatch) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let (notify, confirm) = service.dispatch(&dispatch).await;
            let failed = notify.failed();
            if !failed.is_empty() {
                log::warn!(
                    "(dispatch_detached) '{}' sin entregar por: {}",
                    dispatch.admin_subject,
                    failed.join(", ")
                );
            }
            log::info!(
                "(dispatch_detached) '{}' -> notify={:?}, confirm={:?}",
                dispatch.admin_subject,
                notify,
                confirm
            );
        })
    }
}

/// Un intento por canal. Cualquier error (o panic) queda como `false`.
async fn attempt(channel: &dyn NotificationChannel, msg: &OutboundMessage) -> bool {
    match AssertUnwindSafe(channel.deliver(msg)).catch_unwind().await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            log::warn!(
                "(notifications) Canal '{}' falló para '{}': {:?}",
                channel.name(),
                msg.subject,
                e
            );
            false
        }
        Err(_) => {
            log::error!(
                "(notifications) Canal '{}' entró en panic para '{}'",
                channel.name(),
                msg.subject
            );
            false
        }
    }
}
