use std::collections::BTreeMap;

use serde::Serialize;

/// Mensaje listo para repartir por los canales.
/// Los canales de chat ignoran `to` y `bcc`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub to: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub text: String,
}

/// Resultado por canal: nombre -> true/false.
/// Sólo aparecen los canales que se intentaron.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NotificationOutcome {
    channels: BTreeMap<String, bool>,
}

impl NotificationOutcome {
    pub fn record(&mut self, channel: &str, delivered: bool) {
        self.channels.insert(channel.to_string(), delivered);
    }

    #[cfg(test)]
    pub fn get(&self, channel: &str) -> Option<bool> {
        self.channels.get(channel).copied()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn failed(&self) -> Vec<&str> {
        self.channels
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Qué canales tienen configuración completa (sale como `env` en debug).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelReadiness {
    pub gmail_ready: bool,
    pub resend_ready: bool,
    pub slack_ready: bool,
}
