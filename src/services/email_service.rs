//! services/email_service.rs
//! Construcción de mensajes RFC 822 para los canales de correo.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use lettre::{
    message::{header::ContentType, Mailbox},
    Address, Message,
};

use crate::models::notification_model::OutboundMessage;

/// Arma el mensaje (From con nombre del sitio, To, Bcc opcional, Subject,
/// texto plano). Nunca agrega Reply-To.
pub fn build_rfc822(site_name: &str, email_from: &str, msg: &OutboundMessage) -> Result<Vec<u8>> {
    let from_address: Address = email_from
        .parse()
        .with_context(|| format!("Invalid from address: {email_from}"))?;
    let from = Mailbox::new(Some(site_name.to_string()), from_address);

    let mut builder = Message::builder()
        .from(from)
        .subject(msg.subject.as_str())
        .header(ContentType::TEXT_PLAIN);

    for to in &msg.to {
        let mailbox: Mailbox = to
            .parse()
            .with_context(|| format!("Invalid recipient address: {to}"))?;
        builder = builder.to(mailbox);
    }

    // Gmail necesita ver el Bcc dentro del raw para entregarlo
    if !msg.bcc.is_empty() {
        for bcc in &msg.bcc {
            let mailbox: Mailbox = bcc
                .parse()
                .with_context(|| format!("Invalid bcc address: {bcc}"))?;
            builder = builder.bcc(mailbox);
        }
        builder = builder.keep_bcc();
    }

    let message = builder
        .body(msg.text.clone())
        .context("Failed to build email message")?;

    Ok(message.formatted())
}

/// base64url sin padding, como lo espera `users.messages.send`.
pub fn encode_raw(rfc822: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(rfc822)
}

/// Une listas de correos sin duplicados (case-insensitive), conservando el
/// orden, y quitando las direcciones de `exclude`.
pub fn merge_recipients(lists: &[&[String]], exclude: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = exclude.iter().map(|e| e.to_lowercase()).collect();
    let mut merged = Vec::new();

    for list in lists {
        for addr in list.iter() {
            let key = addr.to_lowercase();
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            merged.push(addr.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &[&str], bcc: &[&str]) -> OutboundMessage {
        OutboundMessage {
            to: to.iter().map(|s| s.to_string()).collect(),
            bcc: bcc.iter().map(|s| s.to_string()).collect(),
            subject: "New Contact Submission".to_string(),
            text: "Name: Jane Doe".to_string(),
        }
    }

    #[test]
    fn raw_message_has_headers_and_keeps_bcc() {
        let raw = build_rfc822(
            "A Place Called Home",
            "noreply@example.com",
            &message(&["staff@example.com"], &["owner@example.com"]),
        )
        .unwrap();
        let text = String::from_utf8(raw).unwrap();

        assert!(text.contains("A Place Called Home"));
        assert!(text.contains("<noreply@example.com>"));
        assert!(text.contains("To: staff@example.com"));
        assert!(text.contains("Bcc: owner@example.com"));
        assert!(text.contains("Subject: New Contact Submission"));
        assert!(text.contains("text/plain"));
        assert!(!text.to_ascii_lowercase().contains("reply-to"));
    }

    #[test]
    fn no_bcc_header_when_list_is_empty() {
        let raw = build_rfc822(
            "A Place Called Home",
            "noreply@example.com",
            &message(&["staff@example.com"], &[]),
        )
        .unwrap();
        let text = String::from_utf8(raw).unwrap();
        assert!(!text.contains("Bcc:"));
    }

    #[test]
    fn invalid_from_is_an_error() {
        let res = build_rfc822("Home", "not-an-address", &message(&["a@example.com"], &[]));
        assert!(res.is_err());
    }

    #[test]
    fn encode_raw_is_url_safe_without_padding() {
        // 0xfb 0xff -> "+/8=" en base64 estándar
        let encoded = encode_raw(&[0xfb, 0xff]);
        assert_eq!(encoded, "-_8");
        assert!(!encoded.contains('='));
    }

    #[test]
    fn merge_dedupes_and_excludes() {
        let notify = vec!["Staff@example.com".to_string(), "owner@example.com".to_string()];
        let always = vec!["owner@example.com".to_string(), "audit@example.com".to_string()];
        let exclude = vec!["staff@example.com".to_string()];

        let merged = merge_recipients(&[&notify, &always], &exclude);
        assert_eq!(merged, vec!["owner@example.com", "audit@example.com"]);
    }
}
