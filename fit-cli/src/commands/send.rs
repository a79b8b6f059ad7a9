//! Send encouragement to the current partner.

use anyhow::Result;
use clap::Subcommand;
use fit_client::{Encouragement, EncouragementService, SendMessage};

use super::{fail, Session};

/// What to send.
#[derive(Subcommand, Debug, Clone)]
pub enum SendKind {
    /// A text message
    Text {
        /// Message text
        message: String,
    },
    /// A sticker
    Sticker {
        /// Sticker glyph
        glyph: String,
    },
    /// Claps
    Clap {
        /// Number of claps
        #[arg(long, short, default_value = "1")]
        count: u32,
    },
    /// A recorded voice note
    Voice {
        /// Reference to the stored audio
        #[arg(long)]
        audio_ref: String,
        /// Duration in seconds
        #[arg(long, default_value = "0")]
        seconds: u32,
    },
}

impl From<SendKind> for Encouragement {
    fn from(kind: SendKind) -> Self {
        match kind {
            SendKind::Text { message } => Encouragement::Text(message),
            SendKind::Sticker { glyph } => Encouragement::Sticker(glyph),
            SendKind::Clap { count } => Encouragement::Clap(count),
            SendKind::Voice { audio_ref, seconds } => Encouragement::Voice {
                audio_ref,
                duration_secs: seconds,
            },
        }
    }
}

/// Run the send command.
pub async fn run(session: &Session, kind: SendKind) -> Result<()> {
    let viewer = session.viewer().await?;
    let encouragement = EncouragementService::new(session.store.clone(), &session.config);

    let sent = encouragement
        .send_message(&viewer.user_id, SendMessage::new(kind.into()))
        .await
        .map_err(|e| fail(e.notice()))?;

    match sent.message.clap_count {
        Some(count) => println!("Sent {} clap(s) {}", count, sent.message.content),
        None => println!("Sent {} message", sent.message.kind.as_str()),
    }
    Ok(())
}
