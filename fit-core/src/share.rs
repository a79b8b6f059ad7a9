//! Invite sharing text.
//!
//! Pure formatting only; handing the message to a share sheet or browser
//! is the caller's job.

use fit_types::InviteCode;

/// Default application name used in share text.
pub const DEFAULT_APP_NAME: &str = "FitTogether";

const WHATSAPP_BASE: &str = "https://wa.me/?text=";

/// A ready-to-send invitation containing an invite code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareMessage {
    code: InviteCode,
    text: String,
}

impl ShareMessage {
    /// Compose the invitation text for `code`.
    pub fn for_invite_code(code: &InviteCode, app_name: &str) -> Self {
        let tag = hashtag(app_name);
        let text = format!(
            "Join me on {app_name}! Use my invite code: {code}\n\n\
             Download the app and enter this code to become workout partners! 💪\n\n\
             #{tag} #WorkoutBuddy"
        );

        Self {
            code: code.clone(),
            text,
        }
    }

    /// The code being shared.
    pub fn code(&self) -> &InviteCode {
        &self.code
    }

    /// Plain message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `wa.me` link that opens WhatsApp with the text prefilled.
    pub fn whatsapp_url(&self) -> String {
        format!("{}{}", WHATSAPP_BASE, urlencoding::encode(&self.text))
    }
}

fn hashtag(app_name: &str) -> String {
    app_name.chars().filter(|c| c.is_alphanumeric()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> InviteCode {
        InviteCode::parse("K7M2P9QA").unwrap()
    }

    #[test]
    fn text_contains_code_and_app() {
        let msg = ShareMessage::for_invite_code(&code(), DEFAULT_APP_NAME);
        assert!(msg
            .text()
            .starts_with("Join me on FitTogether! Use my invite code: K7M2P9QA"));
        assert!(msg.text().ends_with("#FitTogether #WorkoutBuddy"));
        assert_eq!(msg.code(), &code());
    }

    #[test]
    fn hashtag_strips_spaces() {
        let msg = ShareMessage::for_invite_code(&code(), "Fit Club 2");
        assert!(msg.text().contains("#FitClub2 "));
    }

    #[test]
    fn whatsapp_url_is_percent_encoded() {
        let url = ShareMessage::for_invite_code(&code(), DEFAULT_APP_NAME).whatsapp_url();
        assert!(url.starts_with("https://wa.me/?text=Join%20me%20on%20FitTogether%21"));
        assert!(url.contains("K7M2P9QA"));
        assert!(!url.contains(' '));
        assert!(!url.contains('\n'));
        assert!(url.contains("%23WorkoutBuddy"));
    }
}
