//! Recipient-facing message text builders.
//!
//! All wording lives here so the dispatch logic never concatenates strings.
//! Channel failure reasons are diagnostic only and must never leak into any
//! of these texts.

const ALERT_PREFIX: &str = "\u{1F6A8} EMERGENCY ALERT \u{1F6A8}";
const COMPLETE_PREFIX: &str = "\u{1F6A8} EMERGENCY COMPLETE \u{1F6A8}";

/// The baseline alert text: prefix plus the user's body.
pub fn alert_text(body: &str) -> String {
    format!("{}\n{}", ALERT_PREFIX, body)
}

/// Caption attached to a rich delivery of one photo.
pub fn attachment_caption(body: &str, ordinal: usize, total: usize) -> String {
    format!(
        "{}\n\n\u{1F4F8} Emergency photo {} of {}",
        alert_text(body),
        ordinal,
        total
    )
}

/// Degraded notice sent when every channel was exhausted for one photo.
pub fn degraded_notice(body: &str, ordinal: usize, total: usize) -> String {
    format!(
        "{}\n\n\u{1F4F8} Photo {} of {} captured but couldn't send image. Check emergency app.",
        alert_text(body),
        ordinal,
        total
    )
}

/// The mandatory final summary, stating the total attachment count.
pub fn summary(body: &str, total: usize) -> String {
    format!(
        "{}\n{}\n\n\u{1F4F8} Sent {} emergency photos",
        COMPLETE_PREFIX, body, total
    )
}

/// Notice sent when the alert carries no attachments at all.
pub fn no_attachments_notice(body: &str) -> String {
    format!(
        "{}\n\n\u{26A0}\u{FE0F} No photos captured for this emergency.",
        alert_text(body)
    )
}
