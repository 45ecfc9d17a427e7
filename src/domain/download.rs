use std::fmt;

use chrono::{DateTime, Utc};

use crate::models::enums::{TicketStatus, TransactionStatus};

/// Why a ticket cannot be downloaded right now. `None` from
/// [`download_blocker`] means the PDF may be handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadBlocker {
    PdfNotIssued,
    TransactionNotApproved,
    TicketNotApproved,
    NotYetAvailable(Option<DateTime<Utc>>),
}

impl fmt::Display for DownloadBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadBlocker::PdfNotIssued => write!(f, "the ticket PDF has not been issued yet"),
            DownloadBlocker::TransactionNotApproved => {
                write!(f, "the purchase has not been approved")
            }
            DownloadBlocker::TicketNotApproved => write!(f, "the ticket is not approved"),
            DownloadBlocker::NotYetAvailable(Some(at)) => {
                write!(f, "the ticket becomes downloadable on {}", at.date_naive())
            }
            DownloadBlocker::NotYetAvailable(None) => {
                write!(f, "the download window has not opened yet")
            }
        }
    }
}

/// A ticket is downloadable iff it has a PDF, its transaction and the ticket
/// itself are approved, and the purchase is either a courtesy or the download
/// window has opened.
pub fn download_blocker(
    transaction_status: TransactionStatus,
    courtesy: bool,
    download_available_at: Option<DateTime<Utc>>,
    ticket_status: TicketStatus,
    pdf_url: Option<&str>,
    now: DateTime<Utc>,
) -> Option<DownloadBlocker> {
    if pdf_url.is_none() {
        return Some(DownloadBlocker::PdfNotIssued);
    }
    if transaction_status != TransactionStatus::Approved {
        return Some(DownloadBlocker::TransactionNotApproved);
    }
    if ticket_status != TicketStatus::Approved {
        return Some(DownloadBlocker::TicketNotApproved);
    }
    if courtesy {
        return None;
    }

    match download_available_at {
        Some(at) if now >= at => None,
        other => Some(DownloadBlocker::NotYetAvailable(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const PDF: Option<&str> = Some("https://storage.entrada.example/tickets/t.pdf");

    #[test]
    fn all_gates_open_allows_download() {
        let now = Utc::now();
        let blocker = download_blocker(
            TransactionStatus::Approved,
            false,
            Some(now - Duration::hours(1)),
            TicketStatus::Approved,
            PDF,
            now,
        );
        assert_eq!(blocker, None);
    }

    #[test]
    fn missing_pdf_blocks_first() {
        let now = Utc::now();
        let blocker = download_blocker(
            TransactionStatus::Pending,
            false,
            None,
            TicketStatus::Pending,
            None,
            now,
        );
        assert_eq!(blocker, Some(DownloadBlocker::PdfNotIssued));
    }

    #[test]
    fn unapproved_transaction_blocks() {
        let now = Utc::now();
        let blocker = download_blocker(
            TransactionStatus::Pending,
            false,
            Some(now),
            TicketStatus::Approved,
            PDF,
            now,
        );
        assert_eq!(blocker, Some(DownloadBlocker::TransactionNotApproved));
    }

    #[test]
    fn cancelled_ticket_blocks() {
        let now = Utc::now();
        let blocker = download_blocker(
            TransactionStatus::Approved,
            false,
            Some(now),
            TicketStatus::Cancelled,
            PDF,
            now,
        );
        assert_eq!(blocker, Some(DownloadBlocker::TicketNotApproved));
    }

    #[test]
    fn courtesy_skips_the_download_window() {
        let now = Utc::now();
        let blocker = download_blocker(
            TransactionStatus::Approved,
            true,
            Some(now + Duration::days(30)),
            TicketStatus::Approved,
            PDF,
            now,
        );
        assert_eq!(blocker, None);
    }

    #[test]
    fn future_window_blocks_with_the_date() {
        let now = Utc::now();
        let at = now + Duration::days(2);
        let blocker = download_blocker(
            TransactionStatus::Approved,
            false,
            Some(at),
            TicketStatus::Approved,
            PDF,
            now,
        );
        assert_eq!(blocker, Some(DownloadBlocker::NotYetAvailable(Some(at))));
    }

    #[test]
    fn missing_window_blocks_non_courtesy() {
        let now = Utc::now();
        let blocker = download_blocker(
            TransactionStatus::Approved,
            false,
            None,
            TicketStatus::Approved,
            PDF,
            now,
        );
        assert_eq!(blocker, Some(DownloadBlocker::NotYetAvailable(None)));
    }
}
