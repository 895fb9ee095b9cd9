//! Contact form submissions.

use tracing::{debug, info};

use sc_api::{Returning, SortOrder};
use sc_core::constants::CREATED_AT_COLUMN;
use sc_core::error::ScResult;
use sc_models::validate::validate_contact;
use sc_models::{ContactFields, ContactMessage};

use crate::data_service::{bounded, sort_newest_first, DataService};

impl DataService {
    /// Store a visitor's message.
    ///
    /// Anonymous visitors may insert but not read, so nothing is returned.
    pub async fn create_contact_message(&self, fields: ContactFields) -> ScResult<()> {
        let fields = fields.normalized();
        validate_contact(&fields)?;

        let bearer = self.bearer().await;
        bounded(
            self.op_timeout,
            "create contact message",
            self.backends.records.insert(
                &self.collections.contact_messages,
                fields.to_row(),
                Returning::Minimal,
                bearer.as_deref(),
            ),
        )
        .await?;
        info!("stored contact message from {}", fields.email);
        Ok(())
    }

    /// All contact messages, newest first.
    pub async fn list_contact_messages(&self) -> ScResult<Vec<ContactMessage>> {
        let bearer = self.bearer().await;
        let rows = bounded(
            self.op_timeout,
            "list contact messages",
            self.backends.records.select(
                &self.collections.contact_messages,
                CREATED_AT_COLUMN,
                SortOrder::Descending,
                bearer.as_deref(),
            ),
        )
        .await?;

        let mut messages = rows
            .iter()
            .map(ContactMessage::from_server_map)
            .collect::<ScResult<Vec<_>>>()?;
        sort_newest_first(&mut messages, |m| m.created_at);
        debug!("listed {} contact messages", messages.len());
        Ok(messages)
    }
}
