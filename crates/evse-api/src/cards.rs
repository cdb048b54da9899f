// Authorized card allowlist endpoints.

use tracing::debug;

use crate::client::EvseClient;
use crate::error::Error;
use crate::models::{Ack, CardEntry};

impl EvseClient {
    /// List authorized cards.
    ///
    /// `GET /api/cards`
    pub async fn list_cards(&self) -> Result<Vec<CardEntry>, Error> {
        let url = self.api_url("cards")?;
        debug!("listing authorized cards");
        self.get(url).await
    }

    /// Authorize a card.
    ///
    /// `POST /api/cards` with `{"id": "...", "expireDate": "YYYY-MM-DD"}`
    ///
    /// The id is sent as given; format checks belong to the caller.
    pub async fn add_card(&self, card: &CardEntry) -> Result<Ack, Error> {
        let url = self.api_url("cards")?;
        debug!(id = %card.id, expires = %card.expire_date, "adding card");
        self.post(url, card).await
    }

    /// Revoke a card.
    ///
    /// `DELETE /api/cards/{id}`
    pub async fn delete_card(&self, id: &str) -> Result<Ack, Error> {
        let url = self.item_url("cards", id)?;
        debug!(id, "deleting card");
        self.delete(url).await
    }
}
