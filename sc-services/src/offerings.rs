//! Offering listing and administration.

use tracing::{debug, info};

use sc_api::{Returning, SortOrder};
use sc_core::constants::CREATED_AT_COLUMN;
use sc_core::error::{ScError, ScResult};
use sc_models::validate::validate_offering;
use sc_models::{Offering, OfferingFields};

use crate::data_service::{bounded, require_id, sort_newest_first, DataService};

impl DataService {
    /// All offerings, newest first.
    pub async fn list_offerings(&self) -> ScResult<Vec<Offering>> {
        let bearer = self.bearer().await;
        let rows = bounded(
            self.op_timeout,
            "list offerings",
            self.backends.records.select(
                &self.collections.offerings,
                CREATED_AT_COLUMN,
                SortOrder::Descending,
                bearer.as_deref(),
            ),
        )
        .await?;

        let mut offerings = rows
            .iter()
            .map(Offering::from_server_map)
            .collect::<ScResult<Vec<_>>>()?;
        sort_newest_first(&mut offerings, |o| o.created_at);
        debug!("listed {} offerings", offerings.len());
        Ok(offerings)
    }

    pub async fn create_offering(&self, fields: OfferingFields) -> ScResult<Offering> {
        let fields = fields.normalized();
        validate_offering(&fields)?;

        let bearer = self.bearer().await;
        let rows = bounded(
            self.op_timeout,
            "create offering",
            self.backends.records.insert(
                &self.collections.offerings,
                fields.to_row(),
                Returning::Representation,
                bearer.as_deref(),
            ),
        )
        .await?;

        let row = rows
            .first()
            .ok_or_else(|| ScError::Internal("insert returned no offering".into()))?;
        let offering = Offering::from_server_map(row)?;
        info!("created offering {}", offering.id);
        Ok(offering)
    }

    /// Replace the fields of offering `id`. `NotFound` if no row matched.
    pub async fn update_offering(&self, id: &str, fields: OfferingFields) -> ScResult<Offering> {
        let id = require_id(id)?;
        let fields = fields.normalized();
        validate_offering(&fields)?;

        let bearer = self.bearer().await;
        let rows = bounded(
            self.op_timeout,
            "update offering",
            self.backends.records.update(
                &self.collections.offerings,
                id,
                fields.to_row(),
                bearer.as_deref(),
            ),
        )
        .await?;

        let row = rows
            .first()
            .ok_or_else(|| ScError::NotFound(format!("offering {id}")))?;
        let offering = Offering::from_server_map(row)?;
        info!("updated offering {id}");
        Ok(offering)
    }

    /// Delete offering `id`. `NotFound` if no row matched.
    pub async fn delete_offering(&self, id: &str) -> ScResult<()> {
        let id = require_id(id)?;
        let bearer = self.bearer().await;
        let rows = bounded(
            self.op_timeout,
            "delete offering",
            self.backends
                .records
                .delete(&self.collections.offerings, id, bearer.as_deref()),
        )
        .await?;

        if rows.is_empty() {
            return Err(ScError::NotFound(format!("offering {id}")));
        }
        info!("deleted offering {id}");
        Ok(())
    }
}
