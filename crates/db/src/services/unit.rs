use tracing::info;
use unitsched_core::{
    errors::{EntityKind, SchedError, SchedResult},
    models::unit::{CreateUnitRequest, Unit, UnitQuery, UpdateUnitRequest},
    principal::{self, Principal},
};

use super::{begin, commit, store_error};
use crate::{
    errors::classify, repositories::unit as unit_repo, schema::UNIT_CODE_UNIQUE, DbPool,
};

fn write_error(report: eyre::Report) -> SchedError {
    if classify(&report).is_unique(UNIT_CODE_UNIQUE) {
        SchedError::duplicate("code", "unit with this code already exists.")
    } else {
        store_error(report)
    }
}

#[derive(Clone)]
pub struct UnitService {
    pool: DbPool,
}

impl UnitService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, principal: Option<&Principal>, query: &UnitQuery) -> SchedResult<Vec<Unit>> {
        principal::require(principal)?;

        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let units = unit_repo::list_units(&self.pool, search)
            .await
            .map_err(store_error)?;
        Ok(units.into_iter().map(Unit::from).collect())
    }

    pub async fn get(&self, principal: Option<&Principal>, id: i64) -> SchedResult<Unit> {
        principal::require(principal)?;

        unit_repo::get_unit_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(Unit::from)
            .ok_or_else(|| SchedError::not_found(EntityKind::Unit, id))
    }

    pub async fn create(&self, principal: Option<&Principal>, request: CreateUnitRequest) -> SchedResult<Unit> {
        let principal = principal::require(principal)?;
        let fields = request.validate()?;

        let unit = unit_repo::create_unit(&self.pool, &fields.code, &fields.name, fields.capacity)
            .await
            .map_err(write_error)?;

        info!("Unit {} ({}) created by {}", unit.id, unit.code, principal.username);
        Ok(unit.into())
    }

    pub async fn update(
        &self,
        principal: Option<&Principal>,
        id: i64,
        request: UpdateUnitRequest,
    ) -> SchedResult<Unit> {
        let principal = principal::require(principal)?;
        let mut tx = begin(&self.pool).await?;

        let current: Unit = unit_repo::get_unit_by_id(&mut *tx, id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| SchedError::not_found(EntityKind::Unit, id))?
            .into();
        let fields = request.apply(&current)?;

        let unit = unit_repo::update_unit(&mut *tx, id, &fields.code, &fields.name, fields.capacity)
            .await
            .map_err(write_error)?
            .ok_or_else(|| SchedError::not_found(EntityKind::Unit, id))?;
        commit(tx).await?;

        info!("Unit {} updated by {}", id, principal.username);
        Ok(unit.into())
    }

    /// Deletes the unit; its allocations go with it.
    pub async fn delete(&self, principal: Option<&Principal>, id: i64) -> SchedResult<()> {
        let principal = principal::require(principal)?;

        if !unit_repo::delete_unit(&self.pool, id).await.map_err(store_error)? {
            return Err(SchedError::not_found(EntityKind::Unit, id));
        }

        info!("Unit {} deleted by {}", id, principal.username);
        Ok(())
    }
}
