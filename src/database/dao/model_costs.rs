use crate::database::entities::{ModelCost, model_costs};
use crate::database::{DatabaseError, DatabaseResult};
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::OnConflict,
};

/// Model price table DAO
pub struct ModelCostsDao {
    db: DatabaseConnection,
}

impl ModelCostsDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_model(&self, model_id: &str) -> DatabaseResult<Option<ModelCost>> {
        let cost = model_costs::Entity::find()
            .filter(model_costs::Column::ModelId.eq(model_id))
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(cost)
    }

    pub async fn get_all(&self) -> DatabaseResult<Vec<ModelCost>> {
        let costs = model_costs::Entity::find()
            .order_by_asc(model_costs::Column::ModelId)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(costs)
    }

    /// Create or replace the rates for a model.
    pub async fn upsert(&self, cost: &ModelCost) -> DatabaseResult<()> {
        let active_model = model_costs::ActiveModel {
            id: ActiveValue::NotSet,
            model_id: Set(cost.model_id.clone()),
            input_cost_per_1k_tokens: Set(cost.input_cost_per_1k_tokens),
            output_cost_per_1k_tokens: Set(cost.output_cost_per_1k_tokens),
            updated_at: Set(cost.updated_at),
        };

        let on_conflict = OnConflict::column(model_costs::Column::ModelId)
            .update_columns([
                model_costs::Column::InputCostPer1kTokens,
                model_costs::Column::OutputCostPer1kTokens,
                model_costs::Column::UpdatedAt,
            ])
            .to_owned();

        model_costs::Entity::insert(active_model)
            .on_conflict(on_conflict)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(())
    }

    /// Insert a model's rates only if no row exists yet. Seeding uses this
    /// so admin-edited rates survive restarts. Returns whether a row was
    /// inserted.
    pub async fn insert_if_absent(&self, cost: &ModelCost) -> DatabaseResult<bool> {
        let active_model = model_costs::ActiveModel {
            id: ActiveValue::NotSet,
            model_id: Set(cost.model_id.clone()),
            input_cost_per_1k_tokens: Set(cost.input_cost_per_1k_tokens),
            output_cost_per_1k_tokens: Set(cost.output_cost_per_1k_tokens),
            updated_at: Set(cost.updated_at),
        };

        let on_conflict = OnConflict::column(model_costs::Column::ModelId)
            .do_nothing()
            .to_owned();

        let rows = model_costs::Entity::insert(active_model)
            .on_conflict(on_conflict)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(rows > 0)
    }

    pub async fn delete_by_model(&self, model_id: &str) -> DatabaseResult<bool> {
        let result = model_costs::Entity::delete_many()
            .filter(model_costs::Column::ModelId.eq(model_id))
            .exec(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}
