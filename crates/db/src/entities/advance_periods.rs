//! `SeaORM` Entity for advance_periods table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AdvanceType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "advance_periods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub advance_type: AdvanceType,
    pub start_date: Date,
    pub end_date: Date,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::advance_requests::Entity")]
    AdvanceRequests,
}

impl Related<super::advance_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdvanceRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
