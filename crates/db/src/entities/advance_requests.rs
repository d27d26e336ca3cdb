//! `SeaORM` Entity for advance_requests table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AdminDecision, AdvanceStatus, AdvanceType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "advance_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub advance_type: AdvanceType,
    pub period_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    pub status: AdvanceStatus,
    pub admin_decision: Option<AdminDecision>,
    pub user_locked: bool,
    pub locked: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::advance_periods::Entity",
        from = "Column::PeriodId",
        to = "super::advance_periods::Column::Id",
        on_delete = "Cascade"
    )]
    AdvancePeriods,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::advance_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdvancePeriods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
