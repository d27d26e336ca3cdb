//! `SeaORM` Entity for borrowers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::BorrowerType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "borrowers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub national_id: String,
    pub full_name: String,
    pub phone: String,
    #[sea_orm(column_type = "Text")]
    pub address: String,
    pub borrower_type: BorrowerType,
    pub loans_count: i32,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub loans_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub loans_total_paid: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub loans_total_remaining: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::loans::Entity")]
    Loans,
}

impl Related<super::loans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
