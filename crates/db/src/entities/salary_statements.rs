//! `SeaORM` Entity for salary_statements table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "salary_statements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub month: Date,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub base_salary: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub changed_salary: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub special_bonus: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub extra: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub rest_allowance: Decimal,
    pub performance_evaluation: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub special_incentive: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub meal_allowance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub transport_allowance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_entitlements: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub loan: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub insurance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub absence: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub penalties: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub quality_deduction_cash: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub quality_deduction_days: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub installments: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub monthly_receipts: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_deductions: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub net_salary: Decimal,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    pub updated_by: Option<Uuid>,
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
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
