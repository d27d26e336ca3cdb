//! `SeaORM` Entity for users table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::UserRole;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub employee_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub branch_name: String,
    pub bank_account_number: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub base_salary: Option<Decimal>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub must_change_password: bool,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::salary_statements::Entity")]
    SalaryStatements,
    #[sea_orm(has_many = "super::advance_requests::Entity")]
    AdvanceRequests,
}

impl Related<super::salary_statements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalaryStatements.def()
    }
}

impl Related<super::advance_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdvanceRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
