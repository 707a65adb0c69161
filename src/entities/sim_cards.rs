use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sim_cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub iccid: String,

    #[sea_orm(unique)]
    pub imsi: String,

    #[sea_orm(unique)]
    pub msisdn: String,

    pub owner_id: i32,

    /// One of `ACTIVE`, `SUSPENDED`, `DEACTIVATED`
    pub status: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
    #[sea_orm(has_many = "super::purchase_orders::Entity")]
    PurchaseOrders,
    #[sea_orm(has_many = "super::usage_records::Entity")]
    UsageRecords,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::purchase_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrders.def()
    }
}

impl Related<super::usage_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsageRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
