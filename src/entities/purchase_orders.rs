use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Display identifier, `PO` + timestamp + random suffix
    #[sea_orm(unique)]
    pub order_id: String,

    /// Client idempotency key
    #[sea_orm(unique)]
    pub transid: String,

    pub iccid: String,

    pub month: String,

    pub package_mb: i32,

    pub price_cent: i64,

    pub product_id: Option<String>,

    pub status: String,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sim_cards::Entity",
        from = "Column::Iccid",
        to = "super::sim_cards::Column::Iccid",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    SimCards,
}

impl Related<super::sim_cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SimCards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
