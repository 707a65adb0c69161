use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "usage_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub iccid: String,

    /// Billing month, `YYYY-MM`
    pub month: String,

    /// Base allowance before purchased packages
    pub total_mb: i64,

    pub used_mb: i64,

    pub unit: String,

    pub last_update: String,
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
