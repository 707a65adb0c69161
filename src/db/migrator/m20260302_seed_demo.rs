use crate::db::repositories::user::hash_password;
use crate::entities::{prelude::*, sim_cards, usage_records, users};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Demo accounts: (username, password, active)
pub const DEMO_USERS: [(&str, &str, bool); 3] = [
    ("demo", "demo-pw", true),
    ("other", "other-pw", true),
    ("disabled", "disabled-pw", false),
];

/// Demo SIMs: (iccid, imsi, msisdn, owner, status)
pub const DEMO_SIMS: [(&str, &str, &str, &str, &str); 4] = [
    ("89860000000000000001", "460000000000001", "8613800000001", "demo", "ACTIVE"),
    ("89860000000000000002", "460000000000002", "8613800000002", "demo", "SUSPENDED"),
    ("89860000000000000003", "460000000000003", "8613800000003", "demo", "DEACTIVATED"),
    ("89860000000000000004", "460000000000004", "8613800000004", "other", "ACTIVE"),
];

pub const DEMO_USAGE_MONTH: &str = "2025-09";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        let now = crate::db::now_timestamp();

        for (username, password, active) in DEMO_USERS {
            let password_hash =
                hash_password(password, None).map_err(|e| DbErr::Custom(e.to_string()))?;

            Users::insert(users::ActiveModel {
                username: Set(username.to_string()),
                password_hash: Set(password_hash),
                active: Set(active),
                last_login_at: Set(None),
                created_at: Set(now.clone()),
                ..Default::default()
            })
            .exec(conn)
            .await?;
        }

        for (iccid, imsi, msisdn, owner, status) in DEMO_SIMS {
            let owner = Users::find()
                .filter(users::Column::Username.eq(owner))
                .one(conn)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(format!("seed user {owner}")))?;

            SimCards::insert(sim_cards::ActiveModel {
                iccid: Set(iccid.to_string()),
                imsi: Set(imsi.to_string()),
                msisdn: Set(msisdn.to_string()),
                owner_id: Set(owner.id),
                status: Set(status.to_string()),
                updated_at: Set(now.clone()),
            })
            .exec(conn)
            .await?;
        }

        UsageRecords::insert(usage_records::ActiveModel {
            iccid: Set(DEMO_SIMS[0].0.to_string()),
            month: Set(DEMO_USAGE_MONTH.to_string()),
            total_mb: Set(1024),
            used_mb: Set(300),
            unit: Set("MB".to_string()),
            last_update: Set(now),
            ..Default::default()
        })
        .exec(conn)
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        let iccids: Vec<&str> = DEMO_SIMS.iter().map(|s| s.0).collect();
        let usernames: Vec<&str> = DEMO_USERS.iter().map(|u| u.0).collect();

        UsageRecords::delete_many()
            .filter(usage_records::Column::Iccid.is_in(iccids.clone()))
            .exec(conn)
            .await?;
        SimCards::delete_many()
            .filter(sim_cards::Column::Iccid.is_in(iccids))
            .exec(conn)
            .await?;
        Users::delete_many()
            .filter(users::Column::Username.is_in(usernames))
            .exec(conn)
            .await?;

        Ok(())
    }
}
