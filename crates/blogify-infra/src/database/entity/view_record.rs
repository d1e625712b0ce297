//! View dedup marker entity for SeaORM.
//!
//! `viewer_id` is the nil UUID for guests so the unique index over
//! (post_id, ip_address, viewer_id) also covers anonymous readers.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use blogify_core::domain::ViewRecord;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "view_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    pub viewer_id: Uuid,
    pub ip_address: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ViewRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            account_id: (!model.viewer_id.is_nil()).then_some(model.viewer_id),
            ip_address: model.ip_address,
            created_at: model.created_at.into(),
        }
    }
}

impl From<ViewRecord> for ActiveModel {
    fn from(record: ViewRecord) -> Self {
        Self {
            id: Set(record.id),
            post_id: Set(record.post_id),
            viewer_id: Set(record.viewer_id()),
            ip_address: Set(record.ip_address),
            created_at: Set(record.created_at.into()),
        }
    }
}
