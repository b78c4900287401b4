//! Memberships Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::domain::{
    columns::{try_get_optional_timestamp, try_get_timestamp},
    memberships::{
        data::NewMembership,
        records::{MembershipRecord, MembershipUuid},
    },
};

const CREATE_MEMBERSHIP_SQL: &str = include_str!("sql/create_membership.sql");
const GET_MEMBERSHIP_SQL: &str = include_str!("sql/get_membership.sql");
const GET_RESERVATION_MEMBERSHIP_SQL: &str = include_str!("sql/get_reservation_membership.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgMembershipsRepository;

impl PgMembershipsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_membership(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        membership: NewMembership,
    ) -> Result<MembershipRecord, sqlx::Error> {
        query_as::<Postgres, MembershipRecord>(CREATE_MEMBERSHIP_SQL)
            .bind(membership.uuid.into_uuid())
            .bind(membership.name)
            .bind(membership.price_cents)
            .bind(SqlxTimestamp::from(membership.active_from))
            .bind(membership.active_to.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_membership(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        membership: MembershipUuid,
    ) -> Result<MembershipRecord, sqlx::Error> {
        query_as::<Postgres, MembershipRecord>(GET_MEMBERSHIP_SQL)
            .bind(membership.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// The membership held by a reservation's active order.
    pub(crate) async fn get_reservation_membership(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation: Uuid,
    ) -> Result<MembershipRecord, sqlx::Error> {
        query_as::<Postgres, MembershipRecord>(GET_RESERVATION_MEMBERSHIP_SQL)
            .bind(reservation)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for MembershipRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: MembershipUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            price_cents: row.try_get("price_cents")?,
            active_from: try_get_timestamp(row, "active_from")?,
            active_to: try_get_optional_timestamp(row, "active_to")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}
