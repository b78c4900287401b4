//! Reservations Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use wellington::reservations::ReservationState;

use crate::domain::{
    columns::{try_get_optional_timestamp, try_get_parsed, try_get_timestamp},
    memberships::records::MembershipUuid,
    reservations::records::{
        ClaimRecord, ClaimUuid, OrderRecord, OrderUuid, ReservationRecord, ReservationUuid,
    },
    users::records::UserUuid,
};

const LOCK_RESERVATIONS_SQL: &str = include_str!("sql/lock_reservations.sql");
const MAX_MEMBERSHIP_NUMBER_SQL: &str = include_str!("sql/max_membership_number.sql");
const CREATE_RESERVATION_SQL: &str = include_str!("sql/create_reservation.sql");
const GET_RESERVATION_SQL: &str = include_str!("sql/get_reservation.sql");
const UPDATE_RESERVATION_STATE_SQL: &str = include_str!("sql/update_reservation_state.sql");
const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const GET_ACTIVE_ORDER_SQL: &str = include_str!("sql/get_active_order.sql");
const CREATE_CLAIM_SQL: &str = include_str!("sql/create_claim.sql");
const GET_ACTIVE_CLAIM_SQL: &str = include_str!("sql/get_active_claim.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgReservationsRepository;

impl PgReservationsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Blocks other writers until the transaction ends, so membership
    /// numbers are handed out one at a time.
    pub(crate) async fn lock_numbering(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<(), sqlx::Error> {
        query(LOCK_RESERVATIONS_SQL).execute(&mut **tx).await?;

        Ok(())
    }

    pub(crate) async fn max_membership_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Option<i64>, sqlx::Error> {
        query_scalar::<Postgres, Option<i64>>(MAX_MEMBERSHIP_NUMBER_SQL)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_reservation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation: ReservationUuid,
        membership_number: i64,
        state: ReservationState,
    ) -> Result<ReservationRecord, sqlx::Error> {
        query_as::<Postgres, ReservationRecord>(CREATE_RESERVATION_SQL)
            .bind(reservation.into_uuid())
            .bind(membership_number)
            .bind(state.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_reservation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation: ReservationUuid,
    ) -> Result<ReservationRecord, sqlx::Error> {
        query_as::<Postgres, ReservationRecord>(GET_RESERVATION_SQL)
            .bind(reservation.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_state(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation: ReservationUuid,
        state: ReservationState,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_RESERVATION_STATE_SQL)
            .bind(reservation.into_uuid())
            .bind(state.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation: ReservationUuid,
        membership: MembershipUuid,
        active_from: Timestamp,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(OrderUuid::new().into_uuid())
            .bind(reservation.into_uuid())
            .bind(membership.into_uuid())
            .bind(SqlxTimestamp::from(active_from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_active_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation: ReservationUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ACTIVE_ORDER_SQL)
            .bind(reservation.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_claim(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation: ReservationUuid,
        user: UserUuid,
        active_from: Timestamp,
    ) -> Result<ClaimRecord, sqlx::Error> {
        query_as::<Postgres, ClaimRecord>(CREATE_CLAIM_SQL)
            .bind(ClaimUuid::new().into_uuid())
            .bind(reservation.into_uuid())
            .bind(user.into_uuid())
            .bind(SqlxTimestamp::from(active_from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_active_claim(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation: ReservationUuid,
    ) -> Result<ClaimRecord, sqlx::Error> {
        query_as::<Postgres, ClaimRecord>(GET_ACTIVE_CLAIM_SQL)
            .bind(reservation.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ReservationRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ReservationUuid::from_uuid(row.try_get("uuid")?),
            membership_number: row.try_get("membership_number")?,
            state: try_get_parsed(row, "state")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            reservation_uuid: ReservationUuid::from_uuid(row.try_get("reservation_uuid")?),
            membership_uuid: MembershipUuid::from_uuid(row.try_get("membership_uuid")?),
            active_from: try_get_timestamp(row, "active_from")?,
            active_to: try_get_optional_timestamp(row, "active_to")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ClaimRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ClaimUuid::from_uuid(row.try_get("uuid")?),
            reservation_uuid: ReservationUuid::from_uuid(row.try_get("reservation_uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            active_from: try_get_timestamp(row, "active_from")?,
            active_to: try_get_optional_timestamp(row, "active_to")?,
        })
    }
}
