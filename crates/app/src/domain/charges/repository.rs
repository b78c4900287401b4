//! Charges Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;
use wellington::charges::ChargeState;

use crate::domain::{
    carts::records::CartUuid,
    charges::{
        data::NewCharge,
        records::{Buyable, ChargeRecord, ChargeUuid},
    },
    columns::{try_get_parsed, try_get_timestamp, unknown_slot_type},
    reservations::records::ReservationUuid,
    users::records::UserUuid,
};

const CREATE_CHARGE_SQL: &str = include_str!("sql/create_charge.sql");
const GET_CHARGE_FOR_UPDATE_SQL: &str = include_str!("sql/get_charge_for_update.sql");
const LIST_CHARGES_SQL: &str = include_str!("sql/list_charges.sql");
const LIST_CART_RESERVATION_CHARGES_SQL: &str =
    include_str!("sql/list_cart_reservation_charges.sql");
const UPDATE_CHARGE_STATE_SQL: &str = include_str!("sql/update_charge_state.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgChargesRepository;

impl PgChargesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_charge(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        charge: NewCharge,
    ) -> Result<ChargeRecord, sqlx::Error> {
        query_as::<Postgres, ChargeRecord>(CREATE_CHARGE_SQL)
            .bind(charge.uuid.into_uuid())
            .bind(charge.user_uuid.into_uuid())
            .bind(charge.buyable.type_str())
            .bind(charge.buyable.uuid())
            .bind(charge.amount_cents)
            .bind(ChargeState::Pending.as_str())
            .bind(charge.transfer.as_str())
            .bind(charge.site_selection)
            .bind(charge.comment)
            .fetch_one(&mut **tx)
            .await
    }

    /// Loads a charge and locks its row until the transaction ends.
    pub(crate) async fn get_charge_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        charge: ChargeUuid,
    ) -> Result<ChargeRecord, sqlx::Error> {
        query_as::<Postgres, ChargeRecord>(GET_CHARGE_FOR_UPDATE_SQL)
            .bind(charge.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_charges(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        buyable: Buyable,
    ) -> Result<Vec<ChargeRecord>, sqlx::Error> {
        query_as::<Postgres, ChargeRecord>(LIST_CHARGES_SQL)
            .bind(buyable.type_str())
            .bind(buyable.uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Charges made against the reservations held by a cart's items.
    pub(crate) async fn list_cart_reservation_charges(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<ChargeRecord>, sqlx::Error> {
        query_as::<Postgres, ChargeRecord>(LIST_CART_RESERVATION_CHARGES_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_state(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        charge: ChargeUuid,
        state: ChargeState,
    ) -> Result<ChargeRecord, sqlx::Error> {
        query_as::<Postgres, ChargeRecord>(UPDATE_CHARGE_STATE_SQL)
            .bind(charge.into_uuid())
            .bind(state.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}

fn decode_buyable(row: &PgRow) -> Result<Buyable, sqlx::Error> {
    let kind: String = row.try_get("buyable_type")?;
    let uuid: Uuid = row.try_get("buyable_uuid")?;

    match kind.as_str() {
        Buyable::CART => Ok(Buyable::Cart(CartUuid::from_uuid(uuid))),
        Buyable::RESERVATION => Ok(Buyable::Reservation(ReservationUuid::from_uuid(uuid))),
        other => Err(unknown_slot_type("buyable_type", other)),
    }
}

impl<'r> FromRow<'r, PgRow> for ChargeRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ChargeUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            buyable: decode_buyable(row)?,
            amount_cents: row.try_get("amount_cents")?,
            state: try_get_parsed(row, "state")?,
            transfer: try_get_parsed(row, "transfer")?,
            site_selection: row.try_get("site_selection")?,
            comment: row.try_get("comment")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}
