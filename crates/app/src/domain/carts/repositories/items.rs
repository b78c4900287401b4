//! Cart Items Repository

use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar,
};
use uuid::Uuid;

use crate::domain::{
    carts::records::{
        Acquirable, Benefitable, CartItemRecord, CartItemUuid, CartUuid, Holdable,
    },
    columns::{try_get_parsed, try_get_slot, try_get_timestamp, unknown_slot_type},
    contacts::records::ContactUuid,
    memberships::records::MembershipUuid,
    reservations::records::ReservationUuid,
};

const GET_CART_ITEMS_SQL: &str = include_str!("../sql/get_cart_items.sql");
const GET_CART_ITEM_SQL: &str = include_str!("../sql/get_cart_item.sql");
const CREATE_CART_ITEM_SQL: &str = include_str!("../sql/create_cart_item.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("../sql/delete_cart_item.sql");
const DELETE_UNHELD_ITEMS_SQL: &str = include_str!("../sql/delete_unheld_items.sql");
const MOVE_ITEM_SQL: &str = include_str!("../sql/move_item.sql");
const MOVE_ALL_ITEMS_SQL: &str = include_str!("../sql/move_all_items.sql");
const ATTACH_HOLDABLE_SQL: &str = include_str!("../sql/attach_holdable.sql");
const SET_ITEM_AVAILABLE_SQL: &str = include_str!("../sql/set_item_available.sql");
const MARK_ITEMS_PROCESSED_SQL: &str = include_str!("../sql/mark_items_processed.sql");
const LIST_HOLDING_CARTS_SQL: &str = include_str!("../sql/list_holding_carts.sql");

/// Snapshot of an item as it goes into a cart.
#[derive(Debug, Clone)]
pub(crate) struct CartItemInsert {
    pub uuid: CartItemUuid,
    pub cart: CartUuid,
    pub acquirable: Acquirable,
    pub benefitable: Option<Benefitable>,
    pub item_name: String,
    pub item_price_cents: i64,
    pub later: bool,
    pub available: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<CartItemRecord>, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(GET_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
    ) -> Result<CartItemRecord, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(GET_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemInsert,
    ) -> Result<CartItemRecord, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(CREATE_CART_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(item.cart.into_uuid())
            .bind(item.acquirable.kind().as_str())
            .bind(item.acquirable.type_str())
            .bind(item.acquirable.uuid())
            .bind(item.benefitable.map(Benefitable::type_str))
            .bind(item.benefitable.map(Benefitable::uuid))
            .bind(item.item_name)
            .bind(item.item_price_cents)
            .bind(item.later)
            .bind(item.available)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Deletes the cart's items that have not claimed anything.
    pub(crate) async fn delete_unheld_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_UNHELD_ITEMS_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn move_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
        destination: CartUuid,
        later: bool,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MOVE_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(destination.into_uuid())
            .bind(later)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn move_all_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        source: CartUuid,
        destination: CartUuid,
        later: bool,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MOVE_ALL_ITEMS_SQL)
            .bind(source.into_uuid())
            .bind(destination.into_uuid())
            .bind(later)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn attach_holdable(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
        holdable: Holdable,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(ATTACH_HOLDABLE_SQL)
            .bind(item.into_uuid())
            .bind(holdable.type_str())
            .bind(holdable.uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_available(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
        available: bool,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_ITEM_AVAILABLE_SQL)
            .bind(item.into_uuid())
            .bind(available)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn mark_processed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_ITEMS_PROCESSED_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Carts with an item holding the given reservation.
    pub(crate) async fn list_holding_carts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation: ReservationUuid,
    ) -> Result<Vec<CartUuid>, sqlx::Error> {
        let carts = query_scalar::<Postgres, Uuid>(LIST_HOLDING_CARTS_SQL)
            .bind(reservation.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(carts.into_iter().map(CartUuid::from_uuid).collect())
    }
}

fn decode_acquirable(row: &PgRow) -> Result<Acquirable, sqlx::Error> {
    let kind: String = row.try_get("acquirable_type")?;

    match (kind.as_str(), row.try_get::<Option<Uuid>, _>("acquirable_uuid")?) {
        (Acquirable::MEMBERSHIP, Some(uuid)) => {
            Ok(Acquirable::Membership(MembershipUuid::from_uuid(uuid)))
        }
        (Acquirable::DONATION, None) => Ok(Acquirable::Donation),
        (other, _) => Err(unknown_slot_type("acquirable_type", other)),
    }
}

fn decode_benefitable(row: &PgRow) -> Result<Option<Benefitable>, sqlx::Error> {
    match try_get_slot(row, "benefitable_type", "benefitable_uuid")? {
        None => Ok(None),
        Some((kind, uuid)) if kind == Benefitable::CONTACT => {
            Ok(Some(Benefitable::Contact(ContactUuid::from_uuid(uuid))))
        }
        Some((kind, _)) => Err(unknown_slot_type("benefitable_type", &kind)),
    }
}

fn decode_holdable(row: &PgRow) -> Result<Option<Holdable>, sqlx::Error> {
    match try_get_slot(row, "holdable_type", "holdable_uuid")? {
        None => Ok(None),
        Some((kind, uuid)) if kind == Holdable::RESERVATION => {
            Ok(Some(Holdable::Reservation(ReservationUuid::from_uuid(uuid))))
        }
        Some((kind, _)) => Err(unknown_slot_type("holdable_type", &kind)),
    }
}

impl<'r> FromRow<'r, PgRow> for CartItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartItemUuid::from_uuid(row.try_get("uuid")?),
            cart_uuid: CartUuid::from_uuid(row.try_get("cart_uuid")?),
            kind: try_get_parsed(row, "kind")?,
            acquirable: decode_acquirable(row)?,
            benefitable: decode_benefitable(row)?,
            holdable: decode_holdable(row)?,
            item_name: row.try_get("item_name")?,
            item_price_cents: row.try_get("item_price_cents")?,
            later: row.try_get("later")?,
            available: row.try_get("available")?,
            processed: row.try_get("processed")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}
