//! Carts Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use wellington::carts::CartStatus;

use crate::domain::{
    carts::records::{CartRecord, CartUuid},
    columns::{try_get_optional_timestamp, try_get_parsed, try_get_timestamp},
    users::records::UserUuid,
};

const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const FIND_ACTIVE_CART_SQL: &str = include_str!("../sql/find_active_cart.sql");
const LIST_ACTIVE_CARTS_SQL: &str = include_str!("../sql/list_active_carts.sql");
const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const FIND_PREPARED_CART_SQL: &str = include_str!("../sql/find_prepared_cart.sql");
const CREATE_PREPARED_CART_SQL: &str = include_str!("../sql/create_prepared_cart.sql");
const UPDATE_CART_STATUS_SQL: &str = include_str!("../sql/update_cart_status.sql");
const CLOSE_CART_SQL: &str = include_str!("../sql/close_cart.sql");

/// Cart rows without their items. Callers attach items where needed.
#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(GET_CART_SQL)
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        query_as::<Postgres, CartRecord>(GET_CART_SQL)
            .bind(cart.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// The user's most recent active cart with `status`.
    pub(crate) async fn find_active_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        status: CartStatus,
        point_in_time: Timestamp,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        query_as::<Postgres, CartRecord>(FIND_ACTIVE_CART_SQL)
            .bind(user.into_uuid())
            .bind(status.as_str())
            .bind(SqlxTimestamp::from(point_in_time))
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_active_carts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        status: CartStatus,
        point_in_time: Timestamp,
    ) -> Result<Vec<CartRecord>, sqlx::Error> {
        query_as::<Postgres, CartRecord>(LIST_ACTIVE_CARTS_SQL)
            .bind(user.into_uuid())
            .bind(status.as_str())
            .bind(SqlxTimestamp::from(point_in_time))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        user: UserUuid,
        status: CartStatus,
        active_from: Timestamp,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(CREATE_CART_SQL)
            .bind(cart.into_uuid())
            .bind(user.into_uuid())
            .bind(status.as_str())
            .bind(SqlxTimestamp::from(active_from))
            .fetch_one(&mut **tx)
            .await
    }

    /// The active processing cart an earlier checkout of `source` moved its items into.
    pub(crate) async fn find_prepared_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        source: CartUuid,
        point_in_time: Timestamp,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        query_as::<Postgres, CartRecord>(FIND_PREPARED_CART_SQL)
            .bind(source.into_uuid())
            .bind(SqlxTimestamp::from(point_in_time))
            .fetch_optional(&mut **tx)
            .await
    }

    /// Creates a processing cart for `source`'s owner, remembering where its items came from.
    pub(crate) async fn create_prepared_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        source: &CartRecord,
        active_from: Timestamp,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(CREATE_PREPARED_CART_SQL)
            .bind(cart.into_uuid())
            .bind(source.user_uuid.into_uuid())
            .bind(SqlxTimestamp::from(active_from))
            .bind(source.uuid.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        status: CartStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_CART_STATUS_SQL)
            .bind(cart.into_uuid())
            .bind(status.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Ends the cart's active period at `at`. Already closed carts are left alone.
    pub(crate) async fn close_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        at: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLOSE_CART_SQL)
            .bind(cart.into_uuid())
            .bind(SqlxTimestamp::from(at))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            status: try_get_parsed(row, "status")?,
            active_from: try_get_timestamp(row, "active_from")?,
            active_to: try_get_optional_timestamp(row, "active_to")?,
            items: Vec::new(),
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}
