//! Contacts Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    columns::try_get_timestamp,
    contacts::{
        data::NewContact,
        records::{ContactRecord, ContactUuid},
    },
    reservations::records::ClaimUuid,
    users::records::UserUuid,
};

const CREATE_CONTACT_SQL: &str = include_str!("sql/create_contact.sql");
const GET_CONTACT_SQL: &str = include_str!("sql/get_contact.sql");
const LINK_CLAIM_SQL: &str = include_str!("sql/link_claim.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgContactsRepository;

impl PgContactsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_contact(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        contact: NewContact,
    ) -> Result<ContactRecord, sqlx::Error> {
        query_as::<Postgres, ContactRecord>(CREATE_CONTACT_SQL)
            .bind(contact.uuid.into_uuid())
            .bind(contact.user_uuid.into_uuid())
            .bind(contact.first_name)
            .bind(contact.last_name)
            .bind(contact.preferred_name)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_contact(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        contact: ContactUuid,
    ) -> Result<ContactRecord, sqlx::Error> {
        query_as::<Postgres, ContactRecord>(GET_CONTACT_SQL)
            .bind(contact.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn link_claim(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        contact: ContactUuid,
        claim: ClaimUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(LINK_CLAIM_SQL)
            .bind(contact.into_uuid())
            .bind(claim.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for ContactRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ContactUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            claim_uuid: row
                .try_get::<Option<Uuid>, _>("claim_uuid")?
                .map(ClaimUuid::from_uuid),
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            preferred_name: row.try_get("preferred_name")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}
