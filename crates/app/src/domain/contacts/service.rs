//! Contacts service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::contacts::{
        data::NewContact,
        errors::ContactsServiceError,
        records::{ContactRecord, ContactUuid},
        repository::PgContactsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgContactsService {
    db: Db,
    repository: PgContactsRepository,
}

impl PgContactsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgContactsRepository::new(),
        }
    }
}

#[async_trait]
impl ContactsService for PgContactsService {
    async fn create_contact(
        &self,
        contact: NewContact,
    ) -> Result<ContactRecord, ContactsServiceError> {
        if contact.first_name.trim().is_empty() && contact.last_name.trim().is_empty() {
            return Err(ContactsServiceError::MissingRequiredData);
        }

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_contact(&mut tx, contact).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_contact(
        &self,
        contact: ContactUuid,
    ) -> Result<ContactRecord, ContactsServiceError> {
        let mut tx = self.db.begin().await?;

        let contact = self.repository.get_contact(&mut tx, contact).await?;

        tx.commit().await?;

        Ok(contact)
    }
}

#[automock]
#[async_trait]
pub trait ContactsService: Send + Sync {
    /// Records a person a membership can be bought for.
    async fn create_contact(
        &self,
        contact: NewContact,
    ) -> Result<ContactRecord, ContactsServiceError>;

    /// Retrieve a single contact.
    async fn get_contact(
        &self,
        contact: ContactUuid,
    ) -> Result<ContactRecord, ContactsServiceError>;
}
