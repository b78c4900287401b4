//! Memberships service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::memberships::{
        data::NewMembership,
        errors::MembershipsServiceError,
        records::{MembershipRecord, MembershipUuid},
        repository::PgMembershipsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgMembershipsService {
    db: Db,
    repository: PgMembershipsRepository,
}

impl PgMembershipsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgMembershipsRepository::new(),
        }
    }
}

#[async_trait]
impl MembershipsService for PgMembershipsService {
    async fn create_membership(
        &self,
        membership: NewMembership,
    ) -> Result<MembershipRecord, MembershipsServiceError> {
        if membership.price_cents < 0 {
            return Err(MembershipsServiceError::InvalidData);
        }

        if membership.name.trim().is_empty() {
            return Err(MembershipsServiceError::MissingRequiredData);
        }

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_membership(&mut tx, membership)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_membership(
        &self,
        membership: MembershipUuid,
    ) -> Result<MembershipRecord, MembershipsServiceError> {
        let mut tx = self.db.begin().await?;

        let membership = self.repository.get_membership(&mut tx, membership).await?;

        tx.commit().await?;

        Ok(membership)
    }
}

#[automock]
#[async_trait]
pub trait MembershipsService: Send + Sync {
    /// Adds a membership type to the catalogue.
    async fn create_membership(
        &self,
        membership: NewMembership,
    ) -> Result<MembershipRecord, MembershipsServiceError>;

    /// Retrieve a single membership type.
    async fn get_membership(
        &self,
        membership: MembershipUuid,
    ) -> Result<MembershipRecord, MembershipsServiceError>;
}
