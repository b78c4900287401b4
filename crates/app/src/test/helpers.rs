//! Test Helpers

use jiff::Timestamp;
use wellington::{
    carts::CartStatus,
    charges::{ChargeState, Transfer},
};

use crate::{
    domain::{
        carts::{
            CartsService, CartsServiceError,
            data::{NewCart, NewCartItem},
            records::{CartItemRecord, CartRecord, CartUuid},
        },
        charges::{
            ChargesService, ChargesServiceError,
            data::NewCharge,
            records::{Buyable, ChargeRecord, ChargeUuid},
        },
        contacts::{
            ContactsService, ContactsServiceError,
            data::NewContact,
            records::{ContactRecord, ContactUuid},
        },
        memberships::{
            MembershipsService, MembershipsServiceError,
            data::NewMembership,
            records::{MembershipRecord, MembershipUuid},
        },
        users::{
            UsersService, UsersServiceError,
            data::NewUser,
            records::{UserRecord, UserUuid},
        },
    },
    test::TestContext,
};

pub(crate) async fn create_user(
    ctx: &TestContext,
    email: &str,
) -> Result<UserRecord, UsersServiceError> {
    ctx.users
        .create_user(NewUser {
            uuid: UserUuid::new(),
            email: email.to_string(),
        })
        .await
}

/// A membership on sale since the epoch with no end date.
pub(crate) async fn create_membership(
    ctx: &TestContext,
    name: &str,
    price_cents: i64,
) -> Result<MembershipRecord, MembershipsServiceError> {
    ctx.memberships
        .create_membership(NewMembership {
            uuid: MembershipUuid::new(),
            name: name.to_string(),
            price_cents,
            active_from: Timestamp::UNIX_EPOCH,
            active_to: None,
        })
        .await
}

pub(crate) async fn create_contact(
    ctx: &TestContext,
    user: UserUuid,
    first_name: &str,
    last_name: &str,
) -> Result<ContactRecord, ContactsServiceError> {
    ctx.contacts
        .create_contact(NewContact {
            uuid: ContactUuid::new(),
            user_uuid: user,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            preferred_name: None,
        })
        .await
}

pub(crate) async fn create_cart(
    ctx: &TestContext,
    user: UserUuid,
    status: CartStatus,
) -> Result<CartRecord, CartsServiceError> {
    ctx.carts
        .create_cart(NewCart {
            uuid: CartUuid::new(),
            user_uuid: user,
            status,
        })
        .await
}

/// The user's pending cart.
pub(crate) async fn now_bin(
    ctx: &TestContext,
    user: UserUuid,
) -> Result<CartRecord, CartsServiceError> {
    create_cart(ctx, user, CartStatus::Pending).await
}

pub(crate) async fn add_membership(
    ctx: &TestContext,
    cart: CartUuid,
    membership: MembershipUuid,
    contact: Option<ContactUuid>,
) -> Result<CartItemRecord, CartsServiceError> {
    ctx.carts
        .add_item(cart, NewCartItem::membership(membership, contact))
        .await
}

/// Records a charge and settles it as successful.
pub(crate) async fn record_payment(
    ctx: &TestContext,
    user: UserUuid,
    buyable: Buyable,
    amount_cents: i64,
) -> Result<ChargeRecord, ChargesServiceError> {
    let charge = ctx
        .charges
        .create_charge(NewCharge {
            uuid: ChargeUuid::new(),
            user_uuid: user,
            buyable,
            amount_cents,
            transfer: Transfer::Stripe,
            site_selection: false,
            comment: String::new(),
        })
        .await?;

    ctx.charges
        .settle_charge(charge.uuid, ChargeState::Successful)
        .await
}
