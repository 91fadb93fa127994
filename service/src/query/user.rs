//! [`Query`] collection related to a single [`User`].

use common::operations::By;

use crate::domain::{user, User};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`User`] by its exact [`user::Username`].
pub type ByUsername = DatabaseQuery<By<Option<User>, user::Username>>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use secrecy::SecretBox;

    use crate::{
        command::RegisterUser,
        domain::user,
        infra::Memory,
        Command as _, Config, Service,
    };

    use super::ByUsername;

    #[tokio::test]
    async fn finds_registered_user() {
        let svc = Service::new(
            Config::new("secret", Duration::from_secs(60)),
            Memory::new(),
        );
        let password = user::Password::new("pw1").unwrap();
        let out = svc
            .execute(RegisterUser {
                username: user::Username::new("alice").unwrap(),
                password: SecretBox::init_with(move || password),
            })
            .await
            .unwrap();

        let by_name = svc
            .execute(ByUsername::by(user::Username::new("alice").unwrap()))
            .await
            .unwrap();
        let missing = svc
            .execute(ByUsername::by(user::Username::new("bob").unwrap()))
            .await
            .unwrap();

        assert_eq!(by_name.map(|u| u.id), Some(out.user.id));
        assert!(missing.is_none());
    }
}
