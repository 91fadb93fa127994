//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Name of the unique constraint on the `users.username` column.
const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Builds a [`User`] out of the provided `users` table [`Row`].
fn user_from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password: row.get("password"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<User>, user::Username>>> for Postgres<C>
where
    C: Connection + Sync,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username = by.into_inner();

        const SQL: &str = "\
            SELECT id, username, password, created_at \
            FROM users \
            WHERE username = $1::VARCHAR \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&username])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(user_from_row))
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection + Sync,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            username,
            password,
            created_at,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (id, username, password, created_at) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, \
                $4::TIMESTAMPTZ\
            )";
        let res = self
            .exec(SQL, &[&id, &username, &password, &created_at])
            .await;
        match res {
            Err(e)
                if matches!(
                    e.as_ref(),
                    database::Error::Postgres(e)
                        if e.is_unique_violation(Some(USERNAME_CONSTRAINT)),
                ) =>
            {
                Err(tracerr::new!(database::Error::DuplicateUsername(
                    username
                )))
            }
            res => res.map_err(tracerr::wrap!()).map(drop),
        }
    }
}
