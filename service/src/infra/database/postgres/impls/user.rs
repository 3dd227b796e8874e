//! [`User`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    unit,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, password_reset, PasswordReset},
        User,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of a [`User`] selected by [`user_from_row`].
const COLUMNS: &str = "\
    u.id, u.name, u.surname, u.email, u.joined, \
    u.has_access, u.is_admin, \
    u.reset_token, u.reset_token_issued_at, \
    l.hash AS password_hash";

/// Builds a [`User`] out of the [`Row`] containing [`COLUMNS`].
fn user_from_row(row: &Row) -> User {
    let reset_token: Option<password_reset::Token> = row.get("reset_token");
    let reset_issued_at: Option<password_reset::IssuingDateTime> =
        row.get("reset_token_issued_at");
    User {
        id: row.get("id"),
        name: row.get("name"),
        surname: row.get("surname"),
        email: row.get("email"),
        joined_at: row.get("joined"),
        has_access: row.get("has_access"),
        is_admin: row.get("is_admin"),
        password_hash: row.get("password_hash"),
        password_reset: reset_token.zip(reset_issued_at).map(
            |(token, issued_at)| PasswordReset { token, issued_at },
        ),
    }
}

impl<C, IDs> Database<Select<By<HashMap<user::Id, User>, IDs>>> for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[user::Id]>,
{
    type Ok = HashMap<user::Id, User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<user::Id, User>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[user::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users AS u \
             LEFT JOIN login AS l ON l.user_email = u.email \
             WHERE u.id = ANY($1::INT4[])",
        );
        Ok(self
            .query(&sql, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let user = user_from_row(row);
                (user.id, user)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<user::Id, User>, [user::Id; 1]>>,
        Ok = HashMap<user::Id, User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<'e, C> Database<Select<By<Option<User>, &'e user::Email>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM users \
            WHERE email = $1::VARCHAR \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[&email])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get::<_, user::Id>("id"))))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Option<User>, password_reset::Token>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, password_reset::Token>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let token: password_reset::Token = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM users \
            WHERE reset_token = $1::UUID \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[&token])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get::<_, user::Id>("id"))))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<User>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<User>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users AS u \
             LEFT JOIN login AS l ON l.user_email = u.email \
             ORDER BY u.id",
        );
        Ok(self
            .query(&sql, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(user_from_row)
            .collect())
    }
}

impl<C> Database<Select<By<read::user::TotalCount, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::user::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::user::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*) \
            FROM users";
        let count: i64 = self
            .query_one(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .get(0);
        Ok(u64::try_from(count).unwrap_or_default().into())
    }
}

impl<C> Database<Select<By<read::user::PendingCount, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::user::PendingCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::user::PendingCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*) \
            FROM users \
            WHERE NOT has_access AND NOT is_admin";
        let count: i64 = self
            .query_one(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .get(0);
        Ok(u64::try_from(count).unwrap_or_default().into())
    }
}

impl<C> Database<Select<By<read::user::AdminEmails, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::user::AdminEmails;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::user::AdminEmails, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT email \
            FROM users \
            WHERE is_admin \
            ORDER BY id";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| row.get::<_, user::Email>("email"))
            .collect::<Vec<_>>()
            .into())
    }
}

impl<C> Database<Select<By<user::Id, unit::Issuing>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = user::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<user::Id, unit::Issuing>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT nextval(pg_get_serial_sequence('users', 'id'))::INT4";
        Ok(self
            .query_one(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .get(0))
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(user)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            name,
            surname,
            email,
            joined_at,
            has_access,
            is_admin,
            password_hash,
            password_reset,
        } = user;
        let reset_token = password_reset.map(|r| r.token);
        let reset_issued_at = password_reset.map(|r| r.issued_at);

        const USER_SQL: &str = "\
            INSERT INTO users (\
                id, name, surname, email, joined, \
                has_access, is_admin, \
                reset_token, reset_token_issued_at\
            ) \
            VALUES (\
                $1::INT4, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::TIMESTAMPTZ, \
                $6::BOOL, $7::BOOL, \
                $8::UUID, $9::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                surname = EXCLUDED.surname, \
                email = EXCLUDED.email, \
                joined = EXCLUDED.joined, \
                has_access = EXCLUDED.has_access, \
                is_admin = EXCLUDED.is_admin, \
                reset_token = EXCLUDED.reset_token, \
                reset_token_issued_at = EXCLUDED.reset_token_issued_at";
        _ = self
            .exec(
                USER_SQL,
                &[
                    &id,
                    &name,
                    &surname,
                    &email,
                    &joined_at,
                    &has_access,
                    &is_admin,
                    &reset_token,
                    &reset_issued_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;

        if let Some(hash) = password_hash {
            const LOGIN_SQL: &str = "\
                INSERT INTO login (hash, user_email) \
                VALUES ($1::VARCHAR, $2::VARCHAR) \
                ON CONFLICT (user_email) DO UPDATE \
                SET hash = EXCLUDED.hash";
            self.exec(LOGIN_SQL, &[&hash, &email])
                .await
                .map_err(tracerr::wrap!())
                .map(drop)
        } else {
            const LOGIN_SQL: &str = "\
                DELETE FROM login \
                WHERE user_email = $1::VARCHAR";
            self.exec(LOGIN_SQL, &[&email])
                .await
                .map_err(tracerr::wrap!())
                .map(drop)
        }
    }
}

impl<C> Database<Lock<By<User, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM users \
            WHERE id = $1::INT4 \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<User, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: user::Id = by.into_inner();

        // `login` rows are removed by the cascade on `users.email`.
        const SQL: &str = "\
            DELETE FROM users \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<PasswordReset, password_reset::IssuingDateTime>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<PasswordReset, password_reset::IssuingDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let issued_before = by.into_inner();

        const SQL: &str = "\
            UPDATE users \
            SET reset_token = NULL, \
                reset_token_issued_at = NULL \
            WHERE reset_token_issued_at < $1::TIMESTAMPTZ";
        self.exec(SQL, &[&issued_before])
            .await
            .map_err(tracerr::wrap!())
    }
}
