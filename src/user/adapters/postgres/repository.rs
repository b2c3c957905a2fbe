//! `PostgreSQL` repository implementation for user accounts.

use super::{
    models::{NewUserRow, UserRow},
    schema::users,
};
use crate::db::{PgPool, escape_like};
use crate::pagination::{Page, PageRequest};
use crate::user::{
    domain::{
        AuthProvider, EmailAddress, GoogleSubject, PasswordDigest, PersistedUserData, Role, User,
        UserId, Username,
    },
    ports::{UserCounts, UserQuery, UserRepository, UserRepositoryError, UserRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{BigInt, Timestamptz};

/// `PostgreSQL`-backed user repository.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> UserRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> UserRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(UserRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(UserRepositoryError::persistence)?
    }

    async fn find_one<F>(&self, build: F) -> UserRepositoryResult<Option<User>>
    where
        F: FnOnce() -> users::BoxedQuery<'static, Pg> + Send + 'static,
    {
        self.run_blocking(move |connection| {
            let row = build()
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let row = to_row(user);
        let unique = UniqueFields::of(user);
        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| unique.classify(err))?;
            Ok(())
        })
        .await
    }

    async fn update(&self, user: &User) -> UserRepositoryResult<()> {
        let id = user.id();
        let row = to_row(user);
        let unique = UniqueFields::of(user);
        self.run_blocking(move |connection| {
            let updated = diesel::update(users::table.find(id.into_inner()))
                .set(&row)
                .execute(connection)
                .map_err(|err| unique.classify(err))?;
            if updated == 0 {
                return Err(UserRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        self.find_one(move || {
            users::table
                .filter(users::id.eq(id.into_inner()))
                .into_boxed()
        })
        .await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> UserRepositoryResult<Option<User>> {
        let wanted = email.as_str().to_owned();
        self.find_one(move || users::table.filter(users::email.eq(wanted)).into_boxed())
            .await
    }

    async fn find_by_username(&self, username: &Username) -> UserRepositoryResult<Option<User>> {
        let wanted = username.as_str().to_owned();
        self.find_one(move || users::table.filter(users::username.eq(wanted)).into_boxed())
            .await
    }

    async fn find_by_identifier(&self, identifier: &str) -> UserRepositoryResult<Option<User>> {
        let by_username = identifier.trim().to_owned();
        let by_email = by_username.to_lowercase();
        self.find_one(move || {
            users::table
                .filter(users::email.eq(by_email).or(users::username.eq(by_username)))
                .into_boxed()
        })
        .await
    }

    async fn find_by_google_subject(
        &self,
        subject: &GoogleSubject,
    ) -> UserRepositoryResult<Option<User>> {
        let wanted = subject.as_str().to_owned();
        self.find_one(move || users::table.filter(users::google_id.eq(wanted)).into_boxed())
            .await
    }

    async fn delete(&self, id: UserId) -> UserRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(users::table.find(id.into_inner()))
                .execute(connection)
                .map_err(UserRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(UserRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn list(
        &self,
        query: &UserQuery,
        page: PageRequest,
    ) -> UserRepositoryResult<Page<User>> {
        let filters = query.clone();
        self.run_blocking(move |connection| {
            let total: i64 = filtered(&filters)
                .count()
                .get_result(connection)
                .map_err(UserRepositoryError::persistence)?;
            let offset = i64::try_from(page.offset()).map_err(UserRepositoryError::persistence)?;
            let rows = filtered(&filters)
                .select(UserRow::as_select())
                .order((users::created_at.desc(), users::id.asc()))
                .limit(i64::from(page.limit()))
                .offset(offset)
                .load::<UserRow>(connection)
                .map_err(UserRepositoryError::persistence)?;

            let found = rows
                .into_iter()
                .map(row_to_user)
                .collect::<UserRepositoryResult<Vec<_>>>()?;
            let total_count = u64::try_from(total).map_err(UserRepositoryError::persistence)?;
            Ok(Page::new(found, page, total_count))
        })
        .await
    }

    async fn counts(&self, recent_since: DateTime<Utc>) -> UserRepositoryResult<UserCounts> {
        self.run_blocking(move |connection| {
            let row = diesel::sql_query(concat!(
                "SELECT COUNT(*) AS total, ",
                "COUNT(*) FILTER (WHERE is_active) AS active, ",
                "COUNT(*) FILTER (WHERE auth_provider = 'google') AS google, ",
                "COUNT(*) FILTER (WHERE auth_provider = 'local') AS local, ",
                "COUNT(*) FILTER (WHERE created_at >= $1) AS recent_signups ",
                "FROM users",
            ))
            .bind::<Timestamptz, _>(recent_since)
            .get_result::<UserCountRow>(connection)
            .map_err(UserRepositoryError::persistence)?;

            let convert =
                |value: i64| u64::try_from(value).map_err(UserRepositoryError::persistence);
            Ok(UserCounts {
                total: convert(row.total)?,
                active: convert(row.active)?,
                google: convert(row.google)?,
                local: convert(row.local)?,
                recent_signups: convert(row.recent_signups)?,
            })
        })
        .await
    }
}

#[derive(QueryableByName)]
struct UserCountRow {
    #[diesel(sql_type = BigInt)]
    total: i64,
    #[diesel(sql_type = BigInt)]
    active: i64,
    #[diesel(sql_type = BigInt)]
    google: i64,
    #[diesel(sql_type = BigInt)]
    local: i64,
    #[diesel(sql_type = BigInt)]
    recent_signups: i64,
}

fn filtered(query: &UserQuery) -> users::BoxedQuery<'static, Pg> {
    let mut statement = users::table.into_boxed();
    if let Some(search) = query.search.as_deref() {
        let pattern = format!("%{}%", escape_like(search));
        statement = statement.filter(
            users::email
                .ilike(pattern.clone())
                .or(users::username.ilike(pattern.clone()))
                .or(users::name.ilike(pattern)),
        );
    }
    if let Some(provider) = query.provider {
        statement = statement.filter(users::auth_provider.eq(provider.as_str()));
    }
    if let Some(active) = query.active {
        statement = statement.filter(users::is_active.eq(active));
    }
    statement
}

/// Unique values of a user, used to name the field behind a violation.
struct UniqueFields {
    email: EmailAddress,
    username: Option<Username>,
    google_subject: Option<GoogleSubject>,
}

impl UniqueFields {
    fn of(user: &User) -> Self {
        Self {
            email: user.email().clone(),
            username: user.username().cloned(),
            google_subject: user.google_subject().cloned(),
        }
    }

    fn classify(self, err: DieselError) -> UserRepositoryError {
        let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info) = err else {
            return UserRepositoryError::persistence(err);
        };
        match (info.constraint_name(), self.username, self.google_subject) {
            (Some("users_username_key"), Some(username), _) => {
                UserRepositoryError::DuplicateUsername(username)
            }
            (Some("users_google_id_key"), _, Some(subject)) => {
                UserRepositoryError::DuplicateGoogleSubject(subject)
            }
            _ => UserRepositoryError::DuplicateEmail(self.email),
        }
    }
}

fn to_row(user: &User) -> NewUserRow {
    NewUserRow {
        id: user.id().into_inner(),
        username: user.username().map(|name| name.as_str().to_owned()),
        email: user.email().as_str().to_owned(),
        password_hash: user.password().map(|digest| digest.as_str().to_owned()),
        google_id: user.google_subject().map(|subject| subject.as_str().to_owned()),
        name: user.name().map(str::to_owned),
        picture: user.picture().map(str::to_owned),
        auth_provider: user.provider().as_str().to_owned(),
        role: user.role().as_str().to_owned(),
        is_active: user.is_active(),
        last_login: user.last_login(),
        created_at: user.created_at(),
        updated_at: user.updated_at(),
    }
}

fn row_to_user(row: UserRow) -> UserRepositoryResult<User> {
    let UserRow {
        id,
        username,
        email,
        password_hash,
        google_id,
        name,
        picture,
        auth_provider,
        role,
        is_active,
        last_login,
        created_at,
        updated_at,
    } = row;

    let data = PersistedUserData {
        id: UserId::from_uuid(id),
        username: username.map(Username::new).transpose()?,
        email: EmailAddress::new(email)?,
        password: password_hash.map(PasswordDigest::from_encoded),
        google_subject: google_id.map(GoogleSubject::new).transpose()?,
        name,
        picture,
        provider: AuthProvider::try_from(auth_provider.as_str())
            .map_err(UserRepositoryError::persistence)?,
        role: Role::try_from(role.as_str()).map_err(UserRepositoryError::persistence)?,
        is_active,
        last_login,
        created_at,
        updated_at,
    };
    Ok(User::from_persisted(data)?)
}
