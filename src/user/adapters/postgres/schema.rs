//! Diesel schema for user accounts.

diesel::table! {
    /// User accounts.
    users (id) {
        /// Internal user identifier.
        id -> Uuid,
        /// Login name; unique when present.
        #[max_length = 20]
        username -> Nullable<Varchar>,
        /// Normalised email; unique.
        #[max_length = 255]
        email -> Varchar,
        /// PHC-encoded password hash for local accounts.
        password_hash -> Nullable<Text>,
        /// Google subject identifier; unique when present.
        #[max_length = 255]
        google_id -> Nullable<Varchar>,
        /// Display name.
        #[max_length = 255]
        name -> Nullable<Varchar>,
        /// Profile picture URL.
        picture -> Nullable<Text>,
        /// Authentication provider.
        #[max_length = 10]
        auth_provider -> Varchar,
        /// Authorisation role.
        #[max_length = 10]
        role -> Varchar,
        /// Whether the account may sign in.
        is_active -> Bool,
        /// Most recent successful login.
        last_login -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
