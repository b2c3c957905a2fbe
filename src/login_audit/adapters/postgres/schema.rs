//! Diesel schema for login attempt persistence.

diesel::table! {
    /// Append-only authentication attempts.
    login_attempts (id) {
        /// Attempt identifier.
        id -> Uuid,
        /// Identifier the caller tried.
        #[max_length = 255]
        email -> Varchar,
        /// Whether authentication succeeded.
        success -> Bool,
        /// Remote address.
        #[max_length = 64]
        ip_address -> Varchar,
        /// `User-Agent` header.
        user_agent -> Text,
        /// Authentication method.
        #[max_length = 20]
        login_method -> Varchar,
        /// Resolved account, when known.
        user_id -> Nullable<Uuid>,
        /// Reason for failure.
        failure_reason -> Nullable<Text>,
        /// When the attempt happened.
        created_at -> Timestamptz,
    }
}
