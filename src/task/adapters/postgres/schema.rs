//! Diesel schema for task persistence.

diesel::table! {
    /// Task records with time-tracking columns.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Task title.
        #[max_length = 200]
        title -> Varchar,
        /// Optional free-form description.
        #[max_length = 1000]
        description -> Nullable<Varchar>,
        /// Optional category label.
        #[max_length = 100]
        category -> Nullable<Varchar>,
        /// Optional assignee label.
        #[max_length = 100]
        assignee -> Nullable<Varchar>,
        /// Ordered tag list.
        tags -> Array<Text>,
        /// Workflow status.
        #[max_length = 20]
        status -> Varchar,
        /// Priority.
        #[max_length = 10]
        priority -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Timestamptz>,
        /// Minutes accumulated across finished sessions.
        time_spent -> Int8,
        /// Whether a timer session is running.
        is_active -> Bool,
        /// Start of the running session.
        started_at -> Nullable<Timestamptz>,
        /// Completion instant.
        completed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
