//! Diesel schema for the trellis tables.

diesel::table! {
    /// Registered users keyed by normalized email.
    users (email) {
        /// Normalized email address.
        #[max_length = 320]
        email -> Varchar,
        /// Display name.
        #[max_length = 100]
        display_name -> Varchar,
        /// Opaque credential hash.
        credential_hash -> Text,
        /// Whether the email has been verified.
        verified -> Bool,
        /// Last project the user opened.
        last_project_id -> Nullable<Uuid>,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Live one-time codes, at most one per email.
    one_time_codes (email) {
        /// Email the code was issued to.
        #[max_length = 320]
        email -> Varchar,
        /// Numeric code.
        #[max_length = 16]
        code -> Varchar,
        /// Expiry instant.
        expires_at -> Timestamptz,
    }
}

diesel::table! {
    /// Projects.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Project name.
        #[max_length = 100]
        name -> Varchar,
        /// Email of the creating user.
        #[max_length = 320]
        owner_email -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Project memberships, pending or active.
    project_members (project_id, user_email) {
        /// Project identifier.
        project_id -> Uuid,
        /// Member email.
        #[max_length = 320]
        user_email -> Varchar,
        /// Granted role.
        #[max_length = 20]
        role -> Varchar,
        /// Acceptance status.
        #[max_length = 20]
        status -> Varchar,
        /// Invitation token, set only while pending.
        #[max_length = 64]
        invite_token -> Nullable<Varchar>,
        /// Invitation or acceptance timestamp.
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Project tasks.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Title.
        #[max_length = 100]
        title -> Varchar,
        /// Optional description.
        #[max_length = 255]
        description -> Nullable<Varchar>,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Priority.
        #[max_length = 20]
        priority -> Varchar,
        /// Progress status.
        #[max_length = 20]
        status -> Varchar,
        /// Creator email.
        #[max_length = 320]
        created_by -> Varchar,
        /// Assignee email.
        #[max_length = 320]
        assignee_email -> Nullable<Varchar>,
        /// Whether the assignee has yet to acknowledge the task.
        is_new -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last assignee change.
        last_assigned_at -> Timestamptz,
        /// Optimistic concurrency counter.
        revision -> BigInt,
    }
}

diesel::joinable!(project_members -> projects (project_id));
diesel::joinable!(tasks -> projects (project_id));

diesel::allow_tables_to_appear_in_same_query!(users, one_time_codes, projects, project_members, tasks);
