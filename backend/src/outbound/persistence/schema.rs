//! Diesel table definitions matching `backend/migrations`.

diesel::table! {
    /// Posted snippets. Rows are never updated; `expires` hides them.
    snippets (id) {
        id -> Int8,
        title -> Varchar,
        content -> Text,
        created -> Timestamptz,
        expires -> Timestamptz,
    }
}

diesel::table! {
    /// Registered accounts. `email` carries a unique constraint.
    users (id) {
        id -> Int8,
        name -> Varchar,
        email -> Varchar,
        hashed_password -> Bpchar,
        created -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(snippets, users);
