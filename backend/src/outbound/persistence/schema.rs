//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        /// Lowercased, unique.
        email -> Varchar,
        /// Unique login name.
        username -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Campground listings; images are embedded by value.
    listings (id) {
        id -> Uuid,
        title -> Text,
        location -> Text,
        price -> Float8,
        description -> Text,
        longitude -> Float8,
        latitude -> Float8,
        /// JSON array of `{ "url", "filename" }` objects in insertion order.
        images -> Jsonb,
        author_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reviews; a listing's review set is every row with its `listing_id`.
    reviews (id) {
        id -> Uuid,
        listing_id -> Uuid,
        body -> Text,
        rating -> Int2,
        author_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(listings -> users (author_id));
diesel::joinable!(reviews -> listings (listing_id));
diesel::joinable!(reviews -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(users, listings, reviews);
