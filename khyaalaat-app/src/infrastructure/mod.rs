pub mod db;
pub mod fixture;
pub mod openrouter;
pub mod security;
pub mod session;
pub mod store;
pub mod supabase;
