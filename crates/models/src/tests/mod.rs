/// CRUD operations tests against a migrated in-memory database
pub mod crud_tests;
