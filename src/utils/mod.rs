pub mod directory_cache;
pub mod validation;
