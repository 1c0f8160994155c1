mod crypto;
mod db;
mod extractor;

pub use extractor::AuthUser;
