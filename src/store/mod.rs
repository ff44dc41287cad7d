//! SQLite-backed persistence for users and notes.
//! Keep the public surface thin and split implementation across sub-modules.

mod db;
mod notes;
mod users;

pub use db::Db;
pub use notes::Note;
pub use users::User;
