mod accounts;
mod notes;

pub use accounts::AccountService;
pub use notes::NoteService;
