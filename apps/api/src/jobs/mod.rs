// Job registry: request handlers plus the pure validation and merge logic they use.

pub mod handlers;
pub mod update;
pub mod validation;
