pub mod assembler;
pub mod classify;
pub mod dates;
pub mod extract;
pub mod handlers;
pub mod prompts;
pub mod title;
