pub mod attribution;
pub mod event;
pub mod identity;
pub mod invite;
pub mod role;
pub mod trigger;
