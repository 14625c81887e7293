pub mod env;
pub mod topup;
pub mod verify;
