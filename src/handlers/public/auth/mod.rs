mod login;
mod register;
mod utils;
mod verify;

pub use login::{login_post, resend_otp_post};
pub use register::register_post;
pub use verify::verify_otp_post;
