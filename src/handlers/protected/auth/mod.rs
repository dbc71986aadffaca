mod session;
mod whoami;

pub use session::logout_post;
pub use whoami::whoami_get;
