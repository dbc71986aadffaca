pub mod cart;
pub mod invoice;
pub mod order;
pub mod otp;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{CartItem, CartItemDetail};
pub use invoice::Invoice;
pub use order::{Order, OrderItem, OrderItemDetail, PaymentMode, ShipmentStatus};
pub use otp::OtpCode;
pub use product::Product;
pub use session::UserSession;
pub use user::User;
