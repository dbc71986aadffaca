pub mod invoice_service;
pub mod mailer;
pub mod order_service;
pub mod pricing;
