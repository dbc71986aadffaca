use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Invoice, Order, OrderItemDetail, PaymentMode};
use crate::services::order_service::PlacedOrder;
use crate::services::pricing::PricingBreakdown;

#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    Manager(#[from] DatabaseError),
    #[error("PDF rendering error: {0}")]
    Pdf(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct InvoiceService {
    pool: PgPool,
}

impl InvoiceService {
    pub async fn new() -> Result<Self, InvoiceError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Render the invoice PDF for a freshly committed order, store it under
    /// the media root and record the invoice row. Returns the row and the
    /// PDF bytes (the caller mails them to the buyer).
    pub async fn generate_for_order(
        &self,
        placed: &PlacedOrder,
    ) -> Result<(Invoice, Vec<u8>), InvoiceError> {
        let pdf = render_pdf(&placed.order, &placed.items, &placed.pricing, &placed.buyer_email)?;

        let relative_path = format!("invoices/invoice_{}.pdf", placed.order.invoice_id);
        let media_root = std::path::Path::new(&config::config().media.root);
        let absolute_path = media_root.join(&relative_path);
        if let Some(parent) = absolute_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&absolute_path, &pdf).await?;

        let invoice = sqlx::query_as::<_, Invoice>(
            "INSERT INTO invoices (user_id, order_id, invoice_id, total, pdf_path)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(placed.order.user_id)
        .bind(placed.order.id)
        .bind(&placed.order.invoice_id)
        .bind(placed.order.total)
        .bind(&relative_path)
        .fetch_one(&self.pool)
        .await?;

        Ok((invoice, pdf))
    }

    /// Invoice for one of the user's orders, if it has been generated.
    pub async fn find_for_order(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<Invoice>, InvoiceError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            "SELECT i.* FROM invoices i
             JOIN orders o ON o.id = i.order_id
             WHERE i.order_id = $1 AND o.user_id = $2",
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(invoice)
    }
}

// A4 in millimeters, text flowing top to bottom. printpdf's Mm wraps f32.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP_MARGIN: f32 = 17.0;
const BOTTOM_MARGIN: f32 = 30.0;
const LEFT: f32 = 18.0;
const ITEM_INDENT: f32 = 22.0;
const LINE_HEIGHT: f32 = 5.5;

/// Cursor that writes text lines down an A4 page, starting a fresh page when
/// the current one fills up.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, InvoiceError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| InvoiceError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| InvoiceError::Pdf(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - TOP_MARGIN,
        })
    }

    fn text(&mut self, x: f32, text: &str, size: f32, bold: bool) {
        if self.y < BOTTOM_MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - TOP_MARGIN;
        }
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
        self.y -= LINE_HEIGHT;
    }

    fn line(&mut self, text: &str) {
        self.text(LEFT, text, 10.0, false);
    }

    fn heading(&mut self, text: &str) {
        self.text(LEFT, text, 12.0, true);
    }

    fn gap(&mut self) {
        self.y -= LINE_HEIGHT;
    }

    fn finish(self) -> Result<Vec<u8>, InvoiceError> {
        self.doc.save_to_bytes().map_err(|e| InvoiceError::Pdf(e.to_string()))
    }
}

/// Render the invoice document. Pure function of the order data, so unit
/// tests can exercise it without a database.
pub fn render_pdf(
    order: &Order,
    items: &[OrderItemDetail],
    pricing: &PricingBreakdown,
    buyer_email: &str,
) -> Result<Vec<u8>, InvoiceError> {
    let mut page = PageWriter::new("E-Market Invoice")?;

    page.text(72.0, "E-Market Invoice", 16.0, true);
    page.gap();
    page.line("E-Market, Dummy Address, Trichy");
    page.line("Contact: 9876543210");
    page.gap();

    page.line(&format!(
        "Invoice Date: {}",
        order.created_at.format("%Y-%m-%d %H:%M:%S")
    ));
    page.line(&format!("Order ID: {}", order.invoice_id));
    page.line(&format!("User: {}", buyer_email));
    page.gap();

    page.heading("Items");
    for item in items {
        let line_total = item.price * rust_decimal::Decimal::from(item.quantity);
        page.text(
            ITEM_INDENT,
            &format!(
                "{} - Rs.{} x {} = Rs.{}",
                item.name, item.price, item.quantity, line_total
            ),
            10.0,
            false,
        );
    }
    page.gap();

    page.line(&format!("Subtotal: Rs.{}", pricing.subtotal));
    page.line(&format!("Shipping Fee: Rs.{}", pricing.shipping_fee));
    match PaymentMode::parse(&order.payment_mode) {
        Some(PaymentMode::Cod) if !pricing.cod_surcharge.is_zero() => {
            page.line(&format!("COD Surcharge: Rs.{}", pricing.cod_surcharge));
        }
        Some(PaymentMode::Online) if !pricing.gst.is_zero() => {
            page.line(&format!("GST (8%): Rs.{}", pricing.gst));
        }
        _ => {}
    }
    page.text(LEFT, &format!("Total: Rs.{}", order.total), 12.0, true);
    page.gap();

    page.line(&format!("Shipping Address: {}", order.dispatch_address));
    page.line(&format!("Phone: {}", order.dispatch_phone));
    page.gap();
    page.line("Thank you for shopping with E-Market!");

    page.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::pricing::price_order;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn sample_order(payment_mode: &str, total: Decimal) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            invoice_id: "INV-00C0FFEE42".to_string(),
            created_at: Utc::now(),
            total,
            dispatch_confirmed: true,
            dispatch_address: "12 Main St, Trichy".to_string(),
            dispatch_phone: "9876543210".to_string(),
            shipment_status: "Pending".to_string(),
            payment_mode: payment_mode.to_string(),
            distance: 3.0,
            is_direct: false,
        }
    }

    fn sample_item(name: &str, price: &str, quantity: i32) -> OrderItemDetail {
        OrderItemDetail {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            name: name.to_string(),
            brand: "Acme".to_string(),
            quantity,
            price: price.parse().unwrap(),
        }
    }

    #[test]
    fn renders_a_pdf_document() {
        let items = vec![sample_item("Widget", "199.99", 2), sample_item("Gadget", "49.50", 1)];
        let pricing = price_order("449.48".parse().unwrap(), PaymentMode::Cod, 3.0);
        let order = sample_order("cod", pricing.total);

        let pdf = render_pdf(&order, &items, &pricing, "buyer@example.com").expect("pdf");
        assert!(pdf.starts_with(b"%PDF"), "not a PDF header");
        assert!(pdf.len() > 500);
    }

    #[test]
    fn long_item_lists_flow_onto_extra_pages() {
        let items: Vec<_> = (0..120).map(|i| sample_item(&format!("Item {}", i), "10.00", 1)).collect();
        let pricing = price_order("1200.00".parse().unwrap(), PaymentMode::Online, 0.0);
        let order = sample_order("online", pricing.total);

        let pdf = render_pdf(&order, &items, &pricing, "buyer@example.com").expect("pdf");
        assert!(pdf.starts_with(b"%PDF"));

        let short = render_pdf(&order, &items[..2], &pricing, "buyer@example.com").expect("pdf");
        assert!(
            pdf.len() > short.len(),
            "overflowing item list should grow the document ({} vs {})",
            pdf.len(),
            short.len()
        );
    }
}
