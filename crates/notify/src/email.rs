//! HTML order-summary rendering.

use movequote_orders::Order;

/// An outbound message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub bcc: Option<String>,
    pub subject: String,
    pub html_body: String,
}

/// Render the fixed-structure order summary: customer fields, a table of
/// line items (name / quantity / volume), and the grand total volume.
///
/// Row order follows the order's line sequence, which in turn follows the
/// customer's selection order.
pub fn render_order_email(order: &Order) -> String {
    let customer = &order.customer;

    let rows: String = order
        .lines
        .iter()
        .map(|line| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.3}</td></tr>",
                escape(&line.name),
                line.quantity,
                line.volume,
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<style>
  body {{ font-family: Arial, sans-serif; color: #333; background-color: #f9f9f9; margin: 0; padding: 0; }}
  .container {{ max-width: 600px; margin: 20px auto; background-color: #ffffff; padding: 20px; border-radius: 8px; }}
  .header {{ text-align: center; padding-bottom: 20px; border-bottom: 2px solid #ddd; }}
  .header h1 {{ color: #4CAF50; }}
  .product-list {{ width: 100%; border-collapse: collapse; margin-top: 20px; }}
  .product-list th, .product-list td {{ padding: 10px; text-align: left; }}
  .product-list th {{ background-color: #4CAF50; color: white; }}
  .total {{ font-size: 1.1em; font-weight: bold; margin-top: 20px; }}
  .footer {{ text-align: center; margin-top: 40px; color: #888; }}
</style>
</head>
<body>
<div class="container">
  <div class="header"><h1>Thank You for Your Order, {name}!</h1></div>
  <div class="content">
    <p>We have received your order and here are the details:</p>
    <p><strong>Name:</strong> {name}</p>
    <p><strong>Email:</strong> {email}</p>
    <p><strong>Phone:</strong> {phone}</p>
    <p><strong>Address:</strong> {address}</p>
    <p><strong>Message:</strong> {message}</p>
    <h2>Selected Products:</h2>
    <table class="product-list">
      <tr><th>Product Name</th><th>Quantity</th><th>Volume (m&#179;)</th></tr>
      {rows}
    </table>
    <div class="total"><p><strong>Total Volume:</strong> {total:.3} m&#179;</p></div>
  </div>
  <div class="footer"><p>Thank you for shopping with us!</p></div>
</div>
</body>
</html>"#,
        name = escape(&customer.name),
        email = escape(&customer.email),
        phone = escape(&customer.phone),
        address = escape(&customer.address),
        message = escape(&customer.message),
        rows = rows,
        total = order.total_volume(),
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
