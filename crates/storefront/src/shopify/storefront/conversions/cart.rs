//! Cart and customer conversion functions.

use noh_core::{CartId, CartLineId, ProductId, VariantId};
use tracing::warn;

use crate::shopify::types::{
    Cart, CartCost, CartLine, CartLineCost, CartMerchandise, CartMerchandiseProduct, Customer,
    UserError,
};

use super::super::queries::{customer_create, raw};
use super::{convert_image, convert_money, convert_selected_options};

/// Shopify reports counts as `Int`; negative values never occur in practice.
fn to_count(value: i64, field: &'static str) -> u32 {
    u32::try_from(value).unwrap_or_else(|_| {
        warn!(value, field, "Out-of-range count in cart response");
        0
    })
}

fn convert_line(line: raw::CartLine) -> CartLine {
    let merchandise = line.merchandise;
    CartLine {
        id: CartLineId::new(line.id),
        quantity: to_count(line.quantity, "quantity"),
        cost: CartLineCost {
            amount_per_quantity: convert_money(line.cost.amount_per_quantity),
            total_amount: convert_money(line.cost.total_amount),
            compare_at_amount_per_quantity: line
                .cost
                .compare_at_amount_per_quantity
                .map(convert_money),
        },
        merchandise: CartMerchandise {
            id: VariantId::new(merchandise.id),
            title: merchandise.title,
            selected_options: convert_selected_options(merchandise.selected_options),
            image: merchandise.image.map(convert_image),
            product: CartMerchandiseProduct {
                id: ProductId::new(merchandise.product.id),
                handle: merchandise.product.handle,
                title: merchandise.product.title,
            },
        },
    }
}

/// Convert the `CartFields` fragment shared by every cart operation.
pub fn convert_cart(cart: raw::Cart) -> Cart {
    Cart {
        id: CartId::new(cart.id),
        checkout_url: cart.checkout_url,
        total_quantity: to_count(cart.total_quantity, "totalQuantity"),
        cost: CartCost {
            subtotal: convert_money(cart.cost.subtotal_amount),
            total: convert_money(cart.cost.total_amount),
        },
        lines: cart.lines.nodes.into_iter().map(convert_line).collect(),
    }
}

pub fn convert_customer(customer: customer_create::Customer) -> Customer {
    Customer {
        id: customer.id,
        email: customer.email,
        accepts_marketing: customer.accepts_marketing,
    }
}

/// Join mutation user errors into one message, or `None` if there are none.
pub fn join_user_errors(errors: Vec<raw::UserError>) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    let errors: Vec<UserError> = errors
        .into_iter()
        .map(|e| UserError {
            code: e.code,
            field: e.field,
            message: e.message,
        })
        .collect();
    for error in &errors {
        warn!(code = ?error.code, field = ?error.field, message = %error.message, "Shopify user error");
    }
    Some(
        errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; "),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn money(amount: &str) -> serde_json::Value {
        json!({"amount": amount, "currencyCode": "USD"})
    }

    #[test]
    fn test_convert_cart_lines() {
        let raw: raw::Cart = serde_json::from_value(json!({
            "id": "gid://shopify/Cart/c1",
            "checkoutUrl": "https://shop.example/checkouts/c1",
            "totalQuantity": 3,
            "cost": {"subtotalAmount": money("555.0"), "totalAmount": money("555.0")},
            "lines": {"nodes": [{
                "id": "gid://shopify/CartLine/1",
                "quantity": 3,
                "cost": {
                    "amountPerQuantity": money("185.0"),
                    "totalAmount": money("555.0"),
                    "compareAtAmountPerQuantity": null
                },
                "merchandise": {
                    "id": "gid://shopify/ProductVariant/11",
                    "title": "Black / Clear",
                    "selectedOptions": [{"name": "Color", "value": "Black"}],
                    "image": null,
                    "product": {"id": "gid://shopify/Product/1", "handle": "frame-a", "title": "Frame A"}
                }
            }]}
        }))
        .unwrap();

        let cart = convert_cart(raw);

        assert_eq!(cart.total_quantity, 3);
        assert_eq!(cart.cost.subtotal.display(), "$555.00");
        let line = cart.line(&CartLineId::new("gid://shopify/CartLine/1")).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.merchandise.product.handle, "frame-a");
    }

    #[test]
    fn test_join_user_errors() {
        assert_eq!(join_user_errors(vec![]), None);

        let joined = join_user_errors(vec![
            raw::UserError {
                code: Some("INVALID".to_string()),
                field: None,
                message: "first".to_string(),
            },
            raw::UserError {
                code: None,
                field: Some(vec!["lines".to_string()]),
                message: "second".to_string(),
            },
        ]);
        assert_eq!(joined.as_deref(), Some("first; second"));
    }
}
