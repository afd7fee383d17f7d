//! Cart document and cart item snapshots.

use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use super::common::{decode_list, DocumentError};

/// One cart per user; `items` holds a JSON array of [`CartItem`].
#[derive(Debug, Clone, FromRow)]
pub struct Cart {
    pub user_id: String,
    pub items: String,
    pub updated_at: String,
}

impl Cart {
    pub fn items(&self) -> Result<Vec<CartItem>, DocumentError> {
        decode_list(&self.items)
    }
}

/// Snapshot of a product taken when it was added to the cart. Later
/// changes to the product do not propagate here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub quantity: i64,
}

/// Put `item` into the list. An existing entry for the same product keeps
/// its snapshot and takes the new quantity; otherwise the item is appended.
pub fn merge_item(items: &mut Vec<CartItem>, item: CartItem) {
    match items.iter_mut().find(|existing| existing.id == item.id) {
        Some(existing) => existing.quantity = item.quantity,
        None => items.push(item),
    }
}

/// Drop every entry for `product_id`. Unknown ids leave the list untouched.
pub fn remove_item(items: Vec<CartItem>, product_id: &str) -> Vec<CartItem> {
    items
        .into_iter()
        .filter(|item| item.id != product_id)
        .collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct AddToCartRequest {
    pub product: Option<CartProduct>,
    pub quantity: Option<i64>,
}

/// Product fields sent by the storefront. Anything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CartProduct {
    #[serde(default, deserialize_with = "product_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
}

/// Product ids arrive as strings or bare numbers; both are kept as text.
fn product_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(id)) => Ok(Some(id)),
        Some(serde_json::Value::Number(id)) => Ok(Some(id.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "product id must be a string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, quantity: i64) -> CartItem {
        CartItem {
            id: id.to_string(),
            name: format!("Product {}", id),
            price: 10.0,
            image: format!("{}.png", id),
            quantity,
        }
    }

    #[test]
    fn test_merge_appends_new_product() {
        let mut items = vec![item("a", 1)];
        merge_item(&mut items, item("b", 2));
        assert_eq!(items, vec![item("a", 1), item("b", 2)]);
    }

    #[test]
    fn test_merge_overwrites_quantity() {
        let mut items = vec![item("a", 1), item("b", 2)];
        merge_item(&mut items, item("a", 5));

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 5);
        assert_eq!(items[1], item("b", 2));
    }

    #[test]
    fn test_merge_keeps_original_snapshot() {
        let mut items = vec![item("a", 1)];
        let mut repriced = item("a", 3);
        repriced.price = 99.0;
        repriced.name = "Renamed".to_string();
        merge_item(&mut items, repriced);

        assert_eq!(items[0].price, 10.0);
        assert_eq!(items[0].name, "Product a");
        assert_eq!(items[0].quantity, 3);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let items = vec![item("a", 1), item("b", 2)];
        assert_eq!(remove_item(items.clone(), "zzz"), items);
    }

    #[test]
    fn test_remove_item() {
        let items = vec![item("a", 1), item("b", 2)];
        assert_eq!(remove_item(items, "a"), vec![item("b", 2)]);
    }

    #[test]
    fn test_cart_items_decoding() {
        let cart = Cart {
            user_id: "u".to_string(),
            items: r#"[{"id":"a","name":"Chair","price":49.99,"image":"c.png","quantity":2}]"#
                .to_string(),
            updated_at: String::new(),
        };
        let items = cart.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Chair");
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_request_ignores_extra_product_fields() {
        let req: AddToCartRequest = serde_json::from_str(
            r#"{"product": {"id": "p1", "name": "Chair", "price": 5, "image": "x", "description": "d"}}"#,
        )
        .unwrap();
        let product = req.product.unwrap();
        assert_eq!(product.id.as_deref(), Some("p1"));
        assert_eq!(product.price, Some(5.0));
        assert!(req.quantity.is_none());
    }

    #[test]
    fn test_numeric_product_id_kept_as_text() {
        let req: AddToCartRequest =
            serde_json::from_str(r#"{"product": {"id": 42, "name": "Chair"}}"#).unwrap();
        assert_eq!(req.product.unwrap().id.as_deref(), Some("42"));

        let req: AddToCartRequest = serde_json::from_str(r#"{"product": {"id": null}}"#).unwrap();
        assert!(req.product.unwrap().id.is_none());

        let req: AddToCartRequest = serde_json::from_str(r#"{"product": {}}"#).unwrap();
        assert!(req.product.unwrap().id.is_none());
    }

    #[test]
    fn test_structured_product_id_rejected() {
        let result: Result<AddToCartRequest, _> =
            serde_json::from_str(r#"{"product": {"id": {"oid": "x"}}}"#);
        assert!(result.is_err());
    }
}
