//! GraphQL documents sent to the Admin API.

/// Read a shop-owned metafield by namespace and key.
pub const SHOP_METAFIELD: &str = r#"
query ShopMetafield($namespace: String!, $key: String!) {
  shop {
    metafield(namespace: $namespace, key: $key) {
      value
    }
  }
}
"#;

/// Resolve the shop's GID (owner of shop metafields).
pub const SHOP_ID: &str = r#"
query ShopId {
  shop {
    id
  }
}
"#;

/// Create or overwrite metafields.
pub const METAFIELDS_SET: &str = r#"
mutation MetafieldsSet($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    metafields {
      id
      namespace
      key
      type
      value
    }
    userErrors {
      field
      message
      code
    }
  }
}
"#;

/// Event products with their date metafield and time-slot variants.
pub const EVENT_PRODUCTS: &str = r#"
query EventProducts($first: Int!, $after: String, $query: String) {
  products(first: $first, after: $after, query: $query, sortKey: ID) {
    pageInfo {
      hasNextPage
      endCursor
    }
    nodes {
      handle
      eventDate: metafield(namespace: "custom", key: "event_date") {
        value
      }
      variants(first: 100) {
        nodes {
          id
          title
          availableForSale
          inventoryQuantity
        }
      }
    }
  }
}
"#;
