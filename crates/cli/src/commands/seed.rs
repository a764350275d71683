//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! - name: Bench vise
//!   description: Cast iron, swivel base
//!   price: "40.00"
//!   stock: 12
//!   sizes:
//!     - name: 4 inch
//!       value: 4in
//!     - name: 6 inch
//!       value: 6in
//! - name: Cross peen hammer
//!   price: "18.50"
//!   stock: 30
//! ```

use std::path::Path;

use tracing::{error, info};

use ironmonger_core::validate_price;
use ironmonger_storefront::models::NewProduct;

use super::{CliError, connect};

/// Check every product before anything is written.
///
/// Returns one message per problem found.
fn validate_products(products: &[NewProduct]) -> Vec<String> {
    let mut errors = Vec::new();
    for (index, product) in products.iter().enumerate() {
        let at = format!("product #{}", index + 1);
        if product.name.trim().is_empty() {
            errors.push(format!("{at}: name must not be empty"));
        }
        if let Err(e) = validate_price("price", product.price) {
            errors.push(format!("{at} ({}): {e}", product.name));
        }
        if product.sizes.iter().any(|size| size.name.trim().is_empty()) {
            errors.push(format!("{at} ({}): size names must not be empty", product.name));
        }
    }
    errors
}

/// Parse products from YAML text.
fn parse_products(content: &str) -> Result<Vec<NewProduct>, CliError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Seed products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any product is
/// invalid, or database operations fail.
pub async fn products(file_path: &str) -> Result<(), CliError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading products from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: file_path.to_owned(),
            source,
        })?;
    let products = parse_products(&content)?;
    info!(products = products.len(), "Parsed catalog");

    let errors = validate_products(&products);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CliError::Invalid(format!(
            "{} validation errors found",
            errors.len()
        )));
    }

    let store = connect().await?;
    for new in &products {
        let product = store.create_product(new).await?;
        info!(
            product_id = %product.id,
            sizes = product.sizes.len(),
            "Created {}",
            product.name
        );
    }

    info!("Seeding complete! Products inserted: {}", products.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
- name: Bench vise
  description: Cast iron, swivel base
  price: "40.00"
  stock: 12
  sizes:
    - name: 4 inch
      value: 4in
    - name: 6 inch
- name: Cross peen hammer
  price: "18.50"
"#;

    #[test]
    fn test_parse_products() {
        let products = parse_products(CATALOG).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].sizes.len(), 2);
        assert_eq!(products[0].sizes[1].value, "");
        assert_eq!(products[1].stock, 0);
        assert!(products[1].description.is_none());
        assert!(validate_products(&products).is_empty());
    }

    #[test]
    fn test_validate_products() {
        let products = parse_products(
            r#"
- name: "  "
  price: "-1"
  sizes:
    - name: ""
"#,
        )
        .unwrap();
        assert_eq!(validate_products(&products).len(), 3);
    }
}
