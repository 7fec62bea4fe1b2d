//! Sample star schema used by the binary when no seed is configured

use super::error::ModelResult;
use super::ids::TableId;
use super::layout::LayoutConfig;
use super::measures::MeasureRegistry;
use super::mutator::SchemaMutator;
use super::schema::{DataType, Relationship, RelationshipType};
use super::store::ModelStore;

/// Sales fact table with Products and Customers dimensions
pub fn create_demo_model(layout: LayoutConfig) -> ModelResult<ModelStore> {
    let mut store = ModelStore::with_layout(layout);

    let sales = store.create_table("Sales")?.id;
    store.set_fact_table(sales, true)?;
    store.create_field(sales, "SaleID", DataType::Number)?;
    let sale_product = store.create_field(sales, "ProductID", DataType::Number)?.id;
    let sale_customer = store.create_field(sales, "CustomerID", DataType::Number)?.id;
    store.create_field(sales, "OrderDate", DataType::Date)?;
    store.create_field(sales, "Quantity", DataType::Number)?;
    store.create_field(sales, "UnitPrice", DataType::Number)?;
    store.add_calculated_column(sales, "TotalAmount", "Sales[Quantity] * Sales[UnitPrice]")?;

    let products = store.create_table("Products")?.id;
    let product_id = store.create_field(products, "ProductID", DataType::Number)?.id;
    store.create_field(products, "Name", DataType::Text)?;
    store.create_field(products, "Category", DataType::Text)?;
    store.create_field(products, "Cost", DataType::Number)?;

    let customers = store.create_table("Customers")?.id;
    let customer_id = store.create_field(customers, "CustomerID", DataType::Number)?.id;
    store.create_field(customers, "Name", DataType::Text)?;
    store.create_field(customers, "Region", DataType::Text)?;

    mark_keys(&mut store, &[(sales, 0), (products, 0), (customers, 0)], true)?;
    mark_keys(&mut store, &[(sales, 1), (sales, 2)], false)?;

    store.add_relationship(
        Relationship::new(products, product_id, sales, sale_product)
            .with_type(RelationshipType::OneToMany),
    )?;
    store.add_relationship(
        Relationship::new(customers, customer_id, sales, sale_customer)
            .with_type(RelationshipType::OneToMany),
    )?;

    store.create_measure(sales, "Total Sales", "SUM(Sales[TotalAmount])", Some("#,##0.00"))?;

    tracing::info!("Created demo model with {} tables", store.table_count());
    Ok(store)
}

fn mark_keys(
    store: &mut ModelStore,
    fields: &[(TableId, usize)],
    primary: bool,
) -> ModelResult<()> {
    for &(table, index) in fields {
        let table = store.table_mut(table)?;
        if let Some(field) = table.fields.get_mut(index) {
            if primary {
                field.is_primary_key = true;
            } else {
                field.is_foreign_key = true;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::validate;

    #[test]
    fn test_demo_model_shape() {
        let store = create_demo_model(LayoutConfig::default()).unwrap();

        assert_eq!(store.table_count(), 3);
        let sales = store.find_table_by_name("Sales").unwrap();
        assert!(sales.is_fact_table);
        assert_eq!(sales.primary_key().unwrap().name, "SaleID");
        assert!(sales.fields[1].is_foreign_key);

        let products = store.find_table_by_name("Products").unwrap();
        assert!(!products.is_fact_table);
        assert_eq!(products.primary_key().unwrap().name, "ProductID");

        assert_eq!(store.relationships_for_table(sales.id).len(), 2);
        assert_eq!(store.get_measures().len(), 1);
    }

    #[test]
    fn test_demo_model_is_clean() {
        let store = create_demo_model(LayoutConfig::default()).unwrap();
        let report = validate(&store);
        assert!(report.is_clean(), "{:?}", report.messages());
    }
}
