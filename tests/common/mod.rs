use anyhow::Result;
use metabox_core::{Field, MetaBox, MetaValue};
use opendal::services::Memory;
use opendal::Operator;

#[allow(dead_code)]
pub fn setup_operator() -> Result<Operator> {
    let _ = env_logger::builder().is_test(true).try_init();
    let builder = Memory::default();
    let op = Operator::new(builder)?.finish();
    Ok(op)
}

#[allow(dead_code)]
pub async fn seed_list(op: &Operator, record_id: &str, key: &str, values: &[&str]) -> Result<()> {
    let values = values.iter().map(|v| v.to_string()).collect();
    metabox_core::storage::write_meta(op, record_id, key, &MetaValue::List(values)).await
}

#[allow(dead_code)]
pub async fn seed_single(op: &Operator, record_id: &str, key: &str, value: &str) -> Result<()> {
    metabox_core::storage::write_meta(op, record_id, key, &MetaValue::Single(value.to_string()))
        .await
}

/// Meta box with one repeatable "address_" group: street + city.
#[allow(dead_code)]
pub fn address_metabox() -> MetaBox {
    let mut metabox = MetaBox::new("Addresses", "locations").unwrap();
    metabox
        .group_fields(
            "address_",
            [
                Field::text("street").placeholder("Street"),
                Field::text("city").placeholder("City"),
            ],
        )
        .unwrap();
    metabox
}
