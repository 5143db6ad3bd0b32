pub mod record;
pub mod schema;
pub mod value;

pub use record::RawRecord;
pub use schema::FeatureSchema;
pub use value::RawValue;
