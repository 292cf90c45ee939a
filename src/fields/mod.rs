pub mod allowed;
pub mod defaults;
pub mod included;
pub mod meta;
pub mod registry;
pub mod schema;

pub use included::IncludedFields;
pub use meta::{FieldMeta, MetaFieldAssembler, OperationContext};
pub use registry::{FieldCatalog, FieldDef};
pub use schema::FieldSchema;
