//! Collection settings.
//!
//! Settings come from an optional YAML file and can be overridden through
//! `PROJECT_COLLECTOR_*` environment variables.

mod collection_config;
mod env_vars;

pub use collection_config::{
    CollectionConfig,
    load_or_create_config,
};

pub use env_vars::{
    apply_env_overrides,
    expand_env_vars,
};
