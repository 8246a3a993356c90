use crate::function::Function;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Functions by lower-cased name.
pub type Registry = DashMap<String, Arc<dyn Function>>;

static REG: Lazy<Registry> = Lazy::new(|| {
    let reg = DashMap::new();
    crate::builtins::install(&reg);
    reg
});

/// Add or replace a function.
pub fn register(f: Arc<dyn Function>) {
    let name = f.name().to_lowercase();
    #[cfg(feature = "tracing")]
    tracing::trace!(name = %name, "registered function");
    REG.insert(name, f);
}

/// Case-insensitive lookup.
pub fn get(name: &str) -> Option<Arc<dyn Function>> {
    REG.get(name)
        .or_else(|| REG.get(name.to_lowercase().as_str()))
        .map(|v| Arc::clone(v.value()))
}

pub fn is_registered(name: &str) -> bool {
    REG.contains_key(name.to_lowercase().as_str())
}
