//! Built-in libfunc lowerings

pub mod felt252;
pub mod uint32;

use crate::registry::RegistryBuilder;

/// Register every built-in libfunc
pub fn register_defaults(builder: &mut RegistryBuilder) {
    for def in felt252::definitions() {
        builder.register(def);
    }
    for def in uint32::definitions() {
        builder.register(def);
    }
}
