//! Layer exclusion by name.

use rustc_hash::FxHashSet;

use super::layer::Layer;

/// Drop layers whose `name` is in `excluded`, keeping the survivors' order.
///
/// Matching is exact on the name, never on the raw class. Offsets and heights
/// of the survivors are left untouched.
pub fn exclude_layers<S: AsRef<str>>(layers: Vec<Layer>, excluded: &[S]) -> Vec<Layer> {
    if excluded.is_empty() {
        return layers;
    }
    let excluded: FxHashSet<&str> = excluded.iter().map(AsRef::as_ref).collect();
    layers
        .into_iter()
        .filter(|layer| !excluded.contains(layer.name.as_str()))
        .collect()
}
