use log::warn;
use std::collections::BTreeMap;

use artiflow_core::Artifact;

/// Agrupa por span (ascendente). Los artifacts sin span se descartan.
pub(crate) fn group_by_span<'a>(op: &str, input: &'a [Artifact]) -> BTreeMap<i64, Vec<&'a Artifact>> {
    let mut groups: BTreeMap<i64, Vec<&Artifact>> = BTreeMap::new();
    let mut dropped = 0usize;
    for a in input {
        match a.span() {
            Some(span) => groups.entry(span).or_default().push(a),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!("{op}: dropped {dropped} artifacts without span");
    }
    groups
}

/// Últimos `n` elementos; `n < 0` = todos, `n == 0` = ninguno.
pub(crate) fn take_last<T>(items: &[T], n: i64) -> &[T] {
    if n < 0 {
        return items;
    }
    let keep = usize::try_from(n).unwrap_or(usize::MAX).min(items.len());
    &items[items.len() - keep..]
}
