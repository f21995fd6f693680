use crate::model::item::Item;

/// Recompute every node's hierarchical number after a structural mutation.
///
/// Single depth-first pre-order pass: the item at 0-based position `idx`
/// under prefix `p` gets `hns = "p.{idx+1}"`. Numbering is purely
/// positional and carries no identity — moving an item renumbers it, every
/// later sibling, and all of their descendants.
///
/// Idempotent: a second call without an intervening structural change
/// produces identical values. Runs synchronously to completion; callers
/// hold the renumber gate so no mutation can interleave.
pub fn renumber(items: &mut [Item]) {
    let mut prefix = Vec::new();
    renumber_level(items, &mut prefix);
}

fn renumber_level(items: &mut [Item], prefix: &mut Vec<usize>) {
    for (idx, item) in items.iter_mut().enumerate() {
        prefix.push(idx + 1);
        item.hns = join_segments(prefix);
        if let Some(children) = item.children.as_deref_mut() {
            renumber_level(children, prefix);
        }
        prefix.pop();
    }
}

fn join_segments(segments: &[usize]) -> String {
    let mut out = String::new();
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(&seg.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::path::for_each_with_path;

    fn sample_items() -> Vec<Item> {
        let mut a = Item::new("a");
        let mut a2 = Item::new("a2");
        a2.children_mut().push(Item::new("a2x"));
        a.children_mut().push(Item::new("a1"));
        a.children_mut().push(a2);
        vec![a, Item::new("b")]
    }

    #[test]
    fn hns_equals_dot_joined_path_for_every_node() {
        let mut items = sample_items();
        renumber(&mut items);
        for_each_with_path(&items, &mut |path, item| {
            assert_eq!(item.hns, path.to_string());
        });
    }

    #[test]
    fn renumber_is_idempotent() {
        let mut items = sample_items();
        renumber(&mut items);
        let first = items.clone();
        renumber(&mut items);
        assert_eq!(items, first);
    }

    #[test]
    fn renumber_overwrites_stale_numbers() {
        let mut items = sample_items();
        renumber(&mut items);
        // Reorder the roots; old numbers are stale until the next pass
        items.swap(0, 1);
        renumber(&mut items);
        assert_eq!(items[0].label, "b");
        assert_eq!(items[0].hns, "1");
        assert_eq!(items[1].hns, "2");
        assert_eq!(items[1].children()[1].children()[0].hns, "2.2.1");
    }

    #[test]
    fn absent_children_arrays_are_left_absent() {
        let mut items = sample_items();
        items[1].children = None;
        renumber(&mut items);
        assert!(items[1].children.is_none());
        assert_eq!(items[1].hns, "2");
    }
}
