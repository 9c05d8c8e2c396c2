//! Result Mapper: pair callback deliveries with the scenes they belong to.
//!
//! The remote API reports each generated image with a positional index into
//! the scene list that was submitted. [`PositionalMapper`] applies that rule;
//! the [`ResultMapper`] trait lets callback handling swap it out.

use crate::naming::fallback_stem;
use crate::types::Delivery;

/// A delivery paired with the file stem it should be written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedResult {
    /// Index reported by the delivery.
    pub index: i64,
    pub stem: String,
    pub url: String,
}

/// Strategy for naming delivered images.
pub trait ResultMapper: Send + Sync {
    /// Produce exactly one [`MappedResult`] per delivery, in delivery order.
    fn map(&self, scenes: &[String], deliveries: &[Delivery]) -> Vec<MappedResult>;
}

/// Names each delivery after `scenes[index]`, or
/// `original-image_<index>` when the index is out of range.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalMapper;

impl PositionalMapper {
    fn stem_for(scenes: &[String], index: i64) -> String {
        usize::try_from(index)
            .ok()
            .and_then(|i| scenes.get(i))
            .cloned()
            .unwrap_or_else(|| fallback_stem(index))
    }
}

impl ResultMapper for PositionalMapper {
    fn map(&self, scenes: &[String], deliveries: &[Delivery]) -> Vec<MappedResult> {
        deliveries
            .iter()
            .map(|d| MappedResult {
                index: d.index,
                stem: Self::stem_for(scenes, d.index),
                url: d.url.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn scenes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn stems(out: &[MappedResult]) -> Vec<&str> {
        out.iter().map(|m| m.stem.as_str()).collect()
    }

    #[test]
    fn indices_address_scenes_by_position() {
        let out = PositionalMapper.map(
            &scenes(&["sunset", "forest"]),
            &[Delivery::new(0, "a.png"), Delivery::new(1, "b.png")],
        );
        assert_eq!(stems(&out), ["sunset", "forest"]);
        assert_eq!(out[1].url, "b.png");
    }

    #[test]
    fn out_of_range_index_uses_fallback() {
        let out = PositionalMapper.map(
            &scenes(&["sunset"]),
            &[Delivery::new(0, "a"), Delivery::new(3, "b.webp")],
        );
        assert_eq!(stems(&out), ["sunset", "original-image_3"]);
    }

    #[test]
    fn negative_index_uses_fallback() {
        let out = PositionalMapper.map(&scenes(&["a"]), &[Delivery::new(-1, "x")]);
        assert_eq!(stems(&out), ["original-image_-1"]);
    }

    #[test]
    fn empty_scene_list_falls_back_for_everything() {
        let out = PositionalMapper.map(&[], &[Delivery::new(0, "x"), Delivery::new(1, "y")]);
        assert_eq!(stems(&out), ["original-image_0", "original-image_1"]);
    }

    #[test]
    fn output_follows_delivery_order() {
        let out = PositionalMapper.map(
            &scenes(&["a", "b", "c"]),
            &[
                Delivery::new(2, "2"),
                Delivery::new(0, "0"),
                Delivery::new(1, "1"),
            ],
        );
        assert_eq!(stems(&out), ["c", "a", "b"]);
    }

    #[test]
    fn duplicate_indices_are_not_collapsed() {
        let out = PositionalMapper.map(
            &scenes(&["a"]),
            &[Delivery::new(0, "first"), Delivery::new(0, "second")],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(stems(&out), ["a", "a"]);
    }

    #[test]
    fn unique_indices_give_unique_stems() {
        let scene_list = scenes(&["s0", "s1", "s2"]);
        let deliveries: Vec<_> = (0..8).map(|i| Delivery::new(i, format!("{i}"))).collect();

        let out = PositionalMapper.map(&scene_list, &deliveries);
        assert_eq!(out.len(), deliveries.len());

        let unique: HashSet<_> = out.iter().map(|m| m.stem.clone()).collect();
        assert_eq!(unique.len(), deliveries.len());
    }
}
