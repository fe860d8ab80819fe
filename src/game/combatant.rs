//! Behaviour shared by servants and enemies

use super::buffs::Buffs;
use super::class::{Attribute, ClassName};
use super::traits::TraitSet;

pub trait Combatant {
    fn name(&self) -> &str;
    fn class_name(&self) -> ClassName;
    fn attribute(&self) -> Attribute;
    fn traits(&self) -> &TraitSet;
    fn traits_mut(&mut self) -> &mut TraitSet;
    fn buffs(&self) -> &Buffs;
    fn buffs_mut(&mut self) -> &mut Buffs;
    fn hp(&self) -> i64;
    fn max_hp(&self) -> i64;

    /// Raw HP write; callers go through [`Combatant::set_hp`]
    fn store_hp(&mut self, hp: i64);

    /// Set HP, clamped to `[0, max_hp]`
    fn set_hp(&mut self, hp: i64) {
        let max = self.max_hp();
        debug_assert!(max >= 0);
        self.store_hp(hp.clamp(0, max.max(0)));
    }

    fn is_alive(&self) -> bool {
        self.hp() > 0
    }

    /// Whether the combatant carries the trait or a buff with it
    fn has_individuality(&self, id: u32) -> bool {
        self.traits().contains(id) || self.buffs().count_by_individuality(id) > 0
    }
}
