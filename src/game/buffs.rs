//! Active effect entries
//!
//! Every combatant owns a [`Buffs`] container. Entries keep application
//! order, which only matters for display; the math in
//! [`crate::game::stats`] is order independent.

use serde::{Deserialize, Serialize};

use super::function::Svals;

/// Buff name carried by Aoko's magic bullets
pub const MAGIC_BULLET: &str = "Magic Bullet";
/// Individuality every magic bullet is counted under
pub const MAGIC_BULLET_TRAIT: u32 = 2885;

/// Where a buff came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuffSource {
    Skill,
    Passive,
    User,
    Np,
    System,
    Unknown,
}

/// One active effect on a combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    /// Display name, also the key the stats resolver matches on
    pub name: String,
    /// Upstream buff type (`upAtk`, `upCommandall`, ...), informational
    #[serde(default)]
    pub buff_type: String,
    /// Raw value, per-mille for percentage buffs
    pub value: i64,
    /// Value shown to the user for entries that do not feed the math
    #[serde(default)]
    pub display_value: Option<i64>,
    /// Remaining turns; -1 is permanent
    pub turns: i32,
    /// Remaining uses, when the buff is use-limited
    #[serde(default)]
    pub count: Option<u32>,
    /// Target-trait filter
    #[serde(default)]
    pub tvals: Vec<u32>,
    /// Individualities of the buff itself
    #[serde(default)]
    pub vals: Vec<u32>,
    #[serde(default)]
    pub functvals: Vec<u32>,
    pub source: BuffSource,
    #[serde(default)]
    pub svals: Svals,
    #[serde(default)]
    pub skill_turn: Option<u32>,
}

impl Buff {
    pub fn new(name: impl Into<String>, value: i64, turns: i32) -> Self {
        Self {
            name: name.into(),
            buff_type: String::new(),
            value,
            display_value: None,
            turns,
            count: None,
            tvals: Vec::new(),
            vals: Vec::new(),
            functvals: Vec::new(),
            source: BuffSource::Unknown,
            svals: Svals::default(),
            skill_turn: None,
        }
    }

    /// A permanent entry that is shown but never read by the stats resolver
    pub fn display_only(name: impl Into<String>, display_value: i64, source: BuffSource) -> Self {
        Self {
            display_value: Some(display_value),
            ..Self::new(name, 0, -1).with_source(source)
        }
    }

    pub fn with_source(mut self, source: BuffSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_count(mut self, count: Option<u32>) -> Self {
        self.count = count;
        self
    }

    pub fn with_tvals(mut self, tvals: Vec<u32>) -> Self {
        self.tvals = tvals;
        self
    }

    pub fn with_vals(mut self, vals: Vec<u32>) -> Self {
        self.vals = vals;
        self
    }

    pub fn is_permanent(&self) -> bool {
        self.turns < 0
    }

    /// Whether the entry is shown but ignored by the stats resolver
    pub fn is_display_only(&self) -> bool {
        self.display_value.is_some()
    }

    /// Whether `id` appears in the buff's target traits or its own
    /// individualities
    pub fn has_individuality(&self, id: u32) -> bool {
        self.tvals.contains(&id) || self.vals.contains(&id)
    }
}

/// Summary line for one buff name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuffSummary {
    pub name: String,
    pub entries: usize,
    pub total_value: i64,
    /// Longest remaining duration, -1 if any entry is permanent
    pub turns: i32,
}

/// Ordered collection of active buffs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Buffs {
    entries: Vec<Buff>,
}

impl Buffs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, normalizing its source tag and bullet individuality
    pub fn add(&mut self, mut buff: Buff) {
        if buff.source == BuffSource::Unknown {
            if buff.is_display_only() {
                buff.source = BuffSource::User;
            } else if buff.skill_turn.is_some() {
                buff.source = BuffSource::Skill;
            }
        }

        if buff.name == MAGIC_BULLET && !buff.tvals.contains(&MAGIC_BULLET_TRAIT) {
            buff.tvals.push(MAGIC_BULLET_TRAIT);
        }

        self.entries.push(buff);
    }

    /// Remove the first entry equal to `buff`
    pub fn remove(&mut self, buff: &Buff) -> bool {
        match self.entries.iter().position(|b| b == buff) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// End-of-turn tick: finite entries lose a turn, expired and depleted
    /// entries are dropped
    pub fn decrement(&mut self) {
        for buff in &mut self.entries {
            if buff.turns > 0 {
                buff.turns -= 1;
            }
        }
        self.entries
            .retain(|b| b.turns != 0 && b.count != Some(0));
    }

    /// Count entries whose target traits or individualities include `id`
    pub fn count_by_individuality(&self, id: u32) -> usize {
        self.entries.iter().filter(|b| b.has_individuality(id)).count()
    }

    pub fn count_by_name(&self, name: &str) -> usize {
        self.entries.iter().filter(|b| b.name == name).count()
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|b| b.name == name)
    }

    /// Remove every entry with the given name, returning how many were removed
    pub fn clear_by_name(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|b| b.name != name);
        before - self.entries.len()
    }

    /// Remove up to `limit` entries (all when `None`) matching `pred`, in
    /// application order
    pub fn remove_matching(
        &mut self,
        limit: Option<usize>,
        mut pred: impl FnMut(&Buff) -> bool,
    ) -> usize {
        let limit = limit.unwrap_or(usize::MAX);
        let mut removed = 0;
        self.entries.retain(|b| {
            if removed < limit && pred(b) {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Spend one use of the entry at `idx`. Returns true if the entry was
    /// depleted and removed.
    pub fn consume_at(&mut self, idx: usize) -> bool {
        let Some(buff) = self.entries.get_mut(idx) else {
            return false;
        };
        match buff.count {
            Some(n) if n <= 1 => {
                self.entries.remove(idx);
                true
            }
            Some(n) => {
                buff.count = Some(n - 1);
                false
            }
            None => false,
        }
    }

    /// Entries grouped by name in first-application order
    pub fn grouped_display(&self) -> Vec<BuffSummary> {
        let mut groups: Vec<BuffSummary> = Vec::new();
        for buff in &self.entries {
            let value = buff.display_value.unwrap_or(buff.value);
            match groups.iter_mut().find(|g| g.name == buff.name) {
                Some(group) => {
                    group.entries += 1;
                    group.total_value += value;
                    if group.turns >= 0 && (buff.is_permanent() || buff.turns > group.turns) {
                        group.turns = buff.turns;
                    }
                }
                None => groups.push(BuffSummary {
                    name: buff.name.clone(),
                    entries: 1,
                    total_value: value,
                    turns: buff.turns,
                }),
            }
        }
        groups
    }

    pub fn iter(&self) -> impl Iterator<Item = &Buff> {
        self.entries.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Buff> {
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_drops_expired() {
        let mut buffs = Buffs::new();
        buffs.add(Buff::new("ATK Up", 200, 1));
        buffs.add(Buff::new("Arts Up", 300, 3));
        buffs.add(Buff::new("Territory Creation", 100, -1).with_source(BuffSource::Passive));

        buffs.decrement();
        assert_eq!(buffs.len(), 2);
        assert!(!buffs.has("ATK Up"));
        assert_eq!(buffs.iter().find(|b| b.name == "Arts Up").unwrap().turns, 2);
        assert_eq!(
            buffs.iter().find(|b| b.name == "Territory Creation").unwrap().turns,
            -1
        );
    }

    #[test]
    fn test_magic_bullet_gets_individuality() {
        let mut buffs = Buffs::new();
        buffs.add(Buff::new(MAGIC_BULLET, 0, -1));
        buffs.add(Buff::new(MAGIC_BULLET, 0, -1).with_tvals(vec![MAGIC_BULLET_TRAIT]));
        assert_eq!(buffs.count_by_individuality(MAGIC_BULLET_TRAIT), 2);
        assert!(buffs.iter().all(|b| b.tvals == vec![MAGIC_BULLET_TRAIT]));
    }

    #[test]
    fn test_source_defaults() {
        let mut buffs = Buffs::new();
        buffs.add(Buff::display_only("ATK Up", 100, BuffSource::Unknown));
        let mut from_skill = Buff::new("ATK Up", 100, 3);
        from_skill.skill_turn = Some(1);
        buffs.add(from_skill);
        buffs.add(Buff::new("ATK Up", 100, 3));

        let sources: Vec<BuffSource> = buffs.iter().map(|b| b.source).collect();
        assert_eq!(
            sources,
            vec![BuffSource::User, BuffSource::Skill, BuffSource::Unknown]
        );
    }

    #[test]
    fn test_consume_count() {
        let mut buffs = Buffs::new();
        buffs.add(Buff::new("Buster Up", 500, 3).with_count(Some(2)));
        assert!(!buffs.consume_at(0));
        assert_eq!(buffs.get(0).unwrap().count, Some(1));
        assert!(buffs.consume_at(0));
        assert!(buffs.is_empty());
    }

    #[test]
    fn test_remove_matching_respects_limit() {
        let mut buffs = Buffs::new();
        for _ in 0..12 {
            buffs.add(Buff::new(MAGIC_BULLET, 0, -1));
        }
        let removed = buffs.remove_matching(Some(10), |b| b.name == MAGIC_BULLET);
        assert_eq!(removed, 10);
        assert_eq!(buffs.len(), 2);
    }

    #[test]
    fn test_grouped_display() {
        let mut buffs = Buffs::new();
        buffs.add(Buff::new("ATK Up", 200, 1));
        buffs.add(Buff::new("Arts Up", 300, 3));
        buffs.add(Buff::new("ATK Up", 100, 3));
        buffs.add(Buff::display_only("ATK Up", 150, BuffSource::User));

        let groups = buffs.grouped_display();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "ATK Up");
        assert_eq!(groups[0].entries, 3);
        assert_eq!(groups[0].total_value, 450);
        assert_eq!(groups[0].turns, -1);
    }

    #[test]
    fn test_clear_and_remove() {
        let mut buffs = Buffs::new();
        let atk = Buff::new("ATK Up", 200, 1);
        buffs.add(atk.clone());
        buffs.add(Buff::new("DEF Up", 200, 1));
        assert!(buffs.remove(&atk));
        assert!(!buffs.remove(&atk));
        assert_eq!(buffs.clear_by_name("DEF Up"), 1);
        assert!(buffs.is_empty());
    }
}
