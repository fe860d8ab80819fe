//! Test documents
//!
//! Small servant, quest and mystic code documents in the store's JSON
//! shape. Numbers are picked so damage and refund come out round.

use serde_json::{json, Value};

use super::raw::RawServant;
use super::MemoryStore;

/// Three waves: 3 x 8000 HP, 3 x 15000 HP, 1 x 25000 HP, all saber/earth
pub const THREE_WAVE_QUEST: u32 = 94_000_001;
/// One saber/man enemy with a lot of HP
pub const REGRESSION_QUEST: u32 = 94_000_002;
pub const REGRESSION_ENEMY_HP: i64 = 100_000;

/// Class trait carried by the saber fixture only
pub const TRAIT_SABER_CLASS: u32 = 100;
const TRAIT_CASTER_CLASS: u32 = 104;
const TRAIT_ARCHER_CLASS: u32 = 102;
const TRAIT_SHIELDER_CLASS: u32 = 107;

const ARTS: u32 = 4001;
const BUSTER: u32 = 4002;

pub fn store() -> MemoryStore {
    MemoryStore::new()
        .with_servant(1, shielder_with_costumes())
        .with_servant(3, saber_arts())
        .with_servant(37, self_sacrifice())
        .with_servant(314, caster_support())
        .with_servant(316, np_battery())
        .with_servant(413, aoko())
        .with_servant(414, caster_buffer())
        .with_servant(1001, regression_archer())
        .with_servant(4132, super_aoko())
        .with_quest(THREE_WAVE_QUEST, three_wave_quest())
        .with_quest(REGRESSION_QUEST, regression_quest())
        .with_mystic_code(210, combat_uniform())
        .with_mystic_code(260, order_change_uniform())
}

pub fn raw_servant(doc: Value) -> RawServant {
    serde_json::from_value(super::unwrap_envelopes(doc)).unwrap()
}

fn traits(ids: &[(u32, &str)]) -> Value {
    ids.iter()
        .map(|(id, name)| json!({"id": id, "name": name}))
        .collect()
}

/// Ten identical level rows
fn levels(row: Value) -> Vec<Value> {
    vec![row; 10]
}

/// Cooldown table ending at `cooldown` on level 10
fn cooldowns(cooldown: u32) -> Vec<u32> {
    (0..10)
        .map(|lv| match lv {
            0..=5 => cooldown + 2,
            6..=8 => cooldown + 1,
            _ => cooldown,
        })
        .collect()
}

fn skill(id: u32, num: u32, name: &str, cooldown: u32, functions: Vec<Value>) -> Value {
    json!({
        "id": id,
        "num": num,
        "name": name,
        "priority": 0,
        "coolDown": cooldowns(cooldown),
        "releaseConditions": [],
        "functions": functions,
    })
}

fn gain_np(target: &str, value: i64) -> Value {
    json!({
        "funcId": 464,
        "funcType": "gainNp",
        "funcTargetType": target,
        "svals": levels(json!({"Rate": 1000, "Value": value})),
    })
}

fn add_state(
    target: &str,
    name: &str,
    buff_type: &str,
    tvals: &[u32],
    value: i64,
    turns: i64,
) -> Value {
    let tvals: Vec<Value> = tvals.iter().map(|id| json!({"id": id})).collect();
    json!({
        "funcId": 146,
        "funcType": "addState",
        "funcTargetType": target,
        "buffs": [{"name": name, "type": buff_type, "vals": [], "tvals": tvals}],
        "svals": levels(json!({"Rate": 1000, "Turn": turns, "Count": -1, "Value": value})),
    })
}

fn passive(name: &str, functions: Vec<Value>) -> Value {
    json!({"id": 30000, "num": 1, "name": name, "coolDown": [0], "functions": functions})
}

/// NP damage function with one `svals` row per NP level
fn damage_np(func_type: &str, target: &str, rows: Vec<Value>) -> Value {
    json!({
        "funcId": 3,
        "funcType": func_type,
        "funcTargetType": target,
        "svals": rows,
    })
}

fn np(
    id: u32,
    name: &str,
    card: &str,
    gain: u32,
    distribution: &[u32],
    functions: Vec<Value>,
) -> Value {
    json!({
        "id": id,
        "num": 1,
        "name": name,
        "card": card,
        "priority": 0,
        "npDistribution": distribution,
        "npGain": {"np": vec![gain; 5]},
        "releaseConditions": [],
        "functions": functions,
    })
}

/// 314: Arts caster with battery skills and an Arts AoE NP
pub fn caster_support() -> Value {
    json!({
        "id": 504500,
        "collectionNo": 314,
        "name": "Altria Caster",
        "className": "caster",
        "classId": 5,
        "attribute": "earth",
        "rarity": 5,
        "atkGrowth": vec![11000; 120],
        "hpGrowth": vec![14000; 120],
        "traits": traits(&[(TRAIT_CASTER_CLASS, "classCaster"), (2000, "humanoid")]),
        "cards": ["quick", "arts", "arts", "arts", "buster"],
        "skills": [
            skill(888550, 1, "Mana Transfer", 5, vec![gain_np("ptOne", 5000)]),
            skill(888575, 2, "Brilliant Knight", 6, vec![
                gain_np("ptAll", 2000),
                add_state("ptAll", "ATK Up", "upAtk", &[], 200, 3),
            ]),
            skill(888576, 3, "Avalon's Blessing", 6, vec![
                add_state("ptOne", "Arts Up", "upCommandall", &[ARTS], 300, 3),
                gain_np("ptOne", 3000),
            ]),
        ],
        "noblePhantasms": [
            np(504501, "Utopia Eternal", "arts", 60, &[16, 33, 51], vec![
                damage_np("damageNp", "enemyAll", (0..5).map(|_| json!({"Value": 4500})).collect()),
            ]),
        ],
        "classPassive": [
            passive("Magic Resistance", vec![
                add_state("self", "Debuff Resist Up", "upToleranceSubstate", &[], 200, -1),
            ]),
        ],
    })
}

/// 3: Arts saber with a self-sufficient kit
pub fn saber_arts() -> Value {
    json!({
        "id": 100300,
        "collectionNo": 3,
        "name": "Altria Pendragon (Lily)",
        "className": "saber",
        "classId": 1,
        "attribute": "earth",
        "rarity": 4,
        "atkGrowth": vec![10000; 120],
        "hpGrowth": vec![12000; 120],
        "traits": traits(&[(TRAIT_SABER_CLASS, "classSaber"), (2000, "humanoid")]),
        "cards": ["quick", "arts", "arts", "buster", "buster"],
        "skills": [
            skill(100301, 1, "Instinct", 6, vec![add_state("self", "ATK Up", "upAtk", &[], 200, 3)]),
            skill(100302, 2, "Mana Burst", 7, vec![gain_np("self", 2000)]),
            skill(100303, 3, "Journey of the Flowers", 7, vec![
                add_state("self", "NP Gain Up", "upDropnp", &[], 300, 1),
            ]),
        ],
        "noblePhantasms": [
            np(100301, "Caliburn", "arts", 40, &[16, 33, 51], vec![
                damage_np(
                    "damageNp",
                    "enemyAll",
                    [4000, 4250, 4500, 4750, 5000].iter().map(|v| json!({"Value": v})).collect(),
                ),
            ]),
        ],
        "classPassive": [],
    })
}

fn aoko_skills(first_cooldown: u32) -> Value {
    let bullet = || add_state("self", "Magic Bullet", "donotAct", &[], 0, -1);
    json!([
        skill(413001, 1, "Magic Circuit", first_cooldown, vec![gain_np("ptOne", 3000)]),
        skill(413002, 2, "Magic Bullet Load", 7, vec![bullet(), bullet(), bullet()]),
        skill(413003, 3, "Sky Walker", 7, vec![gain_np("ptOne", 2000)]),
    ])
}

fn aoko_np(id: u32, transforms: bool) -> Value {
    // Same value at every NP level, rising with overcharge
    let by_oc = |value: i64| vec![json!({"Turn": 1, "Count": -1, "Value": value}); 5];
    let buster_up = json!({
        "funcId": 146,
        "funcType": "addState",
        "funcTargetType": "self",
        "buffs": [{"name": "Buster Up", "type": "upCommandall", "vals": [], "tvals": [{"id": BUSTER}]}],
        "svals": by_oc(200),
        "svals2": by_oc(250),
        "svals3": by_oc(300),
        "svals4": by_oc(350),
        "svals5": by_oc(400),
    });
    let damage = damage_np(
        "damageNpIndividualSum",
        "enemyAll",
        [4500, 5250, 6000, 6750, 7500]
            .iter()
            .map(|v| {
                json!({
                    "Value": v, "Correction": 100, "Value2": 1000,
                    "TargetList": [2885], "Target": 0, "ParamAddMaxCount": 10,
                })
            })
            .collect(),
    );
    let mut functions = vec![buster_up, damage];
    if transforms {
        functions.push(json!({
            "funcId": 5000,
            "funcType": "transformServant",
            "funcTargetType": "self",
            "svals": vec![json!({"Value": 4132}); 5],
        }));
    }
    np(id, "Game Over", "buster", 80, &[10, 20, 30, 40], functions)
}

/// 413: transforms after her NP and scales damage with magic bullets
pub fn aoko() -> Value {
    json!({
        "id": 413000,
        "collectionNo": 413,
        "name": "Aoko Aozaki",
        "className": "caster",
        "classId": 5,
        "attribute": "star",
        "rarity": 5,
        "atkGrowth": vec![11000; 120],
        "hpGrowth": vec![13000; 120],
        "traits": traits(&[(TRAIT_CASTER_CLASS, "classCaster"), (2000, "humanoid")]),
        "cards": ["quick", "arts", "buster", "buster", "buster"],
        "skills": aoko_skills(6),
        "noblePhantasms": [aoko_np(413001, true)],
        "classPassive": [
            passive("Territory Creation", vec![
                add_state("self", "Debuff Resist Up", "upToleranceSubstate", &[], 100, -1),
            ]),
        ],
    })
}

/// 4132: Aoko's transformed form, loaded with bullets every turn
pub fn super_aoko() -> Value {
    json!({
        "id": 413200,
        "collectionNo": 4132,
        "name": "Super Aoko Aozaki",
        "className": "caster",
        "classId": 5,
        "attribute": "star",
        "rarity": 5,
        "atkGrowth": vec![12000; 120],
        "hpGrowth": vec![13000; 120],
        "traits": traits(&[(TRAIT_CASTER_CLASS, "classCaster"), (2000, "humanoid")]),
        "cards": ["quick", "arts", "buster", "buster", "buster"],
        "skills": aoko_skills(7),
        "noblePhantasms": [aoko_np(413201, false)],
        "classPassive": [],
    })
}

/// 414: party ATK and gauge support, non-damaging NP
pub fn caster_buffer() -> Value {
    let np_strength: Vec<Value> = [400, 450, 500, 550, 600]
        .iter()
        .map(|v| json!({"Turn": 1, "Count": -1, "Value": v}))
        .collect();
    json!({
        "id": 504700,
        "collectionNo": 414,
        "name": "Oberon",
        "className": "caster",
        "classId": 5,
        "attribute": "earth",
        "rarity": 5,
        "atkGrowth": vec![9500; 120],
        "hpGrowth": vec![14000; 120],
        "traits": traits(&[(TRAIT_CASTER_CLASS, "classCaster")]),
        "cards": ["quick", "arts", "buster", "buster", "buster"],
        "skills": [
            skill(414001, 1, "Morning Lark", 5, vec![add_state("ptAll", "ATK Up", "upAtk", &[], 200, 3)]),
            skill(414002, 2, "Night's Nightingale", 6, vec![gain_np("ptOne", 3000)]),
            skill(414003, 3, "Beginning of the Dream", 8, vec![gain_np("ptOne", 5000)]),
        ],
        "noblePhantasms": [
            np(414001, "Lilliput Noctiluca", "buster", 0, &[], vec![
                json!({
                    "funcId": 146,
                    "funcType": "addState",
                    "funcTargetType": "ptAll",
                    "buffs": [{"name": "NP Strength Up", "type": "upNpdamage", "vals": [], "tvals": []}],
                    "svals": np_strength,
                }),
            ]),
        ],
        "classPassive": [],
    })
}

/// 316: party battery with a gauge-over-time NP
pub fn np_battery() -> Value {
    json!({
        "id": 504600,
        "collectionNo": 316,
        "name": "Koyanskaya of Light",
        "className": "assassin",
        "classId": 6,
        "attribute": "earth",
        "rarity": 5,
        "atkGrowth": vec![10000; 120],
        "hpGrowth": vec![13000; 120],
        "traits": traits(&[(105, "classAssassin")]),
        "cards": ["quick", "quick", "arts", "buster", "buster"],
        "skills": [
            skill(316001, 1, "Corporate Reach", 6, vec![gain_np("ptAll", 2000)]),
            skill(316002, 2, "Beast Nature", 7, vec![gain_np("ptOne", 3000)]),
            skill(316003, 3, "Tamamo Vitch", 8, vec![gain_np("ptOne", 5000)]),
        ],
        "noblePhantasms": [
            np(316001, "Seven-Color Tamamo", "quick", 0, &[], vec![
                json!({
                    "funcId": 146,
                    "funcType": "addState",
                    "funcTargetType": "ptAll",
                    "buffs": [{"name": "NP Gain Each Turn", "type": "regainNp", "vals": [], "tvals": []}],
                    "svals": vec![json!({"Turn": 3, "Count": -1, "Value": 500}); 5],
                }),
            ]),
        ],
        "classPassive": [],
    })
}

/// 37: dies at the end of the turn it uses its first skill
pub fn self_sacrifice() -> Value {
    json!({
        "id": 201300,
        "collectionNo": 37,
        "name": "Arash",
        "className": "archer",
        "classId": 2,
        "attribute": "earth",
        "rarity": 1,
        "atkGrowth": vec![6000; 120],
        "hpGrowth": vec![8000; 120],
        "traits": traits(&[(TRAIT_ARCHER_CLASS, "classArcher"), (2000, "humanoid")]),
        "cards": ["quick", "arts", "arts", "buster", "buster"],
        "skills": [
            skill(37001, 1, "Last Stand", 8, vec![
                add_state("self", "Delayed Effect (Death)", "delayFunction", &[], 0, 1),
            ]),
            skill(37002, 2, "Arrow of Ending", 8, vec![json!({
                "funcId": 600,
                "funcType": "instantDeath",
                "funcTargetType": "enemy",
                "svals": levels(json!({"Rate": 1000})),
            })]),
            skill(37003, 3, "Clairvoyance", 7, vec![gain_np("self", 1000)]),
        ],
        "noblePhantasms": [
            np(37001, "Stella", "buster", 50, &[100], vec![
                damage_np("damageNp", "enemyAll", (0..5).map(|_| json!({"Value": 8000})).collect()),
            ]),
        ],
        "classPassive": [],
    })
}

/// 1001: single-target Arts archer used for the damage regression
pub fn regression_archer() -> Value {
    json!({
        "id": 110100,
        "collectionNo": 1001,
        "name": "Regression Archer",
        "className": "archer",
        "classId": 2,
        "attribute": "sky",
        "rarity": 5,
        "atkGrowth": vec![9000; 120],
        "hpGrowth": vec![12000; 120],
        "traits": traits(&[(TRAIT_ARCHER_CLASS, "classArcher")]),
        "cards": ["quick", "arts", "arts", "buster", "buster"],
        "skills": [],
        "noblePhantasms": [
            np(110101, "Single Shot", "arts", 50, &[100], vec![
                damage_np("damageNp", "enemy", (0..5).map(|_| json!({"Value": 3000})).collect()),
            ]),
        ],
        "classPassive": [],
    })
}

/// 1: Mash, with ascension blocks, costume skill variants and an NP that
/// changes at ascension 3
pub fn shielder_with_costumes() -> Value {
    let with_svt = |mut skill: Value, svt_id: u32| {
        skill["svtId"] = json!(svt_id);
        skill
    };
    let guard = || add_state("ptAll", "DEF Up", "upDefence", &[], 300, 3);
    let chaldeas = np(800100, "Lord Chaldeas", "arts", 0, &[], vec![guard()]);
    let mut camelot = np(800104, "Lord Camelot", "arts", 0, &[], vec![guard()]);
    camelot["priority"] = json!(1);
    camelot["releaseConditions"] = json!([{"condType": "limitCount", "condNum": 3, "condGroup": 1}]);

    json!({
        "id": 800100,
        "collectionNo": 1,
        "name": "Mash Kyrielight",
        "className": "shielder",
        "classId": 8,
        "attribute": "earth",
        "rarity": 4,
        "atkGrowth": vec![8700; 120],
        "hpGrowth": vec![12000; 120],
        "traits": traits(&[(TRAIT_SHIELDER_CLASS, "classShielder"), (2000, "humanoid")]),
        "cards": ["quick", "arts", "buster", "buster", "buster"],
        "skills": {
            "1": [
                with_svt(skill(1000, 1, "Honorable Shield", 7, vec![guard()]), 800100),
                with_svt(skill(1001, 1, "Black Barrel", 7, vec![guard()]), 800101),
                with_svt(skill(1002, 1, "Kenzoku no Tate", 7, vec![guard()]), 800102),
                with_svt(skill(1010, 2, "Transient Wall", 7, vec![guard()]), 800100),
                with_svt(skill(1020, 3, "Obscurant Wall of Chalk", 8, vec![gain_np("ptOne", 1000)]), 800100),
            ],
        },
        "noblePhantasms": [chaldeas, camelot],
        "classPassive": [
            passive("Magic Resistance", vec![
                add_state("self", "Debuff Resist Up", "upToleranceSubstate", &[], 250, -1),
            ]),
        ],
        "ascensionAdd": {
            "individuality": {
                "ascension": {
                    "1": traits(&[(8001, "")]),
                    "2": traits(&[(8002, "")]),
                    "3": traits(&[(8003, "")]),
                    "4": traits(&[(8004, "")]),
                },
                "costume": {
                    "800102": traits(&[(9001, "")]),
                },
            },
        },
    })
}

fn flat_enemy(name: &str, hp: i64) -> Value {
    json!({
        "name": name,
        "className": "saber",
        "attribute": "earth",
        "hp": hp,
        "deathRate": 500,
        "traits": traits(&[(TRAIT_SABER_CLASS, "classSaber"), (2000, "humanoid")]),
    })
}

fn three_wave_quest() -> Value {
    json!({
        "id": THREE_WAVE_QUEST,
        "individuality": traits(&[(2038, "fieldSunlight")]),
        "stages": [
            {"enemies": [flat_enemy("Knight A", 8000), flat_enemy("Knight B", 8000), flat_enemy("Knight C", 8000)]},
            {
                "enemies": [flat_enemy("Guard A", 15000), flat_enemy("Guard B", 15000), flat_enemy("Guard C", 15000)],
                "individuality": traits(&[(2039, "fieldForest")]),
            },
            {"enemies": [flat_enemy("Captain", 25000)]},
        ],
    })
}

fn regression_quest() -> Value {
    json!({
        "id": REGRESSION_QUEST,
        "individuality": [],
        "stages": [{
            "enemies": [{
                "hp": {"$numberInt": REGRESSION_ENEMY_HP.to_string()},
                "deathRate": 0,
                "svt": {
                    "id": 9001,
                    "name": "Training Dummy",
                    "className": "saber",
                    "attribute": "human",
                    "traits": traits(&[(TRAIT_SABER_CLASS, "classSaber")]),
                },
            }],
        }],
    })
}

/// 210: party ATK, single battery, single Arts Up
fn combat_uniform() -> Value {
    json!({
        "id": 210,
        "name": "Chaldea Combat Uniform",
        "skills": [
            {"id": 2101, "num": 1, "name": "Full Power", "coolDown": [15], "functions": [
                add_state("ptAll", "ATK Up", "upAtk", &[], 200, 1),
            ]},
            {"id": 2102, "num": 2, "name": "Mana Charge", "coolDown": [12], "functions": [
                gain_np("ptOne", 2000),
            ]},
            {"id": 2103, "num": 3, "name": "Arts Focus", "coolDown": [10], "functions": [
                add_state("ptOne", "Arts Up", "upCommandall", &[ARTS], 500, 1),
            ]},
        ],
    })
}

/// 260: third skill is Order Change, stored without a cooldown table
fn order_change_uniform() -> Value {
    json!({
        "id": 260,
        "name": "Chaldea Combat Uniform (Order Change)",
        "skills": [
            {"id": 2601, "num": 1, "name": "Gandr", "coolDown": [12], "functions": [
                add_state("enemy", "Stun", "donotAct", &[], 0, 1),
            ]},
            {"id": 2602, "num": 2, "name": "Instant Reinforcement", "coolDown": [12], "functions": [
                add_state("ptOne", "ATK Up", "upAtk", &[], 500, 1),
            ]},
            {"id": 2603, "num": 3, "name": "Order Change", "coolDown": [], "functions": [
                {"funcId": 460, "funcType": "replaceMember", "funcTargetType": "ptselectSub", "svals": [{}]},
            ]},
        ],
    })
}
