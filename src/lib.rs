//! FGO Sim - turn-based Fate/Grand Order combat simulator
//!
//! This library replays command scripts against a team, a quest and a
//! mystic code, reporting whether the script clears every wave. It
//! provides the combat data model, the skill/NP/turn engines, the token
//! language and the data contract the documents are loaded through.
//!
//! ## Determinism
//!
//! The only random input is the damage roll, configured through
//! [`config::Settings`]. With the default fixed roll two runs of the same
//! script produce identical states.

pub mod config;
pub mod data;
pub mod engine;
pub mod game;
pub mod script;

use std::sync::Arc;

use serde::Serialize;

use crate::config::{Settings, TeamConfig};
use crate::data::{DataError, DataStore};
use crate::engine::{CombatEngine, TurnOutcome};
use crate::game::state::{DamageEvent, GameState};
use crate::script::Command;

/// Most servants a party can hold
pub const MAX_PARTY: usize = 5;

/// Construction failures
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("The team has no servants")]
    EmptyTeam,
    #[error("A team holds at most {MAX_PARTY} servants, got {0}")]
    TooManyServants(usize),
    #[error("No servant at party index {0}")]
    NoServant(usize),
}

/// Outcome of a script run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub succeeded: bool,
    /// Accepted tokens, in order
    pub trace: Vec<String>,
    pub damage: Vec<DamageEvent>,
    /// Accepted end-of-turn tokens
    pub turns: u32,
}

impl RunReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One simulation run: a team against a quest, driven by tokens
#[derive(Clone)]
pub struct Simulator {
    store: Arc<dyn DataStore>,
    team: TeamConfig,
    quest_id: u32,
    mystic_code_id: u32,
    settings: Settings,
    engine: CombatEngine,
    state: GameState,
    trace: Vec<String>,
    run_succeeded: bool,
}

impl Simulator {
    /// Create a new simulator and build its initial state
    pub fn new(
        store: Arc<dyn DataStore>,
        team: TeamConfig,
        quest_id: u32,
        mystic_code_id: u32,
        settings: Settings,
    ) -> Result<Self, SimError> {
        match team.servants.len() {
            0 => return Err(SimError::EmptyTeam),
            n if n > MAX_PARTY => return Err(SimError::TooManyServants(n)),
            _ => {}
        }
        let state = GameState::build(store.as_ref(), &team, quest_id, mystic_code_id)?;
        let engine = CombatEngine::from_settings(&settings);
        Ok(Self {
            store,
            team,
            quest_id,
            mystic_code_id,
            settings,
            engine,
            state,
            trace: Vec::new(),
            run_succeeded: false,
        })
    }

    /// Rebuild every entity from the store and forget the trace
    pub fn reset_state(&mut self) -> Result<(), SimError> {
        self.state = GameState::build(
            self.store.as_ref(),
            &self.team,
            self.quest_id,
            self.mystic_code_id,
        )?;
        self.engine = CombatEngine::from_settings(&self.settings);
        self.trace.clear();
        self.run_succeeded = false;
        Ok(())
    }

    /// Execute one token. Returns false when it is rejected.
    ///
    /// Unparseable tokens are skipped with a warning unless the settings
    /// ask to treat them as rejected.
    pub fn execute_token(&mut self, token: &str) -> bool {
        let command = match Command::parse(token) {
            Ok(command) => command,
            Err(e) if self.settings.halt_on_unknown_token => {
                log::error!("{}", e);
                return false;
            }
            Err(e) => {
                log::warn!("{}, skipping", e);
                return true;
            }
        };

        match script::execute(&mut self.engine, &mut self.state, command) {
            Ok(outcome) => {
                self.trace.push(command.to_string());
                if outcome == Some(TurnOutcome::Cleared) {
                    self.run_succeeded = true;
                }
                true
            }
            Err(e) => {
                log::error!("Token {} rejected: {}", token, e);
                false
            }
        }
    }

    /// Execute a whitespace-separated script from the current state
    pub fn run_script(&mut self, script: &str) -> RunReport {
        for token in script::tokenize(script) {
            if !self.execute_token(token) && self.settings.halt_on_failure {
                break;
            }
        }
        if !self.run_succeeded {
            log::info!(
                "Script ended on wave {}/{} without clearing the quest",
                self.state.wave,
                self.state.total_waves()
            );
        }
        self.report()
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            succeeded: self.run_succeeded,
            trace: self.trace.clone(),
            damage: self.state.damage_log.clone(),
            turns: self.trace.iter().filter(|t| *t == "#").count() as u32,
        }
    }

    /// Switch a party member's ascension and costume
    pub fn change_ascension(
        &mut self,
        idx: usize,
        ascension: u8,
        costume: Option<u32>,
    ) -> Result<(), SimError> {
        let servant = self
            .state
            .servants
            .get_mut(idx)
            .ok_or(SimError::NoServant(idx))?;
        servant.change_ascension(ascension, costume)?;
        Ok(())
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn run_succeeded(&self) -> bool {
        self.run_succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServantConfig;
    use crate::data::fixtures;
    use crate::game::buffs::BuffSource;

    fn simulator(team: Vec<ServantConfig>, mc: u32) -> Simulator {
        Simulator::new(
            Arc::new(fixtures::store()),
            TeamConfig::new(team),
            fixtures::THREE_WAVE_QUEST,
            mc,
            Settings::default(),
        )
        .unwrap()
    }

    /// Run tokens until the first `#`, asserting each is accepted
    fn play_turn(sim: &mut Simulator, tokens: &str) {
        for token in tokens.split_whitespace() {
            assert!(sim.execute_token(token), "token {} rejected", token);
        }
    }

    #[test]
    fn test_construction_errors() {
        let store: Arc<dyn DataStore> = Arc::new(fixtures::store());
        let build = |ids: &[u32]| {
            Simulator::new(
                store.clone(),
                TeamConfig::from_ids(ids),
                fixtures::THREE_WAVE_QUEST,
                210,
                Settings::default(),
            )
        };
        assert!(matches!(build(&[]), Err(SimError::EmptyTeam)));
        assert!(matches!(
            build(&[314; 6]),
            Err(SimError::TooManyServants(6))
        ));
        assert!(build(&[314; 5]).is_ok());
        assert!(matches!(
            build(&[999]),
            Err(SimError::Data(DataError::ServantNotFound(999)))
        ));
    }

    #[test]
    fn test_castoria_charge_script() {
        let mut sim = simulator(
            vec![
                ServantConfig::new(314),
                ServantConfig::new(314),
                ServantConfig::new(413).with_charge(20.0),
                ServantConfig::new(414).with_np_level(5),
                ServantConfig::new(316),
            ],
            210,
        );
        let report = sim.run_script("a c1 f1 i1 4 # d1 g1 x31 4 # b g h1 i1 j 4 #");
        assert!(report.succeeded);
        assert!(sim.run_succeeded());
        assert_eq!(report.trace.len(), 18);
        assert_eq!(report.turns, 3);
        assert!(sim.state().finished);
        // 413 was swapped out before ever firing
        assert_eq!(sim.state().servants[3].id, 413);
    }

    #[test]
    fn test_wave_gauge_audit() {
        let mods = config::UserMods {
            damage_up: 150,
            ..Default::default()
        };
        let mut sim = simulator(
            vec![
                ServantConfig::new(3)
                    .with_np_level(5)
                    .with_charge(100.0)
                    .with_append5()
                    .with_mods(mods),
                ServantConfig::new(314),
                ServantConfig::new(314),
                ServantConfig::new(316),
            ],
            210,
        );

        play_turn(&mut sim, "a c f1 i1 4 #");
        let gauge = sim.state().servants[0].np_gauge;
        assert!((gauge - 30.0).abs() <= 3.0, "wave 1 gauge {}", gauge);

        play_turn(&mut sim, "d1 g1 x31 4 #");
        let gauge = sim.state().servants[0].np_gauge;
        assert!((gauge - 20.0).abs() <= 3.0, "wave 2 gauge {}", gauge);

        play_turn(&mut sim, "b g h1 i1 j 4 #");
        assert!(sim.run_succeeded());
    }

    #[test]
    fn test_self_sacrifice_promotes_bench() {
        let mut sim = simulator(
            vec![
                ServantConfig::new(314).with_charge(100.0),
                ServantConfig::new(37),
                ServantConfig::new(3),
                ServantConfig::new(414),
                ServantConfig::new(316),
            ],
            210,
        );
        play_turn(&mut sim, "4 #");
        play_turn(&mut sim, "a c b d 4");
        assert_eq!(sim.state().servants.len(), 5);

        assert!(sim.execute_token("#"));
        let state = sim.state();
        assert_eq!(state.servants.len(), 4);
        assert_eq!(state.servants[1].id, 414);
        assert_eq!(state.bench().len(), 1);
        assert_eq!(state.wave, 3);
    }

    #[test]
    fn test_costume_variants() {
        let mut sim = simulator(
            vec![ServantConfig::new(1).with_ascension(1, Some(800102))],
            210,
        );
        let skill_name = |sim: &Simulator| {
            sim.state().servants[0]
                .skills
                .slot(0)
                .map(|s| s.skill.name.clone())
        };
        assert_eq!(skill_name(&sim).as_deref(), Some("Kenzoku no Tate"));

        sim.change_ascension(0, 1, None).unwrap();
        assert_eq!(skill_name(&sim).as_deref(), Some("Honorable Shield"));

        sim.change_ascension(0, 1, Some(800101)).unwrap();
        assert_eq!(skill_name(&sim).as_deref(), Some("Black Barrel"));

        assert!(matches!(
            sim.change_ascension(3, 1, None),
            Err(SimError::NoServant(3))
        ));
    }

    #[test]
    fn test_shared_overcharge_carries_into_next_turn() {
        let mut sim = simulator(
            vec![
                ServantConfig::new(314).with_charge(100.0),
                ServantConfig::new(413).with_charge(300.0),
            ],
            210,
        );
        play_turn(&mut sim, "4 #");
        play_turn(&mut sim, "5");

        // Base OC 1, +2 from the full gauge, +1 shared on turn 1
        let aoko = &sim.state().servants[1];
        let buster_up = aoko
            .buffs
            .iter()
            .find(|b| b.name == "Buster Up" && b.source == BuffSource::Np)
            .map(|b| b.value);
        assert_eq!(buster_up, Some(350));
        assert!(!sim.state().enemies_alive());
    }

    #[test]
    fn test_rejected_token_halts_script() {
        let mut sim = simulator(vec![ServantConfig::new(314), ServantConfig::new(3)], 210);
        let report = sim.run_script("a a c #");
        assert!(!report.succeeded);
        assert_eq!(report.trace, vec!["a"]);
        assert_eq!(sim.state().servants[0].skills.cooldowns(), [5, 0, 0]);
    }

    #[test]
    fn test_lenient_settings() {
        let mut sim = Simulator::new(
            Arc::new(fixtures::store()),
            TeamConfig::from_ids(&[314, 3]),
            fixtures::THREE_WAVE_QUEST,
            210,
            Settings::lenient(),
        )
        .unwrap();
        let report = sim.run_script("a a zz c");
        assert_eq!(report.trace, vec!["a", "c"]);
    }

    #[test]
    fn test_unknown_token_can_halt() {
        let settings = Settings {
            halt_on_unknown_token: true,
            ..Settings::default()
        };
        let mut sim = Simulator::new(
            Arc::new(fixtures::store()),
            TeamConfig::from_ids(&[314]),
            fixtures::THREE_WAVE_QUEST,
            210,
            settings,
        )
        .unwrap();
        assert!(!sim.execute_token("zz"));
        assert!(sim.report().trace.is_empty());
    }

    #[test]
    fn test_copies_run_identically() {
        let mut sim = simulator(
            vec![
                ServantConfig::new(314).with_charge(100.0),
                ServantConfig::new(314),
                ServantConfig::new(3),
            ],
            210,
        );
        play_turn(&mut sim, "a");
        let mut copy = sim.clone();

        let script = "c 4 # d1 b f 4";
        let first = sim.run_script(script);
        let second = copy.run_script(script);
        assert_eq!(first, second);
        assert_eq!(sim.state(), copy.state());
    }

    #[test]
    fn test_reset_state() {
        let mut sim = simulator(vec![ServantConfig::new(314).with_charge(100.0)], 210);
        sim.run_script("a 4 #");
        assert_eq!(sim.state().wave, 2);

        sim.reset_state().unwrap();
        assert_eq!(sim.state().wave, 1);
        assert_eq!(sim.state().servants[0].np_gauge, 100.0);
        assert!(sim.report().trace.is_empty());
    }

    #[test]
    fn test_report_json() {
        let mut sim = simulator(vec![ServantConfig::new(314).with_charge(100.0)], 210);
        let report = sim.run_script("4 #");
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["trace"], serde_json::json!(["4", "#"]));
        assert_eq!(json["damage"].as_array().unwrap().len(), 3);
        assert_eq!(json["succeeded"], serde_json::json!(false));
    }
}
