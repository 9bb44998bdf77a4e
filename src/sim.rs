use crate::clock::Clock;
use crate::model::{
    Mood, Pet, Snapshot, Stage, DEFEAT_ENERGY_LOSS, ELDRITCH_LEVEL, ENEMIES, EXP_GAIN_MAX,
    EXP_GAIN_MIN, EXP_PER_LEVEL, FEED_AMOUNT, FIGHT_WEIGHTS, IDLE_MOODS, LOW_METER, METER_MAX,
    NAP_SECS, PETTED_MOODS, TEEN_LEVEL, WAKE_BONUS,
};
use crate::rng::{choose, RandomSource};
use chrono::{DateTime, Duration as ChronoDuration, Local};
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Feed,
    Nap,
    Pet,
    Fight,
}

/// Something that happened to the pet, for the driver to narrate.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Event {
    Fed { hunger: u32 },
    NapStarted { until: DateTime<Local> },
    Woke { energy_gained: u32 },
    Petted { while_asleep: bool, mood: Mood },
    Encounter { enemy: &'static str },
    Victory { enemy: &'static str, exp_gained: u32 },
    LevelUp { level: u32 },
    Evolved { stage: Stage },
    Defeat { enemy: &'static str, energy_lost: u32 },
}

/// Actions refused because the pet is asleep. Petting is always allowed.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub(crate) enum ActionError {
    #[error("cannot feed a napping pet")]
    FeedWhileNapping,
    #[error("the pet is already napping")]
    AlreadyNapping,
    #[error("cannot fight while the pet is napping")]
    FightWhileNapping,
}

pub(crate) type ActionResult = Result<Vec<Event>, ActionError>;

/// Owns one pet and is the only thing allowed to change it.
pub(crate) struct Engine<C, R> {
    pet: Pet,
    clock: C,
    rng: R,
}

impl<C: Clock, R: RandomSource> Engine<C, R> {
    pub(crate) fn new(pet: Pet, clock: C, rng: R) -> Self {
        Self { pet, clock, rng }
    }

    pub(crate) fn state(&self) -> &Pet {
        &self.pet
    }

    /// Apply the wake bonus if the nap has run out. Call this before
    /// anything else each turn.
    pub(crate) fn resolve_nap_wake(&mut self) -> Option<Event> {
        let until = self.pet.nap_until?;
        if until > self.clock.now() {
            return None;
        }
        self.pet.nap_until = None;
        if self.pet.nap_ended {
            debug!(name = %self.pet.name, "cleared stale nap without bonus");
            return None;
        }
        self.pet.nap_ended = true;
        let before = self.pet.energy;
        self.pet.energy = raise(self.pet.energy, WAKE_BONUS);
        self.update_mood();
        debug!(name = %self.pet.name, energy = self.pet.energy, "woke up");
        Some(Event::Woke {
            energy_gained: self.pet.energy - before,
        })
    }

    pub(crate) fn is_napping(&self) -> bool {
        self.pet
            .nap_until
            .is_some_and(|until| until > self.clock.now())
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        let now = self.clock.now();
        let nap_remaining = self
            .pet
            .nap_until
            .filter(|until| *until > now)
            .and_then(|until| (until - now).to_std().ok());
        Snapshot {
            stage: self.pet.stage,
            mood: self.pet.mood,
            hunger: self.pet.hunger,
            energy: self.pet.energy,
            level: self.pet.level,
            exp: self.pet.exp,
            nap_remaining,
        }
    }

    pub(crate) fn apply(&mut self, action: Action) -> ActionResult {
        match action {
            Action::Feed => self.feed(),
            Action::Nap => self.nap(),
            Action::Pet => Ok(self.pet()),
            Action::Fight => self.fight(),
        }
    }

    pub(crate) fn feed(&mut self) -> ActionResult {
        self.require_awake(ActionError::FeedWhileNapping)?;
        self.pet.hunger = raise(self.pet.hunger, FEED_AMOUNT);
        self.update_mood();
        Ok(vec![Event::Fed {
            hunger: self.pet.hunger,
        }])
    }

    pub(crate) fn nap(&mut self) -> ActionResult {
        self.require_awake(ActionError::AlreadyNapping)?;
        let until = self.clock.now() + ChronoDuration::seconds(NAP_SECS);
        self.pet.nap_until = Some(until);
        self.pet.nap_ended = false;
        self.update_mood();
        debug!(name = %self.pet.name, %until, "nap started");
        Ok(vec![Event::NapStarted { until }])
    }

    /// Always allowed. The mood it leaves is not derived from the meters.
    pub(crate) fn pet(&mut self) -> Vec<Event> {
        let while_asleep = self.is_napping();
        self.pet.mood = choose(&mut self.rng, &PETTED_MOODS);
        vec![Event::Petted {
            while_asleep,
            mood: self.pet.mood,
        }]
    }

    pub(crate) fn fight(&mut self) -> ActionResult {
        self.require_awake(ActionError::FightWhileNapping)?;
        let enemy = choose(&mut self.rng, &ENEMIES);
        let mut events = vec![Event::Encounter { enemy }];

        if self.rng.weighted(&FIGHT_WEIGHTS) == 0 {
            let exp_gained = self.rng.between(EXP_GAIN_MIN, EXP_GAIN_MAX);
            events.push(Event::Victory { enemy, exp_gained });
            self.pet.exp += exp_gained;
            // At most one level per win, however large the overflow.
            if self.pet.exp >= EXP_PER_LEVEL {
                self.pet.exp -= EXP_PER_LEVEL;
                self.pet.level = self.pet.level.saturating_add(1);
                debug!(name = %self.pet.name, level = self.pet.level, "level up");
                events.push(Event::LevelUp {
                    level: self.pet.level,
                });
                if let Some(stage) = self.evolve() {
                    events.push(Event::Evolved { stage });
                }
            }
        } else {
            let before = self.pet.energy;
            self.pet.energy = self.pet.energy.saturating_sub(DEFEAT_ENERGY_LOSS);
            events.push(Event::Defeat {
                enemy,
                energy_lost: before - self.pet.energy,
            });
        }

        self.update_mood();
        Ok(events)
    }

    fn evolve(&mut self) -> Option<Stage> {
        let next = next_stage(self.pet.stage, self.pet.level)?;
        debug!(name = %self.pet.name, from = ?self.pet.stage, to = ?next, "evolved");
        self.pet.stage = next;
        Some(next)
    }

    fn update_mood(&mut self) {
        self.pet.mood = derive_mood(
            self.pet.hunger,
            self.pet.energy,
            self.pet.level,
            &mut self.rng,
        );
    }

    fn require_awake(&self, refusal: ActionError) -> Result<(), ActionError> {
        if self.is_napping() {
            debug!(name = %self.pet.name, %refusal, "refused while napping");
            return Err(refusal);
        }
        Ok(())
    }
}

fn raise(meter: u32, by: u32) -> u32 {
    meter.saturating_add(by).min(METER_MAX)
}

/// Single step up the evolution ladder, if the level allows it.
pub(crate) fn next_stage(stage: Stage, level: u32) -> Option<Stage> {
    match stage {
        Stage::Baby if level >= TEEN_LEVEL => Some(Stage::Teen),
        Stage::Teen if level >= ELDRITCH_LEVEL => Some(Stage::Eldritch),
        _ => None,
    }
}

/// Hunger beats tiredness beats cosmic dread; otherwise the mood wanders.
pub(crate) fn derive_mood(hunger: u32, energy: u32, level: u32, rng: &mut impl RandomSource) -> Mood {
    if hunger < LOW_METER {
        return Mood::Hungry;
    }
    if energy < LOW_METER {
        return Mood::Tired;
    }
    if level >= ELDRITCH_LEVEL {
        return Mood::CosmicallyUnstable;
    }
    choose(rng, &IDLE_MOODS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::rng::{Dice, Scripted};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn start() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn engine_with(pet: Pet, rng: Scripted) -> (Engine<ManualClock, Scripted>, ManualClock) {
        let clock = ManualClock::new(start());
        (Engine::new(pet, clock.clone(), rng), clock)
    }

    fn after_nap() -> ChronoDuration {
        ChronoDuration::seconds(NAP_SECS)
    }

    #[test]
    fn feed_adds_twenty() {
        let (mut e, _) = engine_with(Pet::new("Rex"), Scripted::new());
        let events = e.feed().unwrap();
        assert_eq!(e.state().hunger, 70);
        assert_eq!(events, vec![Event::Fed { hunger: 70 }]);
    }

    #[test]
    fn feed_caps_at_hundred() {
        let mut pet = Pet::new("Rex");
        pet.hunger = 95;
        let (mut e, _) = engine_with(pet, Scripted::new());
        e.feed().unwrap();
        assert_eq!(e.state().hunger, 100);
    }

    #[test]
    fn feed_while_napping_is_refused() {
        let (mut e, _) = engine_with(Pet::new("Rex"), Scripted::new());
        e.nap().unwrap();
        let before = e.state().clone();
        assert_eq!(e.feed(), Err(ActionError::FeedWhileNapping));
        assert_eq!(e.state(), &before);
    }

    #[test]
    fn nap_twice_is_refused() {
        let (mut e, _) = engine_with(Pet::new("Rex"), Scripted::new());
        e.nap().unwrap();
        assert_eq!(e.nap(), Err(ActionError::AlreadyNapping));
    }

    #[test]
    fn fight_while_napping_is_refused() {
        let (mut e, _) = engine_with(Pet::new("Rex"), Scripted::new());
        e.nap().unwrap();
        let before = e.state().clone();
        assert_eq!(e.fight(), Err(ActionError::FightWhileNapping));
        assert_eq!(e.state(), &before);
    }

    #[test]
    fn wake_before_expiry_does_nothing() {
        let (mut e, clock) = engine_with(Pet::new("Rex"), Scripted::new());
        e.nap().unwrap();
        clock.advance(ChronoDuration::seconds(NAP_SECS - 1));
        assert_eq!(e.resolve_nap_wake(), None);
        assert!(e.state().nap_until.is_some());
        assert_eq!(e.state().energy, 50);
        assert!(e.is_napping());
    }

    #[test]
    fn wake_bonus_applies_exactly_once() {
        let (mut e, clock) = engine_with(Pet::new("Rex"), Scripted::new());
        e.nap().unwrap();
        clock.advance(after_nap());
        assert!(!e.is_napping());
        assert_eq!(e.resolve_nap_wake(), Some(Event::Woke { energy_gained: 30 }));
        assert_eq!(e.state().energy, 80);
        assert!(e.state().nap_ended);
        assert!(e.state().nap_until.is_none());

        clock.advance(ChronoDuration::seconds(60));
        assert_eq!(e.resolve_nap_wake(), None);
        assert_eq!(e.state().energy, 80);
    }

    #[test]
    fn wake_bonus_is_clamped() {
        let mut pet = Pet::new("Rex");
        pet.energy = 90;
        let (mut e, clock) = engine_with(pet, Scripted::new());
        e.nap().unwrap();
        clock.advance(after_nap());
        assert_eq!(e.resolve_nap_wake(), Some(Event::Woke { energy_gained: 10 }));
        assert_eq!(e.state().energy, 100);
    }

    #[test]
    fn new_nap_resets_wake_guard() {
        let (mut e, clock) = engine_with(Pet::new("Rex"), Scripted::new());
        e.nap().unwrap();
        clock.advance(after_nap());
        e.resolve_nap_wake();
        e.nap().unwrap();
        assert!(!e.state().nap_ended);
        clock.advance(after_nap());
        assert!(e.resolve_nap_wake().is_some());
        assert_eq!(e.state().energy, 100);
    }

    #[test]
    fn stale_nap_is_cleared_without_bonus() {
        let mut pet = Pet::new("Rex");
        pet.nap_until = Some(start() - ChronoDuration::seconds(1));
        pet.nap_ended = true;
        let (mut e, _) = engine_with(pet, Scripted::new());
        assert_eq!(e.resolve_nap_wake(), None);
        assert!(e.state().nap_until.is_none());
        assert_eq!(e.state().energy, 50);
    }

    #[test]
    fn nap_from_previous_session_wakes_on_load() {
        let mut pet = Pet::new("Rex");
        pet.nap_until = Some(start() - ChronoDuration::hours(3));
        let (mut e, _) = engine_with(pet, Scripted::new());
        assert!(!e.is_napping());
        assert!(e.resolve_nap_wake().is_some());
        assert_eq!(e.state().energy, 80);
    }

    #[test]
    fn snapshot_reports_nap_remaining() {
        let (mut e, clock) = engine_with(Pet::new("Rex"), Scripted::new());
        assert_eq!(e.snapshot().nap_remaining, None);
        e.nap().unwrap();
        clock.advance(ChronoDuration::seconds(2));
        let snap = e.snapshot();
        assert_eq!(snap.nap_remaining.map(|d| d.as_secs()), Some(4));
        assert_eq!(snap.hunger, 50);
        assert_eq!(snap.stage, Stage::Baby);
    }

    #[test]
    fn pet_picks_from_petted_moods() {
        let (mut e, _) = engine_with(Pet::new("Rex"), Scripted::new().picks(1));
        let events = e.pet();
        assert_eq!(e.state().mood, Mood::Ecstatic);
        assert_eq!(
            events,
            vec![Event::Petted {
                while_asleep: false,
                mood: Mood::Ecstatic
            }]
        );
    }

    #[test]
    fn pet_works_while_napping() {
        let (mut e, _) = engine_with(Pet::new("Rex"), Scripted::new().picks(0).picks(2));
        e.nap().unwrap();
        let events = e.apply(Action::Pet).unwrap();
        assert_eq!(e.state().mood, Mood::Bored);
        assert!(matches!(
            events[0],
            Event::Petted {
                while_asleep: true,
                ..
            }
        ));
        assert!(e.state().nap_until.is_some());
    }

    #[test]
    fn pet_overrides_priority_moods() {
        let mut pet = Pet::new("Rex");
        pet.hunger = 5;
        let (mut e, _) = engine_with(pet, Scripted::new().picks(0));
        e.pet();
        assert_eq!(e.state().mood, Mood::Happy);
    }

    #[test]
    fn fight_win_adds_exp() {
        let rng = Scripted::new().picks(1).outcomes(0).rolls(22);
        let (mut e, _) = engine_with(Pet::new("Rex"), rng);
        let events = e.fight().unwrap();
        assert_eq!(e.state().exp, 22);
        assert_eq!(e.state().level, 1);
        assert_eq!(
            events,
            vec![
                Event::Encounter { enemy: "goblin" },
                Event::Victory {
                    enemy: "goblin",
                    exp_gained: 22
                },
            ]
        );
    }

    #[test]
    fn fight_loss_costs_energy() {
        let rng = Scripted::new().picks(3).outcomes(1);
        let (mut e, _) = engine_with(Pet::new("Rex"), rng);
        let events = e.fight().unwrap();
        assert_eq!(e.state().energy, 35);
        assert_eq!(e.state().exp, 0);
        assert_eq!(
            events[1],
            Event::Defeat {
                enemy: "your ex",
                energy_lost: 15
            }
        );
    }

    #[test]
    fn fight_loss_floors_energy_at_zero() {
        let mut pet = Pet::new("Rex");
        pet.energy = 10;
        let (mut e, _) = engine_with(pet, Scripted::new().outcomes(1));
        e.fight().unwrap();
        assert_eq!(e.state().energy, 0);
        assert_eq!(e.state().mood, Mood::Tired);
    }

    #[test]
    fn level_two_win_evolves_to_teen() {
        let mut pet = Pet::new("Rex");
        pet.level = 2;
        pet.exp = 90;
        let rng = Scripted::new().outcomes(0).rolls(25);
        let (mut e, _) = engine_with(pet, rng);
        let events = e.fight().unwrap();
        assert_eq!(e.state().level, 3);
        assert_eq!(e.state().exp, 15);
        assert_eq!(e.state().stage, Stage::Teen);
        assert!(events.contains(&Event::LevelUp { level: 3 }));
        assert!(events.contains(&Event::Evolved { stage: Stage::Teen }));
    }

    #[test]
    fn level_five_teen_becomes_eldritch() {
        let mut pet = Pet::new("Rex");
        pet.stage = Stage::Teen;
        pet.level = 5;
        pet.exp = 99;
        let rng = Scripted::new().picks(0).outcomes(0).rolls(15);
        let (mut e, _) = engine_with(pet, rng);
        e.fight().unwrap();
        assert_eq!(e.state().level, 6);
        assert_eq!(e.state().exp, 14);
        assert_eq!(e.state().stage, Stage::Eldritch);
        assert_eq!(e.state().mood, Mood::CosmicallyUnstable);
    }

    #[test]
    fn baby_skipping_levels_moves_one_stage_at_a_time() {
        let mut pet = Pet::new("Rex");
        pet.level = 6;
        pet.exp = 95;
        let rng = Scripted::new().outcomes(0).rolls(20);
        let (mut e, _) = engine_with(pet, rng);
        e.fight().unwrap();
        assert_eq!(e.state().level, 7);
        assert_eq!(e.state().stage, Stage::Teen);
    }

    #[test]
    fn level_up_at_max_level_does_not_overflow() {
        let pet: Pet =
            serde_json::from_str(r#"{"name": "Rex", "level": 4294967295, "exp": 99}"#).unwrap();
        let rng = Scripted::new().picks(0).outcomes(0).rolls(15);
        let (mut e, _) = engine_with(pet, rng);
        let events = e.fight().unwrap();
        assert_eq!(e.state().level, u32::MAX);
        assert_eq!(e.state().exp, 14);
        assert!(events.contains(&Event::LevelUp { level: u32::MAX }));
    }

    #[test]
    fn eldritch_never_changes() {
        assert_eq!(next_stage(Stage::Eldritch, 50), None);
        assert_eq!(next_stage(Stage::Teen, 5), None);
        assert_eq!(next_stage(Stage::Baby, 2), None);
    }

    #[test]
    fn mood_priorities() {
        let mut rng = Scripted::new();
        assert_eq!(derive_mood(29, 0, 9, &mut rng), Mood::Hungry);
        assert_eq!(derive_mood(30, 29, 9, &mut rng), Mood::Tired);
        assert_eq!(derive_mood(30, 30, 6, &mut rng), Mood::CosmicallyUnstable);
    }

    #[test]
    fn idle_mood_is_one_of_the_wandering_moods() {
        let mut dice = Dice::seeded(3);
        for _ in 0..100 {
            let mood = derive_mood(80, 80, 1, &mut dice);
            assert!(IDLE_MOODS.contains(&mood), "{mood:?}");
        }
    }

    #[test]
    fn rex_scenario() {
        let (mut e, clock) = engine_with(Pet::new("Rex"), Scripted::new());
        assert_eq!(e.resolve_nap_wake(), None);

        e.feed().unwrap();
        assert_eq!(e.state().hunger, 70);
        assert_ne!(e.state().mood, Mood::Hungry);

        e.nap().unwrap();
        assert_eq!(
            e.state().nap_until,
            Some(start() + ChronoDuration::seconds(NAP_SECS))
        );
        assert!(!e.state().nap_ended);
        assert!(e.is_napping());

        clock.advance(after_nap());
        e.resolve_nap_wake();
        assert_eq!(e.state().energy, 80);
        assert!(e.state().nap_ended);
        assert!(e.state().nap_until.is_none());
    }

    proptest! {
        #[test]
        fn meters_stay_in_bounds(
            seed in any::<u64>(),
            hunger in 0u32..=100,
            energy in 0u32..=100,
            steps in prop::collection::vec((0usize..4, 0i64..10), 0..60),
        ) {
            let mut pet = Pet::new("Rex");
            pet.hunger = hunger;
            pet.energy = energy;
            let clock = ManualClock::new(start());
            let mut e = Engine::new(pet, clock.clone(), Dice::seeded(seed));
            let actions = [Action::Feed, Action::Nap, Action::Pet, Action::Fight];
            for (a, wait) in steps {
                clock.advance(ChronoDuration::seconds(wait));
                e.resolve_nap_wake();
                let _ = e.apply(actions[a]);
                let p = e.state();
                prop_assert!(p.hunger <= 100);
                prop_assert!(p.energy <= 100);
                prop_assert!(p.exp < 100);
                prop_assert!(p.level >= 1);
            }
        }
    }
}
