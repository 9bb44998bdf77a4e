use crate::clock::{Clock, SystemClock};
use crate::config::{load_settings, settings_path, Settings};
use crate::input::{parse_choice, read_line, MenuChoice};
use crate::model::Pet;
use crate::render;
use crate::rng::{Dice, RandomSource};
use crate::sim::{Action, Engine, Event};
use crate::storage::{validate_name, SaveDir};
use crate::Args;
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::{info, warn};

/// Keeps a napping pet from redrawing in a busy loop.
const MIN_NAP_POLL_MS: u64 = 100;

pub(crate) struct App<C, R> {
    engine: Engine<C, R>,
    store: SaveDir,
    settings: Settings,
}

impl<C: Clock, R: RandomSource> App<C, R> {
    pub(crate) fn new(engine: Engine<C, R>, store: SaveDir, settings: Settings) -> Self {
        Self {
            engine,
            store,
            settings,
        }
    }

    /// Turn loop. Returns once the player quits or input runs out; the pet
    /// is saved either way.
    pub(crate) fn play(&mut self, input: &mut impl BufRead, out: &mut impl Write) -> Result<()> {
        let color = self.settings.enable_color;
        loop {
            if let Some(event) = self.engine.resolve_nap_wake() {
                render::write_event(out, &self.engine.state().name, &event, color)?;
            }

            let snap = self.engine.snapshot();
            render::write_status(out, &self.engine.state().name, &snap, color)?;

            if self.engine.is_napping() {
                render::write_napping_notice(out, color)?;
                out.flush()?;
                pause(self.settings.nap_poll_ms.max(MIN_NAP_POLL_MS));
                continue;
            }

            render::write_menu(out)?;
            out.flush()?;

            let Some(line) = read_line(input)? else {
                info!("input closed, quitting");
                return self.quit(out);
            };
            match parse_choice(&line) {
                Some(MenuChoice::Act(action)) => self.act(action, out)?,
                Some(MenuChoice::Save) => self.save(out)?,
                Some(MenuChoice::Quit) => return self.quit(out),
                None => render::write_invalid_choice(out, color)?,
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn pet(&self) -> &Pet {
        self.engine.state()
    }

    fn act(&mut self, action: Action, out: &mut impl Write) -> Result<()> {
        let color = self.settings.enable_color;
        let events = match self.engine.apply(action) {
            Ok(events) => events,
            Err(e) => {
                render::write_refusal(out, e, color)?;
                return Ok(());
            }
        };
        let name = &self.engine.state().name;
        for event in &events {
            render::write_event(out, name, event, color)?;
            if matches!(event, Event::Encounter { .. }) {
                out.flush()?;
                pause(self.settings.fight_pause_ms);
            }
        }
        Ok(())
    }

    /// A failed manual save is reported and play goes on.
    fn save(&self, out: &mut impl Write) -> Result<()> {
        let color = self.settings.enable_color;
        match self.store.save(self.engine.state()) {
            Ok(()) => render::write_saved(out, color)?,
            Err(e) => {
                warn!(error = %e, "manual save failed");
                render::write_save_failed(out, &e, color)?;
            }
        }
        Ok(())
    }

    fn quit(&self, out: &mut impl Write) -> Result<()> {
        render::write_goodbye(out, self.settings.enable_color)?;
        out.flush()?;
        self.store
            .save(self.engine.state())
            .context("could not save the pet on the way out")?;
        Ok(())
    }
}

fn pause(ms: u64) {
    if ms > 0 {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

pub(crate) fn settings_with_overrides(args: &Args, mut settings: Settings) -> Settings {
    if let Some(dir) = &args.dir {
        settings.save_dir = Some(dir.clone());
    }
    if args.no_color {
        settings.enable_color = false;
    }
    if let Some(ms) = args.fight_pause_ms {
        settings.fight_pause_ms = ms;
    }
    if let Some(ms) = args.nap_poll_ms {
        settings.nap_poll_ms = ms;
    }
    settings
}

/// Ask until we get a usable name. `None` if input ends first.
pub(crate) fn prompt_name(
    input: &mut impl BufRead,
    out: &mut impl Write,
    color: bool,
) -> Result<Option<String>> {
    loop {
        render::write_name_prompt(out)?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match validate_name(&line) {
            Ok(name) => return Ok(Some(name.to_string())),
            Err(e) => render::write_invalid_name(out, &e, color)?,
        }
    }
}

/// The saved pet if there is one, otherwise a fresh one. The flag says
/// whether it was loaded.
pub(crate) fn load_or_create(store: &SaveDir, name: &str) -> Result<(Pet, bool)> {
    let loaded = store
        .load(name)
        .with_context(|| format!("could not load pet {name:?}"))?;
    Ok(match loaded {
        Some(pet) => (pet, true),
        None => {
            info!(%name, "creating new pet");
            (Pet::new(name), false)
        }
    })
}

pub(crate) fn run(args: Args) -> Result<()> {
    let base = settings_path()
        .map(|p| load_settings(&p))
        .unwrap_or_default();
    let settings = settings_with_overrides(&args, base);
    let color = settings.enable_color;
    let store = SaveDir::new(settings.save_dir());

    let mut input = io::stdin().lock();
    let mut out = io::stdout().lock();

    render::write_banner(&mut out, color)?;
    let name = match &args.name {
        Some(n) => validate_name(n)?.to_string(),
        None => match prompt_name(&mut input, &mut out, color)? {
            Some(n) => n,
            None => return Ok(()),
        },
    };

    let (pet, returning) = load_or_create(&store, &name)?;
    render::write_greeting(&mut out, &pet.name, returning, color)?;

    let dice = match args.seed {
        Some(seed) => Dice::seeded(seed),
        None => Dice::from_entropy(),
    };
    let mut app = App::new(Engine::new(pet, SystemClock, dice), store, settings);
    app.play(&mut input, &mut out)
}
