use crate::model::{Mood, Snapshot, Stage};
use crate::sim::{ActionError, Event};
use crate::storage::StorageError;
use crossterm::{
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use std::io::{self, Write};
use std::time::Duration;

/* -----------------------------
   Low-level line output
------------------------------ */

fn line(out: &mut impl Write, text: &str, fg: Option<Color>, color: bool) -> io::Result<()> {
    match fg.filter(|_| color) {
        Some(c) => queue!(out, SetForegroundColor(c), Print(text), ResetColor, Print("\n"))?,
        None => queue!(out, Print(text), Print("\n"))?,
    }
    Ok(())
}

fn heading(out: &mut impl Write, text: &str, color: bool) -> io::Result<()> {
    if color {
        queue!(
            out,
            SetAttribute(Attribute::Bold),
            SetForegroundColor(Color::Magenta),
            Print(text),
            ResetColor,
            SetAttribute(Attribute::Reset),
            Print("\n")
        )?;
    } else {
        queue!(out, Print(text), Print("\n"))?;
    }
    Ok(())
}

/* -----------------------------
   Labels
------------------------------ */

pub(crate) fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Baby => "baby",
        Stage::Teen => "teen",
        Stage::Eldritch => "eldritch abomination",
    }
}

pub(crate) fn mood_label(mood: Mood) -> &'static str {
    match mood {
        Mood::Neutral => "neutral",
        Mood::Hungry => "hungry",
        Mood::Tired => "tired",
        Mood::Happy => "happy",
        Mood::Ecstatic => "ecstatic",
        Mood::Bored => "bored",
        Mood::Energetic => "energetic",
        Mood::CosmicallyUnstable => "cosmically unstable",
    }
}

pub(crate) fn mood_quote(mood: Mood) -> &'static str {
    match mood {
        Mood::Hungry => "🍔 Feed me or I *will* riot.",
        Mood::Tired => "🛌 Zzz... why am I even awake?",
        Mood::Ecstatic => "✨ I feel ALIVE!!",
        Mood::CosmicallyUnstable => "👁 I have seen beyond the veil.",
        Mood::Happy => "😊 You're the best, Pookie <3",
        Mood::Bored => "🥱 This is LAME.",
        Mood::Neutral => "¯\\_(ツ)_/¯ meh.",
        Mood::Energetic => "⚡ LET'S GOOOOOO!!!",
    }
}

fn mood_color(mood: Mood) -> Color {
    match mood {
        Mood::Hungry | Mood::Tired => Color::Red,
        Mood::Happy | Mood::Ecstatic | Mood::Energetic => Color::Green,
        Mood::CosmicallyUnstable => Color::Magenta,
        Mood::Neutral | Mood::Bored => Color::Grey,
    }
}

fn meter_color(value: u32) -> Color {
    match value {
        0..=29 => Color::Red,
        30..=59 => Color::Yellow,
        _ => Color::Green,
    }
}

pub(crate) fn format_remaining(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}

/* -----------------------------
   Art
------------------------------ */

fn art(stage: Stage, napping: bool) -> &'static str {
    if napping {
        return r"
   (-_-) zZz
  (\__/)
 ( - w - )
  /   づ";
    }
    match stage {
        Stage::Baby => {
            r"
  (\__/)
  (•ㅅ•)
  /   づ"
        }
        Stage::Teen => {
            r"
  ʕ•́ᴥ•̀ʔっ
 (   ⊃⊃ )"
        }
        Stage::Eldritch => {
            r"
   ☉･‿･☉
  /█\▕█▕
 /  \    \
 [RUN]"
        }
    }
}

/* -----------------------------
   Screens
------------------------------ */

pub(crate) fn write_banner(out: &mut impl Write, color: bool) -> io::Result<()> {
    heading(out, "🎮 Terminal Tamagotchi: Sassy Sleeper Edition", color)
}

pub(crate) fn write_name_prompt(out: &mut impl Write) -> io::Result<()> {
    queue!(out, Print("Name your Tamagotchi (or type a saved name to load): "))?;
    Ok(())
}

pub(crate) fn write_greeting(
    out: &mut impl Write,
    name: &str,
    returning: bool,
    color: bool,
) -> io::Result<()> {
    if returning {
        line(out, &format!("Welcome back, {name}! 😎"), Some(Color::Cyan), color)
    } else {
        line(
            out,
            &format!("✨ New digital child created: {name}"),
            Some(Color::Cyan),
            color,
        )
    }
}

pub(crate) fn write_status(
    out: &mut impl Write,
    name: &str,
    snap: &Snapshot,
    color: bool,
) -> io::Result<()> {
    queue!(out, Print("\n"))?;
    heading(out, &format!("✨ {name}'s Stats ✨"), color)?;
    line(out, &format!("🌱 Stage: {}", stage_label(snap.stage)), None, color)?;
    line(
        out,
        &format!("❤️ Mood: {}", mood_label(snap.mood)),
        Some(mood_color(snap.mood)),
        color,
    )?;
    line(
        out,
        &format!("🍖 Hunger: {}/100", snap.hunger),
        Some(meter_color(snap.hunger)),
        color,
    )?;
    line(
        out,
        &format!("⚡ Energy: {}/100", snap.energy),
        Some(meter_color(snap.energy)),
        color,
    )?;
    line(
        out,
        &format!("⭐ Level: {} | XP: {}/100", snap.level, snap.exp),
        None,
        color,
    )?;

    match snap.nap_remaining {
        Some(left) => {
            line(out, "🛌 Status: Napping... shhh 🪫", Some(Color::Blue), color)?;
            line(
                out,
                &format!("🛌 {name} is sleeping for {} more.", format_remaining(left)),
                Some(Color::Blue),
                color,
            )?;
        }
        None => {
            line(
                out,
                &format!("\n💬 {name} says: \"{}\"", mood_quote(snap.mood)),
                None,
                color,
            )?;
        }
    }
    line(out, art(snap.stage, snap.nap_remaining.is_some()), None, color)
}

pub(crate) fn write_menu(out: &mut impl Write) -> io::Result<()> {
    queue!(
        out,
        Print("\nActions: [1] Feed [2] Nap [3] Pet [4] Dungeon [5] Save [6] Quit\n> ")
    )?;
    Ok(())
}

pub(crate) fn write_napping_notice(out: &mut impl Write, color: bool) -> io::Result<()> {
    line(
        out,
        "😤 Let it finish its nap before doing anything else!",
        Some(Color::Yellow),
        color,
    )
}

pub(crate) fn write_invalid_choice(out: &mut impl Write, color: bool) -> io::Result<()> {
    line(out, "Nope. Invalid. Try again, Pooks.", Some(Color::Yellow), color)
}

pub(crate) fn write_invalid_name(
    out: &mut impl Write,
    err: &StorageError,
    color: bool,
) -> io::Result<()> {
    line(out, &format!("That name won't work: {err}"), Some(Color::Yellow), color)
}

pub(crate) fn write_event(
    out: &mut impl Write,
    name: &str,
    event: &Event,
    color: bool,
) -> io::Result<()> {
    match event {
        Event::Fed { .. } => line(out, "You gave it a mysterious snack... 🍖", None, color),
        Event::NapStarted { .. } => line(
            out,
            &format!("\nPutting {name} to sleep. 🛌 It'll wake up soon."),
            Some(Color::Blue),
            color,
        ),
        Event::Woke { energy_gained } => line(
            out,
            &format!("🌞 {name} woke up well-rested! +{energy_gained} energy"),
            Some(Color::Green),
            color,
        ),
        Event::Petted { while_asleep, .. } => {
            if *while_asleep {
                line(out, "Petting a sleeping creature... suspicious 😳", None, color)
            } else {
                line(out, "A gentle pat 💐 It liked that.", None, color)
            }
        }
        Event::Encounter { enemy } => {
            line(out, "Marching into the dungeon like a legend. ⚔️", None, color)?;
            line(out, &format!("A wild {enemy} appears!"), Some(Color::Red), color)
        }
        Event::Victory { enemy, exp_gained } => line(
            out,
            &format!("Slayed the {enemy}! +{exp_gained} XP 💪"),
            Some(Color::Green),
            color,
        ),
        Event::LevelUp { level } => line(
            out,
            &format!("🎉 LEVEL UP!!! Now level {level} 🎉"),
            Some(Color::Yellow),
            color,
        ),
        Event::Evolved { stage } => {
            // Stages only move forward, so anything past teen is the final form.
            let text = match stage {
                Stage::Teen => "✨ Your pet evolved into a rebellious teen!",
                _ => "😨 It has transcended... it now whispers in ancient tongues.",
            };
            line(out, text, Some(Color::Magenta), color)
        }
        Event::Defeat { enemy, energy_lost } => line(
            out,
            &format!("Oof, the {enemy} bonked your pet. -{energy_lost} energy"),
            Some(Color::Red),
            color,
        ),
    }
}

pub(crate) fn write_refusal(out: &mut impl Write, err: ActionError, color: bool) -> io::Result<()> {
    let text = match err {
        ActionError::FeedWhileNapping => "You can't wake it up to feed it, that's rude 😤",
        ActionError::AlreadyNapping => "It's already snoozing 💤 Let it rest, bestie.",
        ActionError::FightWhileNapping => "Let it nap! Dungeons can wait. 😤",
    };
    line(out, text, Some(Color::Yellow), color)
}

pub(crate) fn write_saved(out: &mut impl Write, color: bool) -> io::Result<()> {
    line(out, "📂 Saved! Don't lose me, Pookie!", Some(Color::Cyan), color)
}

pub(crate) fn write_save_failed(
    out: &mut impl Write,
    err: &StorageError,
    color: bool,
) -> io::Result<()> {
    line(out, &format!("💥 Save failed: {err}"), Some(Color::Red), color)
}

pub(crate) fn write_goodbye(out: &mut impl Write, color: bool) -> io::Result<()> {
    line(
        out,
        "👋 Bye bye! May it not devour the world while you sleep.",
        Some(Color::Cyan),
        color,
    )
}
