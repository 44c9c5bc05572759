//! Terminal Troubleshooter
//!
//! Interactive session: prompt for a command, simulate it, judge it
//! against the current level, render the verdict. One command per turn.

use anyhow::Context;
use terminal_troubleshooter::game::Judgement;
use terminal_troubleshooter::{term, Interpreter, LevelEngine, LevelSet, SimEnv};

fn main() -> terminal_troubleshooter::Result<()> {
    // Built-in campaign, or an author-supplied JSON level file.
    // Malformed level data is the one fatal error; it aborts here.
    let levels = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read level file {}", path))?;
            LevelSet::from_json(&text).context("invalid level file")?
        }
        None => LevelSet::builtin(),
    };

    let mut env = SimEnv::baseline();
    let interpreter = Interpreter::new();
    let mut engine = LevelEngine::new(levels);

    term::banner();

    // Track where we are so level/task text prints on every transition.
    let mut announced: Option<(usize, usize)> = None;

    while !engine.is_complete() {
        let here = (engine.progress().level_index, engine.progress().step_index);
        if announced != Some(here) {
            if announced.map(|(level, _)| level) != Some(here.0) {
                if let Some(level) = engine.current_level() {
                    term::scenario(here.0 + 1, &level.title, &level.description);
                }
            }
            if let Some(step) = engine.current_step() {
                term::task(&step.task);
            }
            announced = Some(here);
        }

        let Some(line) = term::prompt()? else {
            break; // EOF
        };
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }

        let overrides = engine.active_overrides().cloned();
        let result = interpreter.execute(&mut env, &line, overrides.as_ref());
        term::output_block(&result.output);

        match engine.submit(&line, &result, &mut env) {
            Judgement::Advanced {
                message,
                xp_awarded,
                level_complete,
                game_complete,
                ..
            } => {
                term::success(&message);
                term::xp(engine.xp(), xp_awarded);
                if level_complete && !game_complete {
                    term::level_complete();
                }
            }
            Judgement::Retry { message, hint, .. } => {
                term::error(&message);
                if let Some(hint) = hint {
                    term::hint(&hint);
                }
            }
            Judgement::AlreadyComplete => break,
        }
    }

    if engine.is_complete() {
        term::game_complete(engine.xp());
    } else {
        println!("Session ended. See you next shift.");
    }
    Ok(())
}
