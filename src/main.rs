//! Polyarcade headless runner
//!
//! Plays the stealth-chase map at a fixed timestep with a scripted player
//! and reports whether the alien catches it.
//!
//! Usage: `polyarcade [settings.json] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use polyarcade::ai::{Stalker, StalkerState};
    use polyarcade::consts::SIM_DT;
    use polyarcade::stealth::{MapLayout, StealthMap};
    use polyarcade::{SimSettings, Vector};

    env_logger::init();
    log::info!("Polyarcade (native) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => match SimSettings::load(&path) {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("{err}");
                std::process::exit(1);
            }
        },
        None => SimSettings::default(),
    };
    let seconds: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60.0);
    let ticks = (seconds / SIM_DT).round() as u64;

    let layout = MapLayout::default();
    let mut map = StealthMap::with_settings(&layout, &settings);
    let mut stalker = Stalker::from_settings(&settings);

    // Scripted player: sweep along the top corridor, hide when chased
    let sweep = Vector::new(40.0, 0.0);
    map.set_player_velocity(sweep);

    let mut caught_at = None;
    let mut last_state = stalker.state();
    for step in 0..ticks {
        stalker.update(&mut map, SIM_DT);

        if stalker.state() == StalkerState::Chasing && !map.is_hiding() {
            if let Some(spot) = map.touching_hiding_spot() {
                map.hide_player(spot);
            }
        }

        map.tick(SIM_DT);

        let state = stalker.state();
        if std::mem::discriminant(&state) != std::mem::discriminant(&last_state) {
            log::info!("t={:.2}s stalker {:?}", step as f64 * SIM_DT, state);
            last_state = state;
        }

        if map.player_caught() {
            caught_at = Some(step as f64 * SIM_DT);
            break;
        }
    }

    match caught_at {
        Some(t) => println!("Player caught after {t:.2}s"),
        None => println!("Player survived {seconds:.0}s"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web
}
