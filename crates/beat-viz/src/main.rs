mod audio;
mod renderer;
mod ui;
mod utils;

use anyhow::{anyhow, Context};
use audio::{FilePlayback, SpectrumAnalyser};
use beat_viz_core::{MonotonicClock, RefreshScheduler, Visualizer};
use nannou::prelude::*;
use renderer::{NannouSurface, Notification, Resolution};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use ui::Action;
use utils::Config;

type FileVisualizer = Visualizer<FilePlayback, SpectrumAnalyser, RefreshScheduler, MonotonicClock>;

fn main() {
    utils::logging::init();

    nannou::app(model)
        .update(update)
        .run();
}

/// Command line: `beat-viz [--windowed|-w] [FILE]`
#[derive(Debug, Default, PartialEq)]
struct Args {
    file: Option<PathBuf>,
    windowed: bool,
}

impl Args {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut parsed = Self::default();
        for arg in args {
            match arg.as_str() {
                "--windowed" | "-w" => parsed.windowed = true,
                flag if flag.starts_with('-') => warn!(flag, "ignoring unknown flag"),
                _ => parsed.file = Some(PathBuf::from(&arg)),
            }
        }
        parsed
    }
}

struct Model {
    visualizer: FileVisualizer,
    notification: Notification,
    config: Config,
}

fn model(app: &App) -> Model {
    match try_model(app) {
        Ok(model) => model,
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(1);
        }
    }
}

fn try_model(app: &App) -> anyhow::Result<Model> {
    let args = Args::parse(env::args().skip(1));
    let resolution = Resolution::current(args.windowed);

    let mut win = app
        .new_window()
        .title("beat-viz")
        .view(view)
        .key_pressed(key_pressed)
        .dropped_file(dropped_file)
        .size(resolution.width, resolution.height);

    if resolution.fullscreen {
        win = win.fullscreen();
    }

    win.build()
        .map_err(|err| anyhow!("failed to open window: {:?}", err))?;

    let config = Config::load();
    let bounds = app.window_rect();
    let visualizer = Visualizer::new(
        config.visualizer_config(),
        RefreshScheduler::new(),
        MonotonicClock::new(),
        beat_viz_core::Rect::from_w_h(bounds.w(), bounds.h()),
    );

    let mut model = Model {
        visualizer,
        notification: Notification::default(),
        config,
    };

    match args.file.or_else(|| model.config.last_file.clone()) {
        Some(path) => load_track(&mut model, &path),
        None => model.notification.show("Drop an audio file to start"),
    }

    Ok(model)
}

/// Replaces the current track. On failure the current one keeps playing.
fn load_track(model: &mut Model, path: &Path) {
    let opened = audio::open_track(path).with_context(|| format!("loading {}", path.display()));
    match opened {
        Ok(track) => {
            model.notification.show(format!("Playing: {}", track.label));
            model.visualizer.start(track);
            model.config.set_last_file(path);
        }
        Err(err) => {
            warn!("{:#}", err);
            model.notification.show(format!("Failed: {:#}", err));
        }
    }
}

fn update(app: &App, model: &mut Model, _update: Update) {
    let bounds = app.window_rect();
    model.visualizer.resize(bounds.w(), bounds.h());
    model.visualizer.refresh();
    model.notification.tick();
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let bounds = app.window_rect();

    let mut surface = NannouSurface::new(&draw, bounds);
    model.visualizer.display_list().replay(&mut surface);
    model.notification.draw(&draw, bounds);

    if let Err(err) = draw.to_frame(app, &frame) {
        warn!(?err, "failed to render frame");
    }
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    let action = match ui::parse_key(key) {
        Some(action) => action,
        None => return,
    };

    match action {
        Action::Quit => {
            model.visualizer.stop();
            app.quit();
        }
        Action::TogglePlayback => model.visualizer.toggle_playback(),
        Action::CycleSpeed => {
            let speed = model.visualizer.cycle_speed();
            model.notification.show(ui::speed_label(speed));
        }
        Action::Seek(seconds) => model.visualizer.seek_by(seconds),
        Action::Stop => {
            model.visualizer.stop();
            model.notification.show("Stopped");
        }
    }
}

fn dropped_file(_app: &App, model: &mut Model, path: PathBuf) {
    info!(path = %path.display(), "file dropped");
    load_track(model, &path);
}
