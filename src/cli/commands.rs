//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use log::info;

use crate::clock::ManualClock;
use crate::config::EngineConfig;
use crate::engine::{PaceDirection, SessionEngine, SessionObserver, SessionState};
use crate::preset::{Preset, PresetLibrary};

/// A scheduled pace change for `simulate`
#[derive(Debug, Clone, PartialEq)]
pub struct PaceStep {
    pub at_secs: f64,
    /// Voice index; `None` picks the first breathing voice
    pub voice: Option<usize>,
    pub direction: PaceDirection,
}

impl FromStr for PaceStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let (at, voice, direction) = match parts.as_slice() {
            [at, direction] => (*at, None, *direction),
            [at, voice, direction] => {
                let voice = voice
                    .parse::<usize>()
                    .map_err(|_| format!("invalid voice index '{}'", voice))?;
                (*at, Some(voice), *direction)
            }
            _ => return Err(format!("expected SECONDS:DIRECTION or SECONDS:VOICE:DIRECTION, got '{}'", s)),
        };

        let at_secs = at
            .parse::<f64>()
            .ok()
            .filter(|t| t.is_finite() && *t >= 0.0)
            .ok_or_else(|| format!("invalid time '{}'", at))?;

        Ok(Self {
            at_secs,
            voice,
            direction: direction.parse()?,
        })
    }
}

/// Prints state changes and periodic progress to stdout
struct ConsoleReporter {
    report_every: f64,
    next_report: f64,
}

impl ConsoleReporter {
    fn new(report_every: f64) -> Self {
        Self {
            report_every: report_every.max(0.1),
            next_report: 0.0,
        }
    }
}

impl SessionObserver for ConsoleReporter {
    fn on_state_change(&mut self, state: SessionState) {
        println!("[{}]", state);
        if state == SessionState::Playing && self.next_report == 0.0 {
            self.next_report = self.report_every;
        }
    }

    fn on_timer_update(&mut self, elapsed: f64, remaining: f64, duration: f64) {
        if elapsed + 1e-9 >= self.next_report || remaining <= 0.0 {
            println!(
                "  {} / {}  ({} left)",
                format_clock(elapsed),
                format_clock(duration),
                format_clock(remaining)
            );
            while self.next_report <= elapsed + 1e-9 {
                self.next_report += self.report_every;
            }
        }
    }
}

fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn load_preset(path: &Path, name: Option<&str>) -> anyhow::Result<Preset> {
    let library = PresetLibrary::from_json_file(path)
        .with_context(|| format!("failed to load presets from {}", path.display()))?;

    let preset = match name {
        Some(name) => library
            .find(name)
            .ok_or_else(|| anyhow!("no preset named '{}' in {}", name, path.display()))?,
        None => library
            .first()
            .ok_or_else(|| anyhow!("{} contains no presets", path.display()))?,
    };
    Ok(preset.clone())
}

/// List the presets in a file.
pub fn list_presets(path: &Path) -> anyhow::Result<()> {
    info!("Listing presets in: {}", path.display());

    let library = PresetLibrary::from_json_file(path)
        .with_context(|| format!("failed to load presets from {}", path.display()))?;

    if library.is_empty() {
        println!("No presets found.");
        return Ok(());
    }

    println!("{:<28} {:>8} {:>7}", "Name", "Duration", "Voices");
    println!("{:-<45}", "");
    for preset in library.iter() {
        let duration = preset
            .header
            .duration
            .map(format_clock)
            .unwrap_or_else(|| "default".to_string());
        println!(
            "{:<28} {:>8} {:>7}",
            preset.name().unwrap_or("(unnamed)"),
            duration,
            preset.voices.len()
        );
    }

    Ok(())
}

/// Show how a preset resolves without starting a session.
pub fn inspect(path: &Path, name: Option<&str>, config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let preset = load_preset(path, name)?;
    info!("Inspecting preset: {}", preset.name().unwrap_or("(unnamed)"));

    let duration = preset.duration_or(config.default_duration_secs);
    println!("Preset:   {}", preset.name().unwrap_or("(unnamed)"));
    println!("Duration: {} ({:.0}s)", format_clock(duration), duration);
    println!("Master:   {:.3}", config.master_volume);
    println!();
    println!(
        "{:>3}  {:<22} {:>7} {:>9}  {}",
        "#", "Kind", "Volume", "Effective", "Breathing"
    );
    println!("{:-<70}", "");

    for (position, descriptor) in preset.voices.iter().enumerate() {
        let Some(kind) = descriptor.kind() else {
            println!(
                "{:>3}  {:<22} skipped: unknown type",
                position, descriptor.voice_type
            );
            continue;
        };

        let mut params = match descriptor.params() {
            Ok(params) => params,
            Err(e) => {
                println!("{:>3}  {:<22} skipped: {}", position, kind, e);
                continue;
            }
        };
        params.clamp_breathing_periods(config.min_breathing_period_secs);

        let volume = config.initial_volume(kind, descriptor.initial_volume);
        let breathing = params
            .breathing()
            .map(|b| {
                format!(
                    "{:.2}s -> {:.2}s over {:.0}s (in {:.1}s / out {:.1}s)",
                    b.mp0, b.mp1, b.md, b.inhale_dur, b.exhale_dur
                )
            })
            .unwrap_or_default();

        println!(
            "{:>3}  {:<22} {:>7.3} {:>9.4}  {}",
            position,
            kind,
            volume,
            config.master_volume * volume,
            breathing
        );
    }

    Ok(())
}

/// Options for a simulated session
#[derive(Debug, Clone, Default)]
pub struct SimulateOptions {
    pub master: Option<f32>,
    pub duration: Option<f64>,
    pub pace: Vec<PaceStep>,
    pub report_every: f64,
}

/// Run a whole session in virtual time.
pub fn simulate(
    path: &Path,
    name: Option<&str>,
    config: Option<&Path>,
    options: SimulateOptions,
) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let mut preset = load_preset(path, name)?;
    if let Some(duration) = options.duration {
        if !(duration.is_finite() && duration > 0.0) {
            bail!("duration must be a positive number of seconds, got {}", duration);
        }
        preset.header.duration = Some(duration);
    }

    let clock = ManualClock::new();
    let mut engine = SessionEngine::headless(config, Rc::new(clock.clone()))
        .with_observer(Box::new(ConsoleReporter::new(options.report_every)));
    if let Some(master) = options.master {
        engine.set_master_volume(master);
    }

    println!(
        "Simulating '{}' for {}",
        preset.name().unwrap_or("(unnamed)"),
        format_clock(preset.duration_or(engine.config().default_duration_secs))
    );
    engine.load_preset(preset);
    engine.start();
    if engine.state() != SessionState::Playing {
        bail!("session did not start");
    }

    for voice in engine.voices() {
        println!("  voice {}: {} @ {:.3}", voice.index, voice.kind, voice.volume);
    }

    let mut pending = options.pace;
    pending.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
    let mut pending = pending.into_iter().peekable();

    while engine.state() != SessionState::Idle {
        let Some(next) = engine.next_due() else {
            break;
        };
        clock.set(next);

        while let Some(step) = pending.next_if(|step| step.at_secs <= engine.elapsed_time()) {
            apply_pace_step(&mut engine, &step);
        }

        engine.poll();
    }

    for step in pending {
        println!("  pace change at {:.0}s not reached", step.at_secs);
    }
    println!("Session complete.");

    engine.destroy();
    Ok(())
}

fn apply_pace_step(engine: &mut SessionEngine, step: &PaceStep) {
    let index = step.voice.or_else(|| {
        engine
            .voices()
            .iter()
            .find(|voice| voice.kind.is_breathing())
            .map(|voice| voice.index)
    });

    let Some(index) = index else {
        println!("  {:.0}s: no breathing voice to adjust", step.at_secs);
        return;
    };

    match engine.adjust_breathing_pace(index, step.direction) {
        Some((mp0, mp1)) => println!(
            "  {}: voice {} {} -> mp0 {:.3}s, mp1 {:.3}s",
            format_clock(engine.elapsed_time()),
            index,
            step.direction,
            mp0,
            mp1
        ),
        None => println!("  {:.0}s: voice {} is not breathing-capable", step.at_secs, index),
    }
}

/// Run a session against the wall clock.
#[cfg(feature = "realtime")]
pub fn play(
    path: &Path,
    name: Option<&str>,
    config: Option<&Path>,
    master: Option<f32>,
    report_every: f64,
) -> anyhow::Result<()> {
    use crate::engine::{run_until_idle_or_interrupt, TokioClock};

    let config = load_config(config)?;
    let preset = load_preset(path, name)?;
    let poll_every = config.animation_interval();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    runtime.block_on(async {
        let mut engine = SessionEngine::headless(config, Rc::new(TokioClock::new()))
            .with_observer(Box::new(ConsoleReporter::new(report_every)));
        if let Some(master) = master {
            engine.set_master_volume(master);
        }

        println!("Playing '{}'", preset.name().unwrap_or("(unnamed)"));
        engine.load_preset(preset);
        engine.start();
        run_until_idle_or_interrupt(&mut engine, poll_every).await;
        engine.destroy();
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn preset_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_pace_step_parsing() {
        let step: PaceStep = "30:faster".parse().unwrap();
        assert_eq!(step.at_secs, 30.0);
        assert_eq!(step.voice, None);
        assert_eq!(step.direction, PaceDirection::Increase);

        let step: PaceStep = "12.5:2:decrease".parse().unwrap();
        assert_eq!(step.voice, Some(2));
        assert_eq!(step.direction, PaceDirection::Decrease);

        assert!("faster".parse::<PaceStep>().is_err());
        assert!("-3:faster".parse::<PaceStep>().is_err());
        assert!("10:x:faster".parse::<PaceStep>().is_err());
        assert!("10:sideways".parse::<PaceStep>().is_err());
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(61.4), "01:01");
        assert_eq!(format_clock(900.0), "15:00");
    }

    #[test]
    fn test_load_preset_by_name() {
        let file = preset_file(
            r#"[{"_id":"a","header":{"d":60},"voices":[]},
                {"_id":"b","header":{"med2":"Second","d":30},"voices":[]}]"#,
        );
        let preset = load_preset(file.path(), Some("second")).unwrap();
        assert_eq!(preset.header.duration, Some(30.0));

        assert!(load_preset(file.path(), Some("missing")).is_err());
        assert_eq!(load_preset(file.path(), None).unwrap().id.as_deref(), Some("a"));
    }

    #[test]
    fn test_simulate_runs_to_completion() {
        let file = preset_file(
            r#"{"header":{"d":20},"voices":[{"type":"Martigli","mp0":4,"mp1":8,"md":10}]}"#,
        );
        let options = SimulateOptions {
            master: Some(0.5),
            duration: None,
            pace: vec!["5:faster".parse().unwrap()],
            report_every: 5.0,
        };
        assert!(simulate(file.path(), None, None, options).is_ok());
    }

    #[test]
    fn test_simulate_rejects_bad_duration() {
        let file = preset_file(r#"{"header":{"d":20},"voices":[]}"#);
        let options = SimulateOptions {
            duration: Some(-1.0),
            report_every: 5.0,
            ..Default::default()
        };
        assert!(simulate(file.path(), None, None, options).is_err());
    }
}
