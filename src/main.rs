use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use wavefx::{
    Analyzed, AppConfig, CpalOutput, DisabledPlayback, EffectForm, EffectKind, Param, Playback,
    PlaybackEvent, PlaybackState, Session,
};

#[derive(Parser, Debug)]
#[command(name = "wavefx")]
#[command(author, version, about = "Apply audio effects to whole recordings", long_about = None)]
struct Args {
    /// Audio file to load at startup
    file: Option<PathBuf>,

    /// Config file to use instead of the platform default
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where "play fx" writes the processed signal
    #[arg(long)]
    artifact: Option<PathBuf>,

    /// Don't open an audio device
    #[arg(long)]
    no_audio: bool,

    /// Effect to select (batch mode with --output)
    #[arg(long, value_parser = parse_effect)]
    effect: Option<EffectKind>,

    /// Parameter field, e.g. --set frequency=5 (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    set: Vec<(Param, String)>,

    /// Shift pitch instead of stretching time for PitchShift
    #[arg(long)]
    true_pitch_shift: bool,

    /// Apply once and write the result here, then exit
    #[arg(long, requires = "effect")]
    output: Option<PathBuf>,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    write_config: bool,
}

fn parse_effect(s: &str) -> Result<EffectKind, String> {
    EffectKind::from_name(s).ok_or_else(|| {
        let names: Vec<_> = EffectKind::ALL.iter().map(|k| format!("{:?}", k)).collect();
        format!("unknown effect '{}' (expected one of {})", s, names.join(", "))
    })
}

fn parse_param(s: &str) -> Result<Param, String> {
    Param::from_name(s).ok_or_else(|| {
        let names: Vec<_> = Param::ALL.iter().map(|p| p.key()).collect();
        format!("unknown parameter '{}' (expected one of {})", s, names.join(", "))
    })
}

fn parse_assignment(s: &str) -> Result<(Param, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    Ok((parse_param(name)?, value.to_string()))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let loaded = AppConfig::try_load(args.config.as_deref());
    let mut config = loaded.as_ref().cloned().unwrap_or_default();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.clone()),
    )
    .init();

    if let Err(e) = &loaded {
        log::warn!("Failed to load config: {}; using defaults", e);
    }
    if let Some(artifact) = &args.artifact {
        config.artifact_path = artifact.clone();
    }

    if args.write_config {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => AppConfig::config_path()?,
        };
        config.save_to(&path)?;
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    let mut form = EffectForm::new();
    form.selected = args.effect;
    form.true_pitch_shift = args.true_pitch_shift;
    for (param, value) in &args.set {
        form.params.set(*param, value.clone());
    }

    if let Some(output) = &args.output {
        let input = args
            .file
            .as_deref()
            .ok_or_else(|| anyhow!("batch mode needs an input FILE"))?;
        return run_batch(&config, &form, input, output);
    }

    // The stream stops when `_output` is dropped
    let (_output, playback): (Option<CpalOutput>, Box<dyn Playback>) = if args.no_audio {
        (None, Box::new(DisabledPlayback) as Box<dyn Playback>)
    } else {
        match CpalOutput::open(config.queue_capacity) {
            Ok((output, controller)) => {
                println!(
                    "Audio device: {} ({} Hz, {} channels)",
                    output.device_name(),
                    output.sample_rate(),
                    output.channels()
                );
                (Some(output), Box::new(controller) as Box<dyn Playback>)
            }
            Err(e) => {
                log::warn!("{}; continuing without audio", e);
                (None, Box::new(DisabledPlayback) as Box<dyn Playback>)
            }
        }
    };

    let mut session = Session::new(playback, &config);
    if let Some(file) = &args.file {
        match session.load(file) {
            Ok(analyzed) => print_panel("Original", analyzed),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    run_repl(&mut session, &mut form)
}

fn run_batch(config: &AppConfig, form: &EffectForm, input: &Path, output: &Path) -> anyhow::Result<()> {
    let mut session = Session::new(DisabledPlayback, config);

    let original = session
        .load(input)
        .with_context(|| format!("loading {}", input.display()))?;
    print_panel("Original", original);

    let processed = session.apply(form).context("applying effect")?;
    print_panel("Processed", processed);

    session
        .save_processed(output)
        .with_context(|| format!("saving {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn run_repl(session: &mut Session<Box<dyn Playback>>, form: &mut EffectForm) -> anyhow::Result<()> {
    print_help();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        report_events(session);

        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let rest: Vec<&str> = parts.collect();

        let result = match command {
            "q" | "quit" | "exit" => break,
            "h" | "help" => {
                print_help();
                Ok(())
            }
            _ => run_command(session, form, command, &rest),
        };

        // Failures end the step, never the session
        if let Err(e) = result {
            eprintln!("Error: {:#}", e);
        }
    }

    session.stop();
    Ok(())
}

fn run_command(
    session: &mut Session<Box<dyn Playback>>,
    form: &mut EffectForm,
    command: &str,
    rest: &[&str],
) -> anyhow::Result<()> {
    match command {
        "load" | "open" => {
            if rest.is_empty() {
                bail!("usage: load <file>");
            }
            let path = PathBuf::from(rest.join(" "));
            let analyzed = session.load(&path)?;
            print_panel("Original", analyzed);
        }
        "effect" | "fx" => {
            let name = rest.join(" ");
            let kind = parse_effect(&name).map_err(|e| anyhow!(e))?;
            form.select(kind);
            println!("Selected {}", kind);
            print_params(form);
        }
        "set" => {
            let (name, value) = rest
                .split_first()
                .ok_or_else(|| anyhow!("usage: set <param> [value]"))?;
            let param = parse_param(name).map_err(|e| anyhow!(e))?;
            form.params.set(param, value.join(" "));
        }
        "unset" => {
            let name = rest.first().ok_or_else(|| anyhow!("usage: unset <param>"))?;
            form.params.clear(parse_param(name).map_err(|e| anyhow!(e))?);
        }
        "pitch" => {
            form.true_pitch_shift = match rest.first().copied() {
                Some("on") => true,
                Some("off") => false,
                None => !form.true_pitch_shift,
                Some(other) => bail!("usage: pitch on|off (got '{}')", other),
            };
            println!(
                "True pitch shift {}",
                if form.true_pitch_shift { "on" } else { "off" }
            );
        }
        "params" => print_params(form),
        "apply" => {
            let processed = session.apply(form)?;
            print_panel("Processed", processed);
        }
        "play" | "p" => {
            let id = match rest.first().copied() {
                Some("fx") | Some("processed") | Some("after") => session.play_processed()?,
                None | Some("original") | Some("before") => session.play_original()?,
                Some(other) => bail!("usage: play [fx] (got '{}')", other),
            };
            println!("Playing (request {})", id);
        }
        "stop" | "s" => {
            session.stop();
            println!("Stopped");
        }
        "save" => {
            if rest.is_empty() {
                bail!("usage: save <file>");
            }
            let path = PathBuf::from(rest.join(" "));
            session.save_processed(&path)?;
            println!("Saved {}", path.display());
        }
        "info" => print_info(session),
        other => bail!("unknown command '{}' (type 'help')", other),
    }
    Ok(())
}

fn report_events(session: &mut Session<Box<dyn Playback>>) {
    for event in session.playback_mut().poll_events() {
        match event {
            PlaybackEvent::Finished(id) => println!("Playback {} finished", id),
            PlaybackEvent::Stopped(id) => log::debug!("Playback {} stopped", id),
            PlaybackEvent::Started(id) => log::debug!("Playback {} started", id),
        }
    }
}

fn print_panel(label: &str, analyzed: &Analyzed) {
    let signal = &analyzed.signal;
    let grid = &analyzed.spectrogram;
    println!(
        "{}: {} samples @ {} Hz ({:.2}s), peak {:.3}, spectrogram {}x{} (max power {:.3e})",
        label,
        signal.len(),
        signal.sample_rate(),
        signal.duration(),
        signal.peak(),
        grid.num_frames(),
        grid.num_bins(),
        grid.max_power()
    );
}

fn print_params(form: &EffectForm) {
    let Some(kind) = form.selected else {
        println!("No effect selected");
        return;
    };

    println!("{} parameters:", kind);
    if kind.params().is_empty() {
        println!("  (none)");
    }
    for &param in kind.params() {
        match form.params.get(param) {
            Some(text) => println!("  {:<14} = {:?}", param.key(), text),
            None => println!("  {:<14}   (empty)", param.key()),
        }
    }
    if kind == EffectKind::PitchShift {
        println!(
            "  true pitch shift {}",
            if form.true_pitch_shift { "on" } else { "off (time stretch)" }
        );
    }
}

fn print_info(session: &Session<Box<dyn Playback>>) {
    match session.source_path() {
        Some(path) => println!("File: {}", path.display()),
        None => println!("File: (none)"),
    }
    if let Some(original) = session.original() {
        print_panel("Original", original);
    }
    match (session.processed(), session.last_transform()) {
        (Some(processed), Some(name)) => print_panel(&format!("Processed [{}]", name), processed),
        (Some(processed), None) => print_panel("Processed", processed),
        _ => println!("Processed: (none)"),
    }
    println!("Artifact: {}", session.artifact_path().display());
    match session.playback_state() {
        PlaybackState::Idle => println!("Playback: idle"),
        PlaybackState::Playing(id) => println!("Playback: playing (request {})", id),
    }
}

fn print_help() {
    println!("\nCommands:");
    println!("  load <file>        - Load an audio file (mixed down to mono)");
    println!("  effect <name>      - Select an effect:");
    println!("                       tremolo, overdrive, distortion, tube, echo,");
    println!("                       delay, wahwah, pitchshift, phaser");
    println!("  set <param> [val]  - Set a parameter field (no value = empty field)");
    println!("  unset <param>      - Clear a parameter field");
    println!("  pitch on|off       - True pitch shift (off: PitchShift stretches time)");
    println!("  params             - Show the selected effect's fields");
    println!("  apply              - Apply the effect to the original signal");
    println!("  play [fx]          - Play the original (or processed) signal");
    println!("  stop               - Stop playback");
    println!("  save <file>        - Save the processed signal as WAV");
    println!("  info               - Show both signals");
    println!("  h, help            - Show this help");
    println!("  q, quit            - Quit");
    println!();
}
