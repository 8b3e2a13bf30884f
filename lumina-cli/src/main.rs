//! Lumina grid CLI.

mod cli;

use std::fs;
use std::fs::File;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use lumina::Action;
use lumina::ExportScope;
use lumina::Grid;
use lumina::HeadlessSurface;
use lumina::Patch;
use lumina::WidgetPayload;
use lumina::query::PipelineMode;
use lumina_cli::LogBridge;
use lumina_cli::exporters::FileExporter;
use lumina_cli::script::Step;
use lumina_cli::table::render_frame;
use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&cli) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    if let Err(error) = run(&cli) {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level: LevelFilter = cli.log_level.into();
    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            WriteLogger::init(level, Config::default(), file)?;
        }
        None => TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?,
    }
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let text = fs::read_to_string(&cli.payload)
        .with_context(|| format!("reading {}", cli.payload.display()))?;
    let payload = WidgetPayload::from_json(&text).context("decoding widget payload")?;
    let mut grid = Grid::new(payload)?.with_bridge(Box::new(LogBridge));
    let mut surface = HeadlessSurface {
        viewport_height: cli.viewport,
        ..HeadlessSurface::default()
    };
    let initial = grid.render(&surface);
    surface.apply(&initial);

    for (i, raw) in cli.actions.iter().enumerate() {
        let step: Step = raw
            .parse()
            .with_context(|| format!("action {} ({:?})", i + 1, raw))?;
        let now = Instant::now();
        let patch = match step {
            Step::Act(action) => grid.dispatch(action, &mut surface, now),
            Step::ScrollTo(px) => {
                surface.scroll_top = px;
                grid.dispatch(Action::Scroll, &mut surface, now)
            }
            Step::Message(message) => grid.handle_host_message(&message, &mut surface, now),
        };
        surface.apply(&patch);

        // steps are discrete, so pending input settles before the next one
        if let Some(deadline) = grid.scheduler().next_deadline() {
            let patch = grid.tick(deadline, &mut surface);
            surface.apply(&patch);
        }
        let patch = grid.animation_frame(&mut surface);
        surface.apply(&patch);
    }

    let Patch::Full(frame) = grid.render(&surface) else {
        anyhow::bail!("full render produced a partial patch");
    };
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&frame)?);
    } else {
        print!("{}", render_frame(&frame));
    }
    if grid.options().pipeline_mode == PipelineMode::Remote {
        println!("remote query: {}", serde_json::to_string(&grid.remote_query())?);
    }

    if let Some(format) = &cli.export {
        let scope = if cli.export_all {
            ExportScope::All
        } else {
            ExportScope::CurrentView
        };
        let file = grid.export(scope, format, &FileExporter)?;
        if scope == ExportScope::CurrentView && !file.plan.exclusions.is_empty() {
            eprintln!("note: export leaves out {}", file.plan.exclusions);
        }
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("creating {}", cli.out_dir.display()))?;
        let path = cli.out_dir.join(&file.name);
        fs::write(&path, &file.bytes).with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {} ({} rows)", path.display(), file.plan.rows.len());
    }
    Ok(())
}
