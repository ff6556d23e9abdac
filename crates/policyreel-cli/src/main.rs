mod providers;
mod storyboard_gen;
mod tts;
mod video_jobs;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;

use policyreel_core::{ReelConfig, StoryboardRules, CONFIG_FILE_NAME};
use policyreel_ir::validate::{validate_segments, validate_storyboard};
use policyreel_ir::{BackgroundClips, Segment, Storyboard};
use policyreel_timeline::{
    layout_segments, narration_units, ExportManifest, PlanMode, Timeline,
};

#[derive(Parser)]
#[command(
    name = "policyreel",
    version,
    about = "Policyreel: turn policy text into a narrated training video",
    long_about = "Policyreel structures a policy document into a storyboard, narrates it,\nand plans a frame-exact timeline that preview and export render identically."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Inputs shared by every planning command.
#[derive(Args)]
struct PlanInputs {
    /// Path to the storyboard JSON
    #[arg()]
    storyboard: PathBuf,

    /// Narration segments JSON (`[{text,start,duration,url}]`); enables segment-driven timing
    #[arg(long)]
    segments: Option<PathBuf>,

    /// Background clips JSON (`[intro, module-0, ..., summary]`, entries may be null)
    #[arg(long)]
    clips: Option<PathBuf>,

    /// Config file (default: ./policyreel.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan the timeline and print it as JSON
    Plan {
        #[command(flatten)]
        inputs: PlanInputs,

        /// Write the timeline to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show which scenes are visible at a frame and how they blend
    Inspect {
        #[command(flatten)]
        inputs: PlanInputs,

        /// Frame number to sample
        #[arg(long)]
        frame: u64,
    },

    /// Write the export manifest consumed by the headless renderer
    Export {
        #[command(flatten)]
        inputs: PlanInputs,

        /// Manifest output path
        #[arg(short, long, default_value = "output/manifest.json")]
        output: PathBuf,
    },

    /// Check a storyboard (and optional segments) against the configured rules
    Validate {
        /// Path to the storyboard JSON
        #[arg()]
        storyboard: PathBuf,

        #[arg(long)]
        segments: Option<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate storyboard, narration and background clips from a policy document
    Generate {
        /// Plain-text policy document
        #[arg()]
        policy: PathBuf,

        /// Narration and on-screen language
        #[arg(long, default_value = "en")]
        language: String,

        /// Directory for generated artifacts
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip speech synthesis and plan with fixed scene lengths
        #[arg(long)]
        no_narration: bool,
    },

    /// Write a default policyreel.toml
    Init {
        /// Directory to write the config into
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Show version and effective defaults
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Plan { inputs, output } => cmd_plan(&inputs, output.as_deref()),
        Commands::Inspect { inputs, frame } => cmd_inspect(&inputs, frame),
        Commands::Export { inputs, output } => cmd_export(&inputs, &output),
        Commands::Validate {
            storyboard,
            segments,
            config,
        } => cmd_validate(&storyboard, segments.as_deref(), config.as_deref()),
        Commands::Generate {
            policy,
            language,
            out_dir,
            config,
            no_narration,
        } => cmd_generate(&policy, &language, &out_dir, config.as_deref(), no_narration),
        Commands::Init { dir, force } => cmd_init(&dir, force),
        Commands::Info => cmd_info(),
    }
}

struct LoadedInputs {
    storyboard: Storyboard,
    segments: Option<Vec<Segment>>,
    clips: Option<BackgroundClips>,
    config: ReelConfig,
}

impl LoadedInputs {
    fn timeline(&self) -> Result<Timeline> {
        Timeline::build(
            &self.storyboard,
            self.segments.as_deref(),
            self.clips.as_ref(),
            &self.config.timeline,
            &self.config.output,
        )
        .context("failed to plan timeline")
    }
}

fn load_config(path: Option<&Path>) -> Result<ReelConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let default = PathBuf::from(CONFIG_FILE_NAME);
            if !default.exists() {
                tracing::debug!("no {} found, using defaults", CONFIG_FILE_NAME);
                return Ok(ReelConfig::default());
            }
            default
        }
    };
    ReelConfig::load_from_file(&path)
        .with_context(|| format!("failed to load config: {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}: {}", what, path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid {} JSON: {}", what, path.display()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

fn ensure_valid(
    storyboard: &Storyboard,
    segments: Option<&[Segment]>,
    rules: &StoryboardRules,
) -> Result<()> {
    let mut msgs: Vec<String> = Vec::new();
    if let Err(errors) = validate_storyboard(storyboard, rules) {
        msgs.extend(errors.iter().map(|e| e.to_string()));
    }
    if let Some(segments) = segments {
        if let Err(errors) = validate_segments(segments) {
            msgs.extend(errors.iter().map(|e| e.to_string()));
        }
    }
    if !msgs.is_empty() {
        anyhow::bail!("invalid input:\n  {}", msgs.join("\n  "));
    }
    Ok(())
}

/// Load and structurally validate planning inputs. Module and overview
/// counts are not enforced here; the planner accepts any shape.
fn load_inputs(inputs: &PlanInputs) -> Result<LoadedInputs> {
    let config = load_config(inputs.config.as_deref())?;
    let storyboard: Storyboard = read_json(&inputs.storyboard, "storyboard")?;
    let segments: Option<Vec<Segment>> = inputs
        .segments
        .as_deref()
        .map(|p| read_json(p, "segments"))
        .transpose()?;
    let clips: Option<BackgroundClips> = inputs
        .clips
        .as_deref()
        .map(|p| read_json(p, "background clips"))
        .transpose()?;

    let rules = StoryboardRules {
        strict_counts: false,
        ..config.storyboard.clone()
    };
    ensure_valid(&storyboard, segments.as_deref(), &rules)?;

    tracing::debug!(
        mode = %PlanMode::select(segments.as_deref()),
        modules = storyboard.modules.len(),
        "loaded inputs"
    );

    Ok(LoadedInputs {
        storyboard,
        segments,
        clips,
        config,
    })
}

fn cmd_plan(inputs: &PlanInputs, output: Option<&Path>) -> Result<()> {
    let loaded = load_inputs(inputs)?;
    let timeline = loaded.timeline()?;

    match output {
        Some(path) => {
            write_json(path, &timeline)?;
            println!(
                "✓ Planned {} scenes, {} frames @ {} fps -> {}",
                timeline.scenes.len(),
                timeline.duration_in_frames,
                timeline.fps,
                path.display()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&timeline)?),
    }
    Ok(())
}

fn cmd_inspect(inputs: &PlanInputs, frame: u64) -> Result<()> {
    let loaded = load_inputs(inputs)?;
    let timeline = loaded.timeline()?;

    println!(
        "Frame {} / {} ({:.2}s)",
        frame,
        timeline.duration_in_frames,
        frame as f64 / timeline.fps
    );

    let visible = timeline.sample(frame);
    if visible.is_empty() {
        println!("   (past the end of the composition)");
        return Ok(());
    }

    for v in visible {
        let scene = &timeline.scenes[v.scene_index];
        let content = scene.content(&loaded.storyboard);
        println!(
            "   #{} {:<12} frames {}..{}  opacity {:.3}  entrance {:.3}  \"{}\"",
            v.scene_index,
            scene.kind.to_string(),
            scene.start_frame,
            scene.end_frame(),
            v.opacity,
            v.entrance,
            content.heading
        );
        if let Some(clip) = &scene.background_clip {
            println!("      background: {}", clip);
        }
    }
    Ok(())
}

fn cmd_export(inputs: &PlanInputs, output: &Path) -> Result<()> {
    let start = Instant::now();
    let loaded = load_inputs(inputs)?;
    let segments = loaded.segments.clone().unwrap_or_default();
    let clips = loaded.clips.clone().unwrap_or_default();

    let manifest = ExportManifest::build(
        &loaded.storyboard,
        &segments,
        &clips,
        &loaded.config.timeline,
        &loaded.config.output,
    )
    .context("failed to build export manifest")?;

    // The preview path plans from the same inputs; both must agree.
    let preview = loaded.timeline()?;
    let preview_hash = preview.fingerprint()?.to_hex();
    if preview_hash != manifest.fingerprint {
        anyhow::bail!(
            "export timeline {} differs from preview timeline {}",
            manifest.fingerprint,
            preview_hash
        );
    }
    manifest.verify().context("export manifest failed verification")?;

    manifest
        .write_to(output)
        .with_context(|| format!("failed to write manifest: {}", output.display()))?;

    println!("✓ Exported {}", output.display());
    println!(
        "   {} scenes, {} frames @ {} fps ({}x{})",
        manifest.timeline.scenes.len(),
        manifest.composition.duration_in_frames,
        manifest.composition.fps,
        manifest.composition.width,
        manifest.composition.height
    );
    println!("   fingerprint {}", &manifest.fingerprint[..16]);
    println!("   done in {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}

fn cmd_validate(storyboard: &Path, segments: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let sb: Storyboard = read_json(storyboard, "storyboard")?;
    let segs: Option<Vec<Segment>> = segments
        .map(|p| read_json(p, "segments"))
        .transpose()?;

    println!("🔍 Checking {}", storyboard.display());
    ensure_valid(&sb, segs.as_deref(), &config.storyboard)?;

    println!(
        "   ✓ {} overview points, {} modules, {} quiz questions",
        sb.overview.len(),
        sb.modules.len(),
        sb.quiz.len()
    );
    if let Some(segs) = &segs {
        let natural = sb.natural_segment_count();
        println!("   ✓ {} segments", segs.len());
        if segs.len() != natural {
            println!(
                "   ⚠ storyboard narrates {} units; segments will be clamped or leave scenes out",
                natural
            );
        }
    }
    Ok(())
}

fn cmd_generate(
    policy: &Path,
    language: &str,
    out_dir: &Path,
    config: Option<&Path>,
    no_narration: bool,
) -> Result<()> {
    let config = load_config(config)?;
    let policy_text = std::fs::read_to_string(policy)
        .with_context(|| format!("failed to read policy: {}", policy.display()))?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir: {}", out_dir.display()))?;

    println!("📝 Structuring {}", policy.display());
    let storyboard = storyboard_gen::generate_storyboard(
        &policy_text,
        language,
        &config.providers.llm,
        &config.storyboard,
    );
    write_json(&out_dir.join("storyboard.json"), &storyboard)?;
    println!("   ✓ \"{}\" with {} modules", storyboard.title, storyboard.modules.len());

    let segments = if no_narration {
        Vec::new()
    } else {
        println!("🔊 Narrating");
        match narrate(&storyboard, &config, out_dir) {
            Ok(segments) => {
                println!("   ✓ {} narration clips", segments.len());
                segments
            }
            Err(e) => {
                tracing::warn!("narration failed, planning with fixed scene lengths: {:#}", e);
                Vec::new()
            }
        }
    };
    write_json(&out_dir.join("segments.json"), &segments)?;

    let clips = if config.providers.video.enabled {
        println!("🎞  Generating background clips");
        match video_jobs::HttpVideoBackend::from_config(
            &config.providers.video,
            config.output.width,
            config.output.height,
        ) {
            Ok(backend) => video_jobs::generate_background_clips(
                &storyboard,
                &backend,
                video_jobs::PollSettings::from(&config.providers.video),
                &video_jobs::CancelToken::new(),
            ),
            Err(e) => {
                tracing::warn!("background video disabled: {:#}", e);
                BackgroundClips::default()
            }
        }
    } else {
        BackgroundClips::default()
    };
    write_json(&out_dir.join("clips.json"), &clips)?;

    let manifest = ExportManifest::build(
        &storyboard,
        &segments,
        &clips,
        &config.timeline,
        &config.output,
    )
    .context("failed to build export manifest")?;
    let manifest_path = out_dir.join("manifest.json");
    manifest
        .write_to(&manifest_path)
        .with_context(|| format!("failed to write manifest: {}", manifest_path.display()))?;

    println!(
        "✓ {} scenes, {:.1}s -> {}",
        manifest.timeline.scenes.len(),
        manifest.composition.duration_in_frames as f64 / manifest.composition.fps,
        manifest_path.display()
    );
    Ok(())
}

fn narrate(storyboard: &Storyboard, config: &ReelConfig, out_dir: &Path) -> Result<Vec<Segment>> {
    let client = tts::TtsClient::from_config(&config.providers.tts)?;
    let cache_root = providers::resolve_cache_root(config)?;
    let units = narration_units(storyboard);
    let clips = tts::synthesize_narration(&client, &units, &cache_root, out_dir)?;
    Ok(layout_segments(
        &clips,
        config.timeline.title_card_seconds,
        config.providers.tts.gap_seconds,
    ))
}

fn cmd_init(dir: &Path, force: bool) -> Result<()> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;
    ReelConfig::default()
        .save_to_file(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("✓ Wrote {}", path.display());
    Ok(())
}

fn cmd_info() -> Result<()> {
    let config = ReelConfig::default();
    let t = &config.timeline;
    println!("🎬 Policyreel");
    println!("   Version:     {}", env!("CARGO_PKG_VERSION"));
    println!("   Frame rate:  {} fps", t.fps);
    println!(
        "   Scenes:      intro {}f, module {}f, summary {}f, handle {}f",
        t.intro_frames(),
        t.module_frames(),
        t.summary_frames(),
        t.handle_frames
    );
    println!(
        "   Narration:   title card {}f, tail {}f",
        t.title_card_frames(),
        t.tail_buffer_frames()
    );
    println!("   Crossfade:   {}", t.crossfade);
    println!("   Output:      {}x{}", config.output.width, config.output.height);
    println!("   Config file: {}", CONFIG_FILE_NAME);
    Ok(())
}
