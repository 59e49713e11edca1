use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use geo_proof_tutor::{
    config::{Config, LogFormat},
    diagram::{compile, export_to_file, DiagramOptions, ExportFormat},
    math::UnicodeMathRenderer,
    error::RenderError,
    model::ImagePayload,
    pipeline::{parse_model_output, AnalysisRequest, Gateway},
    report::render_report,
    session::{CompletionOutcome, Session},
    AppResult, GeometryResponse,
};

#[derive(Parser, Debug)]
#[command(name = "geo-tutor", version, about = "Geometry proof tutor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask the model for a backward-reasoning analysis of a problem
    Analyze {
        /// Problem statement
        #[arg(short, long, default_value = "")]
        text: String,

        /// Photo of the problem (png, jpeg, webp, gif)
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Feedback on a previous answer, for a refined analysis
        #[arg(short, long)]
        feedback: Option<String>,

        /// API key; overrides GEMINI_API_KEY
        #[arg(long)]
        api_key: Option<String>,

        /// Print the sanitized response as JSON instead of a report
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        diagram: DiagramArgs,
    },

    /// Compile a saved model response into Mermaid source, offline
    Diagram {
        /// File holding raw model output
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        diagram: DiagramArgs,
    },

    /// Convert a rendered SVG into an SVG or PNG file
    Export {
        /// Rendered diagram
        #[arg(long)]
        svg: PathBuf,

        /// Output file; the format follows the extension
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
struct DiagramArgs {
    /// Branch to draw, starting at 1
    #[arg(short, long, default_value_t = 1)]
    branch: usize,

    /// Write the diagram here (.mmd for source, .svg/.png for rendered output)
    #[arg(long)]
    diagram_out: Option<PathBuf>,

    /// Show the method under each statement
    #[arg(long)]
    show_method: bool,

    /// Hide arrows from claims to their sub-goals
    #[arg(long)]
    no_analysis_arrows: bool,

    /// Hide arrows from sub-goals to the claims they prove
    #[arg(long)]
    no_proof_arrows: bool,
}

impl DiagramArgs {
    fn options(&self, config: &Config) -> DiagramOptions {
        let mut options = DiagramOptions::from(&config.diagram);
        options.show_method |= self.show_method;
        options.analysis_arrows &= !self.no_analysis_arrows;
        options.proof_arrows &= !self.no_proof_arrows;
        options
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "Geo proof tutor starting");

    let result = match cli.command {
        Command::Analyze {
            text,
            image,
            feedback,
            api_key,
            json,
            diagram,
        } => run_analyze(config, text, image, feedback, api_key, json, diagram).await,
        Command::Diagram { input, diagram } => run_diagram(&config, &input, &diagram),
        Command::Export { svg, out } => run_export(&svg, &out),
    };

    if let Err(e) = &result {
        error!(error = %e, "Command failed");
    }
    result
}

async fn run_analyze(
    config: Config,
    text: String,
    image: Option<PathBuf>,
    feedback: Option<String>,
    api_key: Option<String>,
    json: bool,
    diagram: DiagramArgs,
) -> anyhow::Result<()> {
    let gateway = Gateway::from_config(&config, api_key)?;

    let mut request = AnalysisRequest::new(text);
    if let Some(path) = image {
        let payload = ImagePayload::from_path(&path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        request = request.with_image(payload);
    }
    if let Some(feedback) = feedback {
        request = request.with_feedback(feedback);
    }

    let mut session = Session::new();
    let pending = session.submit(request);
    let result = gateway.analyze(&pending.request).await;
    if session.complete(pending.ticket, result) != CompletionOutcome::Applied {
        bail!(session
            .last_error()
            .unwrap_or("Analysis did not complete")
            .to_string());
    }

    let Some(response) = session.response() else {
        bail!("Analysis did not complete");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        println!("{}", render_report(response, &UnicodeMathRenderer));
    }

    emit_diagram(&config, response, &diagram, !json)
}

fn run_diagram(config: &Config, input: &Path, diagram: &DiagramArgs) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let response = parse_model_output(&raw)?;
    emit_diagram(config, &response, diagram, true)
}

fn run_export(svg: &Path, out: &Path) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(svg)
        .with_context(|| format!("Failed to read {}", svg.display()))?;
    let format = export_to_file(&source, out)?;
    println!("Wrote {} ({})", out.display(), format.extension());
    Ok(())
}

fn emit_diagram(
    config: &Config,
    response: &GeometryResponse,
    args: &DiagramArgs,
    print_source: bool,
) -> anyhow::Result<()> {
    let index = args.branch.saturating_sub(1);
    let Some(branch) = response.branch(index) else {
        bail!(
            "Branch {} does not exist; the answer has {} branch(es)",
            args.branch,
            response.branches.len()
        );
    };

    let source = compile(Some(&branch.root), &args.options(config));

    match &args.diagram_out {
        None => {
            if print_source {
                println!("{}", source);
            }
        }
        Some(path) if path.extension().and_then(|e| e.to_str()) == Some("mmd") => {
            std::fs::write(path, &source)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        Some(path) => {
            ExportFormat::from_path(path)?;
            let svg = render_svg(&source)?;
            export_to_file(&svg, path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

#[cfg(feature = "mermaid")]
fn render_svg(source: &str) -> AppResult<String> {
    use geo_proof_tutor::diagram::{render_diagram, DiagramState, MermaidSvgRenderer};

    match render_diagram(&MermaidSvgRenderer::default(), source) {
        DiagramState::Rendered(svg) => Ok(svg),
        DiagramState::Failed(message) => Err(RenderError::Diagram { message }.into()),
    }
}

#[cfg(not(feature = "mermaid"))]
fn render_svg(_source: &str) -> AppResult<String> {
    Err(RenderError::Diagram {
        message: "rendering requires the `mermaid` feature; write .mmd source instead".to_string(),
    }
    .into())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
