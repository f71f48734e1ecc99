use gantt_rs::api::{GanttConfig, GanttEngine};
use gantt_rs::render::NullRenderer;
use std::fs;
use std::path::PathBuf;

const USAGE: &str = "usage: gantt_layout_dump --input <config.json> [--output <model.json>] [--expand <id>]... [--scroll-left <px>] [--width <px>] [--log <filter>]";

#[derive(Debug)]
struct CliArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    expand: Vec<String>,
    scroll_left: f64,
    width: Option<f64>,
    log: Option<String>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let _ = match &args.log {
        Some(filter) => gantt_rs::telemetry::init_tracing(filter),
        None => gantt_rs::telemetry::init_default_tracing(),
    };
    let raw = fs::read_to_string(&args.input)
        .map_err(|err| format!("failed to read `{}`: {err}", args.input.display()))?;
    let config = GanttConfig::from_json_str(&raw).map_err(|err| err.to_string())?;
    let mut engine =
        GanttEngine::new(NullRenderer::default(), config).map_err(|err| err.to_string())?;

    for id in &args.expand {
        engine.set_row_expanded(id.as_str(), true);
    }
    if let Some(width) = args.width {
        engine
            .resize_viewport(width, 0.0)
            .map_err(|err| err.to_string())?;
    }
    engine
        .scroll_timeline(args.scroll_left, 0.0)
        .map_err(|err| err.to_string())?;

    let json = engine
        .render_model_json_contract_v1_pretty()
        .map_err(|err| err.to_string())?;
    match &args.output {
        Some(path) => fs::write(path, json)
            .map_err(|err| format!("failed to write `{}`: {err}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn parse_number(flag: &str, value: Option<String>) -> Result<f64, String> {
    let value = value.ok_or_else(|| format!("missing value for {flag}"))?;
    value
        .parse::<f64>()
        .map_err(|err| format!("invalid value `{value}` for {flag}: {err}"))
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut input = None::<PathBuf>;
    let mut output = None::<PathBuf>;
    let mut expand = Vec::new();
    let mut scroll_left = 0.0;
    let mut width = None::<f64>;
    let mut log = None::<String>;

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--input" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --input".to_owned())?;
                input = Some(PathBuf::from(value));
            }
            "--output" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --output".to_owned())?;
                output = Some(PathBuf::from(value));
            }
            "--expand" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --expand".to_owned())?;
                expand.push(value);
            }
            "--scroll-left" => scroll_left = parse_number("--scroll-left", args.next())?,
            "--width" => width = Some(parse_number("--width", args.next())?),
            "--log" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --log".to_owned())?;
                log = Some(value);
            }
            "--help" | "-h" => return Err(USAGE.to_owned()),
            _ => return Err(format!("unknown argument `{flag}`")),
        }
    }

    let input = input.ok_or_else(|| format!("missing --input\n{USAGE}"))?;
    Ok(CliArgs {
        input,
        output,
        expand,
        scroll_left,
        width,
        log,
    })
}
