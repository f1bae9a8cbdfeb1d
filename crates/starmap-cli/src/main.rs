use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use starmap_core::subgraph;
use starmap_core::{
    BorderRecord, LoadOptions, NodeRecord, Progress, RecordingHost, Rgba, StarmapConfig,
    ViewBox, Viewer,
};
use starmap_graphlib::Graph;
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Starmap(starmap_core::Error),
    Json(serde_json::Error),
    UnknownNode(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Starmap(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::UnknownNode(name) => write!(f, "Unknown node: {name}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<starmap_core::Error> for CliError {
    fn from(value: starmap_core::Error) -> Self {
        Self::Starmap(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Default)]
enum Command {
    #[default]
    Ingest,
    Highlight(String),
    Subgraph(String),
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    links: Option<String>,
    config: Option<String>,
    pretty: bool,
}

/// One link from the `--links` file: either `["from", "to"]` or `{"from": .., "to": ..}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LinkIn {
    Pair(String, String),
    Object { from: String, to: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClusterOut<'a> {
    id: &'a str,
    members: Vec<&'a str>,
    fill_color: Option<Rgba>,
    complementary_color: Option<Rgba>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IngestOut<'a> {
    view_box: Option<ViewBox>,
    nodes: Vec<&'a NodeRecord>,
    borders: &'a [BorderRecord],
    clusters: Vec<ClusterOut<'a>>,
    progress: Option<Progress>,
}

fn usage() -> &'static str {
    "starmap-cli\n\
\n\
USAGE:\n\
  starmap-cli [ingest] [--pretty] [--config <path>] [<path>|-]\n\
  starmap-cli highlight <node> --links <path> [--pretty] [--config <path>] [<path>|-]\n\
  starmap-cli subgraph <node> --links <path> [--pretty] [--config <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the SVG map is read from stdin.\n\
  - --links is a JSON array of [\"from\", \"to\"] pairs or {\"from\", \"to\"} objects.\n\
  - --config is a JSON object merged over the defaults (e.g. {\"maxLinks\": 5}).\n\
  - Set STARMAP_LOG (e.g. STARMAP_LOG=debug) to log ingestion to stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "ingest" => args.command = Command::Ingest,
            "highlight" | "subgraph" => {
                let Some(node) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.command = if a == "highlight" {
                    Command::Highlight(node.clone())
                } else {
                    Command::Subgraph(node.clone())
                };
            }
            "--pretty" => args.pretty = true,
            "--links" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.links = Some(path.clone());
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    let needs_links = !matches!(args.command, Command::Ingest);
    if needs_links && args.links.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn load_config(path: Option<&str>) -> Result<StarmapConfig, CliError> {
    match path {
        None => Ok(StarmapConfig::default()),
        Some(path) => Ok(StarmapConfig::from_json_str(&std::fs::read_to_string(path)?)?),
    }
}

fn load_links(path: &str) -> Result<Graph<(), ()>, CliError> {
    let links: Vec<LinkIn> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    let mut graph = Graph::new();
    for link in links {
        let (from, to) = match link {
            LinkIn::Pair(from, to) | LinkIn::Object { from, to } => (from, to),
        };
        graph.add_link(from, to, ());
    }
    tracing::debug!(
        nodes = graph.node_count(),
        links = graph.link_count(),
        "link graph loaded"
    );
    Ok(graph)
}

fn ingest_out(viewer: &Viewer<RecordingHost>) -> IngestOut<'_> {
    let session = viewer.session();

    let mut clusters: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for (id, members) in session.components() {
        clusters.insert(id, members.iter().map(String::as_str).collect());
    }
    for border in session.borders() {
        clusters.entry(border.cluster_id.as_str()).or_default();
    }

    IngestOut {
        view_box: session.view_box(),
        nodes: session.nodes().collect(),
        borders: session.borders(),
        clusters: clusters
            .into_iter()
            .map(|(id, members)| ClusterOut {
                id,
                members,
                fill_color: session.cluster_fill_color(id),
                complementary_color: session.cluster_complementary_color(id),
            })
            .collect(),
        progress: viewer.host().progress.last().copied(),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let text = read_input(args.input.as_deref())?;

    let mut viewer = Viewer::new(RecordingHost::default(), config);
    viewer.load_svg(&text, LoadOptions::default())?;

    match &args.command {
        Command::Ingest => write_json(&ingest_out(&viewer), args.pretty),
        Command::Highlight(name) | Command::Subgraph(name) => {
            if viewer.session().node(name).is_none() {
                return Err(CliError::UnknownNode(name.clone()));
            }
            let Some(links) = args.links.as_deref() else {
                return Err(CliError::Usage(usage()));
            };
            let graph = load_links(links)?;
            if let Command::Highlight(_) = args.command {
                let view = viewer.focus(name, &graph);
                write_json(&view, args.pretty)
            } else {
                let summary = subgraph::summarize(name, viewer.drill_down(name, &graph));
                write_json(&summary, args.pretty)
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("STARMAP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err @ CliError::UnknownNode(_)) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("starmap-cli")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn default_command_is_ingest_from_stdin() {
        let args = parse_args(&argv(&["--pretty"])).unwrap();
        assert!(matches!(args.command, Command::Ingest));
        assert!(args.pretty);
        assert!(args.input.is_none());
    }

    #[test]
    fn queries_take_a_node_and_require_links() {
        let args = parse_args(&argv(&["highlight", "a", "--links", "l.json", "map.svg"])).unwrap();
        assert!(matches!(args.command, Command::Highlight(ref n) if n == "a"));
        assert_eq!(args.links.as_deref(), Some("l.json"));
        assert_eq!(args.input.as_deref(), Some("map.svg"));

        assert!(matches!(
            parse_args(&argv(&["subgraph", "a", "map.svg"])),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&argv(&["subgraph"])),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn unknown_flags_and_extra_inputs_are_rejected() {
        assert!(matches!(
            parse_args(&argv(&["--bogus"])),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&argv(&["a.svg", "b.svg"])),
            Err(CliError::Usage(_))
        ));
        let args = parse_args(&argv(&["-"])).unwrap();
        assert_eq!(args.input.as_deref(), Some("-"));
    }

    #[test]
    fn links_accept_pairs_and_objects() {
        let links: Vec<LinkIn> =
            serde_json::from_str(r#"[["a", "b"], {"from": "b", "to": "c"}]"#).unwrap();
        assert!(matches!(&links[0], LinkIn::Pair(a, b) if a == "a" && b == "b"));
        assert!(matches!(&links[1], LinkIn::Object { from, to } if from == "b" && to == "c"));
    }
}
