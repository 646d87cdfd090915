mod calendar;
mod render;
mod series;
mod theme;
use crate::render::{
    create_year_calendar, Colormap, HighlightMap, HighlightRule, Orientation, RenderOptions,
};
use crate::series::Series;
use anyhow::{bail, Context};
use lexopt::{Arg, Parser, ValueExt};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, PartialEq)]
enum Command {
    Run {
        datafile: PathBuf,
        year: Option<i32>,
        verbose: bool,
        options: RenderOptions,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut datafile = None;
        let mut year = None;
        let mut verbose = false;
        let mut options = RenderOptions::new();
        let mut highlights = HighlightMap::new();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('y') | Arg::Long("year") => {
                    year = Some(parser.value()?.parse::<i32>()?);
                }
                Arg::Short('t') | Arg::Long("title") => {
                    options = options.title(parser.value()?.string()?);
                }
                Arg::Short('o') | Arg::Long("output") => {
                    options = options.filename(parser.value()?);
                }
                Arg::Short('c') | Arg::Long("cmap") => {
                    options = options.colormap(parser.value()?.parse::<Colormap>()?);
                }
                Arg::Short('H') | Arg::Long("highlight") => {
                    highlights.extend([parser.value()?.parse::<HighlightRule>()?]);
                }
                Arg::Short('b') | Arg::Long("colorbar") => {
                    options = options.show_colorbar(true);
                }
                Arg::Short('p') | Arg::Long("portrait") => {
                    options = options.orientation(Orientation::Portrait);
                }
                Arg::Short('v') | Arg::Long("verbose") => verbose = true,
                Arg::Value(value) if datafile.is_none() => datafile = Some(PathBuf::from(value)),
                _ => return Err(arg.unexpected()),
            }
        }
        let datafile = datafile.ok_or("missing argument DATAFILE")?;
        Ok(Command::Run {
            datafile,
            year,
            verbose,
            options: options.highlights(highlights),
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                datafile,
                year,
                verbose,
                options,
            } => {
                init_logging(verbose);
                let series = load_series(&datafile)?;
                let year = match (year, series.first_date()) {
                    (Some(year), _) => year,
                    (None, Some(first)) => first.year(),
                    (None, None) => bail!("no data in {} and no --year given", datafile.display()),
                };
                if series.is_empty() {
                    tracing::warn!(year, "Series is empty; every day will have value 0");
                }
                let path = create_year_calendar(&series, year, &options)?;
                println!("{}", path.display());
                Ok(())
            }
            Command::Help => {
                println!("Usage: calheat [OPTIONS] <DATAFILE>");
                println!();
                println!("Render a year of daily values as a calendar heatmap image");
                println!();
                println!("DATAFILE holds lines of the form YYYY-MM-DD VALUE; use - for stdin.");
                println!();
                println!("Options:");
                println!("  -y, --year <YEAR>         Year to draw [default: year of the earliest entry]");
                println!("  -t, --title <TITLE>       Figure title [default: the year]");
                println!("  -o, --output <PATH>       Output image [default: <TITLE>.png]");
                println!("  -c, --cmap <NAME>         Colormap [default: cool]");
                println!("  -H, --highlight <RULE>    Mark days equal to a value: VALUE=COLOR[:LABEL]");
                println!("                            (may be given more than once)");
                println!("  -b, --colorbar            Draw a colorbar");
                println!("  -p, --portrait            Lay months out in four rows of three");
                println!("  -v, --verbose             Log debugging information");
                println!("  -h, --help                Display this help message and exit");
                println!("  -V, --version             Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Ignore the error from a subscriber already being installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_series(datafile: &Path) -> anyhow::Result<Series> {
    let (src, text) = if datafile.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read series from stdin")?;
        (String::from("<stdin>"), text)
    } else {
        let text = std::fs::read_to_string(datafile)
            .with_context(|| format!("failed to read {}", datafile.display()))?;
        (datafile.display().to_string(), text)
    };
    let series = text
        .parse::<Series>()
        .with_context(|| format!("failed to parse {src}"))?;
    tracing::debug!(source = %src, entries = series.len(), "Loaded series");
    Ok(series)
}
