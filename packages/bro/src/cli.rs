//! Command-line interface for the BRO client.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::BroClient;
use crate::characteristics::CptCharacteristics;
use crate::config::{BRO_CPT_BASE_URL, HTTP_TIMEOUT_SECS};
use crate::error::{BroError, Result};
use crate::geojson::construct_geojson_from_characteristics;
use crate::geometry::{Area, Circle, Envelope, Point};
use crate::output::{render, save_output, OutputFormat};
use crate::xml::{ImbroFile, ParseMode};

/// BRO client - search and download CPT soundings from the Dutch subsurface registry.
#[derive(Parser)]
#[command(name = "bro")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the BRO CPT service
    #[arg(long, global = true, default_value = BRO_CPT_BASE_URL)]
    pub base_url: String,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value_t = HTTP_TIMEOUT_SECS)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search CPT characteristics registered in a date range within an area.
    Search {
        /// Begin of the registration period (YYYY-MM-DD, not before 2015-01-01)
        #[arg(long)]
        begin: String,

        /// End of the registration period (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        #[command(flatten)]
        area: AreaArgs,

        /// Write the results and the area as GeoJSON to this file
        #[arg(long)]
        geojson: Option<PathBuf>,

        /// Download every CPT found into this directory
        #[arg(long)]
        fetch_dir: Option<PathBuf>,

        /// Store downloaded CPTs parsed instead of as XML
        #[arg(long, requires = "fetch_dir")]
        parse: bool,

        /// Format of parsed CPTs
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Download a single CPT object.
    Fetch {
        /// BRO identifier (e.g., CPT000000053405)
        bro_id: String,

        /// Parse the XML instead of returning it unchanged
        #[arg(long)]
        parse: bool,

        /// Format of the parsed output
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a local IMBRO XML file.
    Parse {
        /// Path to the XML file
        file: PathBuf,

        /// Collect repeated tags into lists instead of keeping the last one
        #[arg(long)]
        aggregate: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Search area, either an envelope or a circle.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct AreaArgs {
    /// Bounding box as LOWER_LAT,LOWER_LON,UPPER_LAT,UPPER_LON (WGS84)
    #[arg(long, value_parser = parse_envelope, allow_hyphen_values = true)]
    pub envelope: Option<Envelope>,

    /// Circle as LAT,LON,RADIUS_KM (WGS84)
    #[arg(long, value_parser = parse_circle, allow_hyphen_values = true)]
    pub circle: Option<Circle>,
}

impl AreaArgs {
    fn to_area(&self) -> Option<Area> {
        self.envelope
            .map(Area::from)
            .or_else(|| self.circle.map(Area::from))
    }
}

fn parse_numbers<const N: usize>(value: &str) -> std::result::Result<[f64; N], String> {
    let numbers = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", part.trim()))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    numbers
        .try_into()
        .map_err(|numbers: Vec<f64>| format!("expected {N} comma-separated numbers, got {}", numbers.len()))
}

fn parse_envelope(value: &str) -> std::result::Result<Envelope, String> {
    let [lower_lat, lower_lon, upper_lat, upper_lon] = parse_numbers::<4>(value)?;
    Ok(Envelope::new(
        Point::new(lower_lat, lower_lon),
        Point::new(upper_lat, upper_lon),
    ))
}

fn parse_circle(value: &str) -> std::result::Result<Circle, String> {
    let [lat, lon, radius_km] = parse_numbers::<3>(value)?;
    Ok(Circle::new(Point::new(lat, lon), radius_km))
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = BroClient::with_timeout(&cli.base_url, Duration::from_secs(cli.timeout))?;

    match cli.command {
        Commands::Search {
            begin,
            end,
            area,
            geojson,
            fetch_dir,
            parse,
            format,
        } => {
            let area = area.to_area().ok_or_else(|| {
                BroError::InvalidArea("either --envelope or --circle is required".to_string())
            })?;
            search_command(
                &client,
                &begin,
                &end,
                &area,
                geojson.as_deref(),
                fetch_dir.as_deref(),
                parse.then_some(format),
            )
        }
        Commands::Fetch {
            bro_id,
            parse,
            format,
            output,
        } => fetch_command(&client, &bro_id, parse.then_some(format), output.as_deref()),
        Commands::Parse {
            file,
            aggregate,
            format,
            output,
        } => {
            let mode = if aggregate {
                ParseMode::Aggregate
            } else {
                ParseMode::LastWriteWins
            };
            parse_command(&file, mode, format, output.as_deref())
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Execute the search command.
fn search_command(
    client: &BroClient,
    begin: &str,
    end: &str,
    area: &Area,
    geojson: Option<&Path>,
    fetch_dir: Option<&Path>,
    parse_format: Option<OutputFormat>,
) -> Result<()> {
    println!(
        "{} CPTs registered between {} and {}",
        style("Searching").bold(),
        style(begin).green(),
        style(end).green()
    );
    println!();

    let pb = spinner("Searching characteristics...");
    let result = client.search_characteristics(begin, end, area);
    pb.finish_and_clear();
    let characteristics = result?;

    print_characteristics(&characteristics);

    if let Some(path) = geojson {
        let content = construct_geojson_from_characteristics(&characteristics, Some(area))?;
        save_output(content.as_bytes(), path)?;
        println!(
            "{} {}",
            style("GeoJSON saved to:").green().bold(),
            path.display()
        );
    }

    if let Some(dir) = fetch_dir {
        fetch_all(client, &characteristics, dir, parse_format)?;
    }

    Ok(())
}

fn print_characteristics(characteristics: &[CptCharacteristics]) {
    println!(
        "  Available: {}",
        style(characteristics.len()).cyan().bold()
    );
    for cpt in characteristics {
        let location = cpt.wgs84_coordinate();
        println!(
            "  {}  {:.6}, {:.6}  final depth {} m",
            style(&cpt.bro_id).cyan(),
            location.lat,
            location.lon,
            cpt.final_depth
        );
    }
}

fn fetch_all(
    client: &BroClient,
    characteristics: &[CptCharacteristics],
    dir: &Path,
    parse_format: Option<OutputFormat>,
) -> Result<()> {
    let pb = ProgressBar::new(characteristics.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green} {pos}/{len} {msg}")
            .expect("valid template"),
    );

    for cpt in characteristics {
        pb.set_message(cpt.bro_id.clone());
        let saved = fetch_to_file(client, &cpt.bro_id, dir, parse_format);
        if let Err(e) = saved {
            pb.finish_and_clear();
            return Err(e);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "{} {} CPTs to {}",
        style("Saved").green().bold(),
        characteristics.len(),
        dir.display()
    );
    Ok(())
}

fn fetch_to_file(
    client: &BroClient,
    bro_id: &str,
    dir: &Path,
    parse_format: Option<OutputFormat>,
) -> Result<PathBuf> {
    let xml = client.get_cpt_object(bro_id)?;
    let (content, extension) = match parse_format {
        Some(format) => {
            let parsed = ImbroFile::new(xml).parse()?;
            (render(&parsed, format)?.into_bytes(), format.extension())
        }
        None => (xml, "xml"),
    };
    let path = dir.join(format!("{bro_id}.{extension}"));
    save_output(&content, &path)?;
    Ok(path)
}

/// Execute the fetch command.
fn fetch_command(
    client: &BroClient,
    bro_id: &str,
    parse_format: Option<OutputFormat>,
    output: Option<&Path>,
) -> Result<()> {
    let pb = spinner(&format!("Downloading {bro_id}..."));
    let result = client.get_cpt_object(bro_id);
    pb.finish_and_clear();
    let xml = result?;

    let content = match parse_format {
        Some(format) => render(&ImbroFile::new(xml).parse()?, format)?.into_bytes(),
        None => xml,
    };
    write_or_print(&content, output)
}

/// Execute the parse command.
fn parse_command(
    file: &Path,
    mode: ParseMode,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let parsed = ImbroFile::from_file(file)?.parse_with(mode)?;
    let content = render(&parsed, format)?;
    write_or_print(content.as_bytes(), output)
}

fn write_or_print(content: &[u8], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            save_output(content, path)?;
            eprintln!("{} {}", style("Saved to:").green().bold(), path.display());
        }
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_fetch() {
        let cli = Cli::parse_from(["bro", "fetch", "CPT000000053405"]);

        let Commands::Fetch {
            bro_id,
            parse,
            format,
            output,
        } = cli.command
        else {
            panic!("expected fetch command");
        };
        assert_eq!(bro_id, "CPT000000053405");
        assert!(!parse);
        assert_eq!(format, OutputFormat::Json);
        assert!(output.is_none());
        assert_eq!(cli.base_url, BRO_CPT_BASE_URL);
        assert_eq!(cli.timeout, HTTP_TIMEOUT_SECS);
    }

    #[test]
    fn test_cli_parse_search_envelope() {
        let cli = Cli::parse_from([
            "bro",
            "search",
            "--begin",
            "2015-01-01",
            "--end",
            "2023-03-03",
            "--envelope",
            "51.9226,4.4695,51.9230,4.4700",
        ]);

        let Commands::Search { begin, area, .. } = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(begin, "2015-01-01");
        assert_eq!(
            area.to_area(),
            Some(Area::Envelope(Envelope::new(
                Point::new(51.9226, 4.4695),
                Point::new(51.9230, 4.4700)
            )))
        );
    }

    #[test]
    fn test_cli_parse_search_circle() {
        let cli = Cli::parse_from([
            "bro",
            "--base-url",
            "http://localhost:8080",
            "search",
            "--begin",
            "2015-01-01",
            "--end",
            "2023-03-03",
            "--circle",
            "52.0383,5.3145,0.5",
        ]);

        assert_eq!(cli.base_url, "http://localhost:8080");
        let Commands::Search { area, .. } = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(
            area.to_area(),
            Some(Area::Circle(Circle::new(Point::new(52.0383, 5.3145), 0.5)))
        );
    }

    #[test]
    fn test_cli_search_requires_one_area() {
        let base = vec!["bro", "search", "--begin", "2015-01-01", "--end", "2023-03-03"];
        assert!(Cli::try_parse_from(&base).is_err());

        let mut both = base.clone();
        both.extend(["--envelope", "51.9,4.4,52.0,4.5", "--circle", "52.0,5.0,1"]);
        assert!(Cli::try_parse_from(&both).is_err());
    }

    #[test]
    fn test_cli_parse_file_with_options() {
        let cli = Cli::parse_from([
            "bro",
            "parse",
            "cpt.xml",
            "--aggregate",
            "--format",
            "yaml",
            "-o",
            "cpt.yaml",
        ]);

        let Commands::Parse {
            file,
            aggregate,
            format,
            output,
        } = cli.command
        else {
            panic!("expected parse command");
        };
        assert_eq!(file, PathBuf::from("cpt.xml"));
        assert!(aggregate);
        assert_eq!(format, OutputFormat::Yaml);
        assert_eq!(output, Some(PathBuf::from("cpt.yaml")));
    }

    #[test]
    fn test_parse_envelope() {
        assert_eq!(
            parse_envelope("51.9, 4.4, 52.0, 4.5"),
            Ok(Envelope::new(Point::new(51.9, 4.4), Point::new(52.0, 4.5)))
        );
        assert!(parse_envelope("51.9,4.4,52.0").is_err());
        assert!(parse_envelope("51.9,4.4,52.0,east").is_err());
    }

    #[test]
    fn test_parse_circle() {
        assert_eq!(
            parse_circle("52.0,5.0,1.5"),
            Ok(Circle::new(Point::new(52.0, 5.0), 1.5))
        );
        assert!(parse_circle("52.0,5.0").is_err());
    }
}
